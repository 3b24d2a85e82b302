#![forbid(unsafe_code)]

//! Mindmap document model + geometry helpers (headless).
//!
//! Design goals:
//! - plain data in, plain data out: no rendering surface, no global state
//! - deterministic, testable outputs
//! - camelCase JSON documents that round-trip through serde unchanged

pub mod config;
pub mod error;
pub mod geom;
pub mod model;
pub mod sample;

pub use config::CanvasConfig;
pub use error::{Error, Result};
pub use model::{MindmapDocument, Node, NodeId, Position, TopLevelConnection};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
