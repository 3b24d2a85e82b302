#![forbid(unsafe_code)]

//! Everything between a laid-out mindmap tree and pixels.
//!
//! - [`visibility`] picks the nodes and edges shown for a zoom factor or a focused node.
//! - [`viewport`] owns pan/zoom state and turns pointer input into pans and node drags.
//! - [`canvas`] ties a document, its layout and a viewport together.
//! - [`svg`] serializes a [`canvas::Scene`] to a standalone SVG document.

pub mod canvas;
pub mod connection;
pub mod grid;
pub mod svg;
pub mod viewport;
pub mod visibility;

pub use canvas::{Canvas, CanvasOptions, Scene, SceneConnection};
pub use viewport::{
    Gesture, GestureEvent, NoCapture, NodeHit, PointerButton, PointerCapture, ScreenPoint,
    ScreenSpace, ScreenVector, ViewportController, ViewportOptions, ViewportSize, ViewportState,
    ZoomStep,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mindcanvas_core::Error),
    #[error("invalid viewport options: {message}")]
    InvalidViewport { message: String },
    #[error("invalid render options at `{key}`: {message}")]
    InvalidRenderOption { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
