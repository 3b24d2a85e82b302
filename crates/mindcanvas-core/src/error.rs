pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node {id} has level {found}, expected {expected}")]
    LevelMismatch {
        id: String,
        expected: u32,
        found: u32,
    },

    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("invalid config value at `{key}`: {message}")]
    InvalidConfig { key: String, message: String },
}
