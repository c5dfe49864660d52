use thiserror::Error;

use crate::circuit::BlockId;
use crate::logging::LoggingError;

/// Unified result type for the floorplanner crate.
pub type Result<T> = std::result::Result<T, FloorplanError>;

/// Errors surfaced by the topology core and its collaborators.
#[derive(Debug, Error)]
pub enum FloorplanError {
    #[error("block {0} appears more than once")]
    DuplicateBlock(BlockId),
    #[error("block {0} has a zero width or height")]
    DegenerateBlock(BlockId),
    #[error("block {0} not found")]
    UnknownBlock(BlockId),
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("tree invariant violated: {0}")]
    TreeCorrupted(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("pin `{0}` does not name a block or terminal")]
    UnknownPin(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("logging failed: {0}")]
    Logging(#[from] LoggingError),
}
