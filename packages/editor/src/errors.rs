//! Error types for the editor

use mailblocks_model::{BlockId, ModelError};
use thiserror::Error;

use crate::library::{AssetKind, LibraryError};

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Column {column} not found in block {block}")]
    ColumnNotFound { block: BlockId, column: usize },

    #[error("Block {0} has no childrenIds list")]
    NotAContainer(BlockId),

    #[error("No block is selected")]
    NoSelection,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Expected a {expected:?} asset, found a {found:?} asset")]
    AssetKindMismatch { expected: AssetKind, found: AssetKind },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
