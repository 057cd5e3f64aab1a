//! # Mailblocks Model
//!
//! Data shape of an email layout document: a flat map of block id → block,
//! rooted at the reserved `root` entry. Children are referenced by id, either
//! through a linear `childrenIds` list or through per-column lists.

pub mod block;
pub mod document;
pub mod error;

pub use block::{Block, BlockData, BlockId, ChildSlots, Column};
pub use document::{DanglingReference, Document, DocumentPatch, ROOT_ID};
pub use error::{ModelError, ModelResult};
