//! # Mailblocks Editor
//!
//! Editing core for block-based email documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Document = id → Block arena          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one session's store                 │
//! │  - Merge edits, replace, reset              │
//! │  - Snapshot undo/redo (bounded)             │
//! │  - Dirty tracking against a saved baseline  │
//! │  - Selection + view state                   │
//! └─────────────────────────────────────────────┘
//!          ↓                          ↑
//! ┌──────────────────┐      ┌──────────────────┐
//! │ export: template │      │ import: fresh    │
//! │ or main-block    │      │ ids, pruning,    │
//! │ subtree          │      │ blueprint replace│
//! └──────────────────┘      └──────────────────┘
//!          ↓                          ↑
//! ┌─────────────────────────────────────────────┐
//! │ library: persisted templates and blocks     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One write path**: every document change goes through the store, so
//!    history and the dirty flag cannot be bypassed
//! 2. **Snapshots, not diffs**: undo installs a whole earlier document
//! 3. **Imports never collide**: copied blocks always get ids unused in the
//!    live document
//! 4. **Rendering is optional**: a failed preview never fails an export
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailblocks_editor::{EditorConfig, EditorStore, InsertTarget, RandomIdGenerator};
//!
//! let mut store = EditorStore::new(EditorConfig::load(".")?);
//! store.set_selected_block_id(Some("block-text-1".into()));
//!
//! let asset = export_block(&store, &renderer)?;
//! import_document(&mut store, &asset.document, &InsertTarget::Root, &mut RandomIdGenerator::new())?;
//!
//! store.undo();
//! ```

mod config;
mod dirty;
mod errors;
mod events;
mod export;
mod history;
mod ids;
mod import;
mod library;
mod render;
mod store;
mod view;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use dirty::DirtyTracker;
pub use errors::{EditorError, EditorResult};
pub use events::{ChangeOrigin, EventCallback, StoreEvent, Subscribers, SubscriptionId};
pub use export::{export_block, export_template, extract_subtree, ExportedAsset};
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use ids::{position_id, IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use import::{
    import_block, import_document, import_payload, import_subtree, replace_with_blueprint,
    ImportPayload, InsertTarget, ReplaceConfirmation,
};
pub use library::{
    apply_template_from_library, insert_from_library, save_block_to_library,
    save_template_to_library, AssetKind, InMemoryLibrary, Library, LibraryAsset, LibraryError,
};
pub use render::{render_preview, RenderError, Renderer};
pub use store::EditorStore;
pub use view::{MainTab, ScreenSize, SidebarTab, ViewState};

// Re-export model types for convenience
pub use mailblocks_model::{
    Block, BlockData, BlockId, ChildSlots, Column, DanglingReference, Document, DocumentPatch,
    ModelError, ROOT_ID,
};
