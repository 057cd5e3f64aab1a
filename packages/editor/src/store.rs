//! # Editor Store
//!
//! The single owner of the live document for one editing session, together
//! with the selection and view state around it.
//!
//! Every document mutation funnels through one private commit path:
//!
//! ```text
//! set_document / replace_document / undo / redo
//!         ↓
//!   apply change → record history (skipped for replays) → recompute dirty flag
//!         ↓
//!   notify subscribers
//! ```
//!
//! Nothing else writes to the document, so history and dirty tracking can
//! never be bypassed. The store is synchronous and single-threaded; each
//! operation runs to completion before the next one starts.

use mailblocks_model::{Block, BlockId, Document, DocumentPatch};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::dirty::DirtyTracker;
use crate::events::{ChangeOrigin, EventCallback, StoreEvent, Subscribers, SubscriptionId};
use crate::history::History;
use crate::view::ViewState;

/// One editing session's document, history, dirty flag and view state
#[derive(Debug)]
pub struct EditorStore {
    config: EditorConfig,
    document: Document,
    selected_block_id: Option<BlockId>,
    view: ViewState,
    history: History,
    dirty: DirtyTracker,
    subscribers: Subscribers,
}

enum Change {
    Merge(DocumentPatch),
    Replace(Document),
}

impl EditorStore {
    /// Start a session on an empty document
    pub fn new(config: EditorConfig) -> Self {
        let document = Document::new(config.layout_block_type.clone());
        Self::with_document(document, config)
    }

    /// Start a session on a loaded document (treated as already saved)
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            history: History::new(document.clone(), config.history_limit),
            dirty: DirtyTracker::new(&document),
            document,
            selected_block_id: None,
            view: ViewState::default(),
            subscribers: Subscribers::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block_id.as_deref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Direct access for the plain view fields (tabs, canvas size, drawers)
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Shallow-merge `patch` into the document and record the result.
    ///
    /// Keys absent from `patch` are left alone.
    pub fn set_document(&mut self, patch: DocumentPatch) {
        debug!(entries = patch.len(), "Merging document patch");
        self.commit(Change::Merge(patch), ChangeOrigin::Edit);
    }

    /// Overwrite a single block
    pub fn set_block(&mut self, id: impl Into<BlockId>, block: Block) {
        let mut patch = DocumentPatch::new();
        patch.insert(id, block);
        self.set_document(patch);
    }

    /// Replace the whole document as a recorded, undoable edit
    pub fn replace_document(&mut self, document: Document) {
        info!(blocks = document.len(), "Replacing document");
        self.commit(Change::Replace(document), ChangeOrigin::Edit);
    }

    /// Load a new editing session: replace the document, clear selection,
    /// reseed history and take the loaded document as the saved baseline.
    pub fn reset_document(&mut self, document: Document) {
        info!(blocks = document.len(), "Resetting editing session");
        self.document = document;
        self.history.reseed(&self.document);
        self.set_selected_block_id(None);

        let was_dirty = self.dirty.has_unsaved_changes();
        self.dirty.mark_as_saved(&self.document);

        self.subscribers.emit(&StoreEvent::DocumentChanged {
            origin: ChangeOrigin::Reset,
        });
        if was_dirty {
            self.subscribers.emit(&StoreEvent::UnsavedChangesChanged(false));
        }
    }

    /// Select a block (or clear the selection) and apply the panel coupling rule
    pub fn set_selected_block_id(&mut self, id: Option<BlockId>) {
        self.view.on_selection_changed(id.is_some());
        if self.selected_block_id == id {
            return;
        }
        self.selected_block_id = id;
        self.subscribers
            .emit(&StoreEvent::SelectionChanged(self.selected_block_id.clone()));
    }

    /// Step back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_back().cloned() else {
            return false;
        };
        self.replay(snapshot);
        true
    }

    /// Step forward one snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_forward().cloned() else {
            return false;
        };
        self.replay(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty.has_unsaved_changes()
    }

    /// Take the current document as the saved baseline
    pub fn mark_as_saved(&mut self) {
        let was_dirty = self.dirty.has_unsaved_changes();
        self.dirty.mark_as_saved(&self.document);
        if was_dirty {
            self.subscribers.emit(&StoreEvent::UnsavedChangesChanged(false));
        }
    }

    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Install a history snapshot wholesale without recording it again
    fn replay(&mut self, snapshot: Document) {
        self.history.mark_replay();
        self.commit(Change::Replace(snapshot), ChangeOrigin::Replay);

        let stale = self
            .selected_block_id
            .as_deref()
            .is_some_and(|id| !self.document.contains(id));
        if stale {
            debug!("Clearing selection of a block removed by replay");
            self.set_selected_block_id(None);
        }
    }

    fn commit(&mut self, change: Change, origin: ChangeOrigin) {
        match change {
            Change::Merge(patch) => self.document.merge(patch),
            Change::Replace(document) => self.document = document,
        }

        self.history.commit(&self.document);
        let flipped = self.dirty.recompute(&self.document);

        self.subscribers.emit(&StoreEvent::DocumentChanged { origin });
        if flipped {
            self.subscribers.emit(&StoreEvent::UnsavedChangesChanged(
                self.dirty.has_unsaved_changes(),
            ));
        }
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SidebarTab;
    use mailblocks_model::ROOT_ID;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn text(value: &str) -> Block {
        Block::new("Text").with_prop("value", json!(value))
    }

    fn store_with_text() -> EditorStore {
        let mut doc = Document::new("EmailLayout");
        doc.root_mut().data.children_ids = Some(vec!["t".into()]);
        doc.insert("t", text("v0"));
        EditorStore::with_document(doc, EditorConfig::default())
    }

    #[test]
    fn test_store_creation() {
        let store = EditorStore::default();
        assert_eq!(store.document().len(), 1);
        assert_eq!(store.document().root().block_type, "EmailLayout");
        assert!(!store.can_undo());
        assert!(!store.can_redo());
        assert!(!store.has_unsaved_changes());
        assert_eq!(store.selected_block_id(), None);
    }

    #[test]
    fn test_set_document_merges_without_pruning() {
        let mut store = store_with_text();
        store.set_block("other", Block::new("Divider"));

        assert!(store.document().contains("t"));
        assert!(store.document().contains("other"));
        assert!(store.document().contains(ROOT_ID));
        assert!(store.can_undo());
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_undo_restores_snapshot_exactly() {
        let mut store = store_with_text();
        let original = store.document().clone();

        store.set_block("added", Block::new("Divider"));
        assert!(store.undo());

        // keys added by the undone edit are gone too
        assert_eq!(store.document(), &original);
        assert_eq!(store.document(), store.history().current());
        assert!(store.can_redo());
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_undo_redo_do_not_record() {
        let mut store = store_with_text();
        store.set_block("t", text("v1"));
        store.set_block("t", text("v2"));
        assert_eq!(store.history().len(), 3);

        store.undo();
        store.undo();
        store.redo();
        assert_eq!(store.history().len(), 3);
        assert_eq!(store.history().index(), 1);
        assert_eq!(store.document().get("t"), Some(&text("v1")));
    }

    #[test]
    fn test_undo_redo_past_bounds_are_noops() {
        let mut store = store_with_text();
        assert!(!store.undo());
        assert!(!store.redo());
        assert_eq!(store.document().get("t"), Some(&text("v0")));
    }

    #[test]
    fn test_reset_document_reseeds_session() {
        let mut store = store_with_text();
        store.set_block("t", text("v1"));
        store.set_selected_block_id(Some("t".into()));

        let fresh = Document::new("EmailLayout");
        store.reset_document(fresh.clone());

        assert_eq!(store.document(), &fresh);
        assert_eq!(store.selected_block_id(), None);
        assert_eq!(store.history().len(), 1);
        assert!(!store.can_undo());
        assert!(!store.has_unsaved_changes());
        assert_eq!(store.view().sidebar_tab, SidebarTab::Styles);
    }

    #[test]
    fn test_replace_document_is_undoable() {
        let mut store = store_with_text();
        let original = store.document().clone();

        store.replace_document(Document::new("EmailLayout"));
        assert!(!store.document().contains("t"));

        store.undo();
        assert_eq!(store.document(), &original);
    }

    #[test]
    fn test_selection_coupling() {
        let mut store = store_with_text();
        store.view_mut().inspector_open = false;

        store.set_selected_block_id(Some("t".into()));
        assert_eq!(store.selected_block_id(), Some("t"));
        assert_eq!(store.view().sidebar_tab, SidebarTab::BlockConfiguration);
        assert!(store.view().inspector_open);

        store.set_selected_block_id(None);
        assert_eq!(store.view().sidebar_tab, SidebarTab::Styles);
    }

    #[test]
    fn test_replay_clears_selection_of_removed_block() {
        let mut store = store_with_text();
        store.set_block("added", Block::new("Divider"));
        store.set_selected_block_id(Some("added".into()));

        store.undo();
        assert_eq!(store.selected_block_id(), None);
    }

    #[test]
    fn test_dirty_flag_follows_saved_baseline() {
        let mut store = store_with_text();
        store.set_block("t", text("v1"));
        store.mark_as_saved();
        assert!(!store.has_unsaved_changes());

        store.set_block("t", text("v2"));
        assert!(store.has_unsaved_changes());

        store.undo();
        assert!(!store.has_unsaved_changes());

        store.undo();
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_events_emitted_once_per_flip() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = store_with_text();
        let sink = events.clone();
        store.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));

        store.set_block("t", text("v1"));
        store.set_block("t", text("v2"));

        let dirty_events: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, StoreEvent::UnsavedChangesChanged(_)))
            .cloned()
            .collect();
        assert_eq!(dirty_events, vec![StoreEvent::UnsavedChangesChanged(true)]);

        events.borrow_mut().clear();
        store.undo();
        assert_eq!(
            events.borrow()[0],
            StoreEvent::DocumentChanged {
                origin: ChangeOrigin::Replay
            }
        );
    }
}
