//! # Undo/Redo History
//!
//! Snapshot-based history: every committed edit appends a deep copy of the
//! whole document, and undo/redo move a cursor over those snapshots.
//!
//! ## Design
//!
//! - A commit discards everything after the cursor (the redo tail), appends
//!   the new snapshot and moves the cursor onto it
//! - When the bound is exceeded the oldest snapshot is evicted and the cursor
//!   shifts down with it
//! - Undo/redo never commit: the store raises the one-shot replay flag before
//!   installing a snapshot, and the next commit consumes the flag instead of
//!   recording
//!
//! Snapshots are full clones. Documents are small (tens to low hundreds of
//! blocks), so the copy per edit is affordable; larger documents would want
//! structural sharing instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(doc.clone(), 50);
//!
//! doc.merge(edit);
//! history.commit(&doc);
//!
//! if let Some(previous) = history.step_back() {
//!     // install `previous` as the live document
//! }
//! ```

use mailblocks_model::Document;
use tracing::debug;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded sequence of document snapshots with a cursor
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots, oldest first
    entries: Vec<Document>,

    /// Position of the snapshot matching the live document
    index: usize,

    /// Maximum number of snapshots (0 = unlimited)
    max_entries: usize,

    /// Set right before a replay; the next commit consumes it
    replay_pending: bool,
}

impl History {
    /// Create a history seeded with a single snapshot
    pub fn new(initial: Document, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_entries,
            replay_pending: false,
        }
    }

    /// Record the document after a mutation.
    ///
    /// Returns `false` without recording when the mutation was a replay.
    pub fn commit(&mut self, document: &Document) -> bool {
        if self.replay_pending {
            self.replay_pending = false;
            debug!(index = self.index, "Skipping history commit for replay");
            return false;
        }

        // New edit invalidates the redo tail
        self.entries.truncate(self.index + 1);
        self.entries.push(document.clone());
        self.index = self.entries.len() - 1;

        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.index -= 1;
        }

        debug!(index = self.index, len = self.entries.len(), "Committed history snapshot");
        true
    }

    /// Flag the next commit as a replay of an existing snapshot
    pub fn mark_replay(&mut self) {
        self.replay_pending = true;
    }

    /// Whether a replay is flagged and not yet consumed
    pub fn is_replay_pending(&self) -> bool {
        self.replay_pending
    }

    /// Move the cursor back one step and return the snapshot to install
    pub fn step_back(&mut self) -> Option<&Document> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        debug!(index = self.index, "History step back");
        self.entries.get(self.index)
    }

    /// Move the cursor forward one step and return the snapshot to install
    pub fn step_forward(&mut self) -> Option<&Document> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        debug!(index = self.index, "History step forward");
        self.entries.get(self.index)
    }

    /// Drop every snapshot and start over from `document`
    pub fn reseed(&mut self, document: &Document) {
        self.entries.clear();
        self.entries.push(document.clone());
        self.index = 0;
        self.replay_pending = false;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> &Document {
        &self.entries[self.index]
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.entries.get(index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of undo steps available
    pub fn undo_levels(&self) -> usize {
        self.index
    }

    /// Number of redo steps available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - self.index - 1
    }
}
