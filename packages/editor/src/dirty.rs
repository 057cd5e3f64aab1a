//! Unsaved-changes tracking against a serialized "last saved" baseline.

use mailblocks_model::Document;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DirtyTracker {
    /// Serialized document at the last save
    baseline: String,
    has_unsaved_changes: bool,
}

impl DirtyTracker {
    /// Start clean, with `document` as the saved baseline
    pub fn new(document: &Document) -> Self {
        Self {
            baseline: serialize(document),
            has_unsaved_changes: false,
        }
    }

    pub fn mark_as_saved(&mut self, document: &Document) {
        self.baseline = serialize(document);
        self.has_unsaved_changes = false;
    }

    /// Compare `document` to the baseline. Returns `true` only when the flag flipped.
    pub fn recompute(&mut self, document: &Document) -> bool {
        let dirty = serialize(document) != self.baseline;
        if dirty == self.has_unsaved_changes {
            return false;
        }
        self.has_unsaved_changes = dirty;
        debug!(has_unsaved_changes = dirty, "Unsaved changes flag changed");
        true
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }
}

fn serialize(document: &Document) -> String {
    // A map of strings to plain JSON values cannot fail to serialize
    document.to_json().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize document for dirty tracking");
        String::new()
    })
}
