//! Store change notifications.
//!
//! The store is single-threaded and owned, so subscribers are plain `FnMut`
//! callbacks invoked synchronously, in subscription order, after each change
//! has been fully applied.

use mailblocks_model::BlockId;

/// A unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Where a document change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Direct edit, import or blueprint replace (recorded in history)
    Edit,
    /// Undo/redo installing an existing snapshot
    Replay,
    /// New editing session loaded
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    DocumentChanged { origin: ChangeOrigin },
    SelectionChanged(Option<BlockId>),
    /// Emitted only when the flag actually flips
    UnsavedChangesChanged(bool),
}

pub type EventCallback = Box<dyn FnMut(&StoreEvent)>;

/// Registry of store subscribers
#[derive(Default)]
pub struct Subscribers {
    callbacks: Vec<(SubscriptionId, EventCallback)>,
    next_id: SubscriptionId,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a subscription ID that can be used to unsubscribe later.
    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        self.next_id += 1;
        self.callbacks.push((self.next_id, callback));
        self.next_id
    }

    /// Returns `true` if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn emit(&mut self, event: &StoreEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("subscriber_count", &self.callbacks.len())
            .finish()
    }
}
