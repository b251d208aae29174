//! Document notifications.
//!
//! Every observable change queues a [`DocumentEvent`]. The host loop drains
//! the queue serially ([`EventQueue::pop`]) and hands events to whoever
//! registered interest — in this crate, the culling session's event
//! adapter. Events emitted while one is being handled simply queue up
//! behind it, which is what makes re-entrant notification chains (tag
//! removal observed during an undo, before the undo notification itself)
//! deliver in host order.

use std::collections::VecDeque;

use crate::document::tags::TagId;

/// A change notification from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Camera moved or reoriented.
    ViewChanged,
    /// The selection set changed in bulk. `empty` is true when the change
    /// left nothing selected — the host has no dedicated deletion
    /// notification, so an empty bulk change doubles as its proxy.
    SelectionChanged { empty: bool },
    /// The selection was explicitly cleared.
    SelectionCleared,
    /// A transaction was committed to the undo log.
    TransactionCommitted,
    /// A transaction was undone.
    TransactionUndone,
    /// A previously undone transaction was redone.
    TransactionRedone,
    /// A tag was added (by forward edit, or by undo/redo replay).
    TagAdded { id: TagId, name: String },
    /// A tag was removed (by forward edit, or by undo/redo replay).
    TagRemoved { name: String },
    /// The edit-context stack (active path) changed.
    ActivePathChanged,
    /// A group/component instance was created.
    InstanceCreated,
    /// The document is about to be saved.
    PreSave,
    /// The document finished saving.
    PostSave,
}

/// FIFO queue of pending document events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<DocumentEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DocumentEvent) {
        self.events.push_back(event);
    }

    /// Takes the oldest pending event, if any.
    pub fn pop(&mut self) -> Option<DocumentEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order() {
        let mut queue = EventQueue::new();
        queue.push(DocumentEvent::ViewChanged);
        queue.push(DocumentEvent::PreSave);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(DocumentEvent::ViewChanged));
        assert_eq!(queue.pop(), Some(DocumentEvent::PreSave));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }
}
