//! Routes document notifications into lifecycle calls.
//!
//! The adapter is the only piece that looks at raw [`DocumentEvent`]s. It
//! knows which events are triggers (camera, selection), which are history
//! notifications, and which marker tag changes mean an implicit
//! enable/disable. Manager errors are logged and swallowed here; a failed
//! pass must never take the host's event loop down.

use std::time::Duration;

use crate::culling::manager::{CullingManager, CullingState};
use crate::document::{Document, DocumentEvent};
use crate::timer::Timers;

/// Deferred work scheduled by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    /// Rebuild the partition (debounced edit-context reset).
    Reset,
}

/// Translates [`DocumentEvent`]s into [`CullingManager`] calls.
#[derive(Debug, Default)]
pub struct EventAdapter {
    /// Set between the pre-save strip and the post-save restore; marker tag
    /// events in that window are our own and must not flip the lifecycle.
    saving: bool,
    /// A reset is already scheduled; further triggers coalesce into it.
    reset_pending: bool,
}

impl EventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one document notification.
    pub fn handle(
        &mut self,
        event: DocumentEvent,
        doc: &mut Document,
        manager: &mut CullingManager,
        timers: &mut Timers<SessionTask>,
    ) {
        match event {
            DocumentEvent::ViewChanged => {
                self.run(manager.update(doc, false), "view change update");
            }
            DocumentEvent::SelectionChanged { empty } => {
                // An empty bulk selection is the closest signal the host
                // gives for "geometry was just deleted"; use it to sweep
                // out broken edges stranded in the marker.
                self.run(manager.update(doc, empty), "selection update");
            }
            DocumentEvent::SelectionCleared => {
                self.run(manager.update(doc, false), "selection update");
            }
            DocumentEvent::TransactionCommitted => {
                self.run(manager.on_transaction_committed(doc), "commit notification");
                self.run(manager.update(doc, false), "post-commit update");
            }
            DocumentEvent::TransactionUndone => {
                manager.on_transaction_undone();
            }
            DocumentEvent::TransactionRedone => {
                self.run(manager.on_transaction_redone(doc), "redo notification");
            }
            DocumentEvent::TagAdded { id, name } => {
                if !self.saving && name == manager.settings().marker_tag {
                    self.run(manager.on_marker_appeared(doc, id), "marker adoption");
                }
            }
            DocumentEvent::TagRemoved { name } => {
                if !self.saving && name == manager.settings().marker_tag {
                    manager.on_marker_disappeared(doc);
                }
            }
            DocumentEvent::ActivePathChanged | DocumentEvent::InstanceCreated => {
                self.schedule_reset(manager, timers);
            }
            DocumentEvent::PreSave => {
                if !self.saving {
                    self.saving = true;
                    self.run(manager.before_save(doc), "pre-save strip");
                }
            }
            DocumentEvent::PostSave => {
                self.run(manager.after_save(doc), "post-save restore");
                self.saving = false;
            }
        }
    }

    /// Runs the debounced reset once its delay elapses.
    pub fn on_reset_due(&mut self, doc: &mut Document, manager: &mut CullingManager) {
        self.reset_pending = false;
        self.run(manager.reset(doc), "partition reset");
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    fn schedule_reset(&mut self, manager: &CullingManager, timers: &mut Timers<SessionTask>) {
        if manager.state() == CullingState::Disabled || self.reset_pending {
            return;
        }
        self.reset_pending = true;
        let delay: Duration = manager.settings().reset_delay();
        timers.schedule_once(delay, SessionTask::Reset);
        log::debug!("partition reset scheduled in {delay:?}");
    }

    fn run(&self, result: crate::document::DocumentResult, what: &str) {
        if let Err(err) = result {
            log::warn!("{what} failed: {err}");
        }
    }
}
