//! Lifecycle state machine for one document's culling session.
//!
//! The manager owns the partition store and decides *whether* a
//! reclassification may run; the event adapter decides *when* to ask. Undo
//! pauses the session so history replay is not disturbed by fresh
//! transparent commits, and a redo-depth counter tells a pause apart from a
//! plain rewind.

use crate::culling::engine;
use crate::culling::partition::PartitionStore;
use crate::document::{Document, DocumentResult, TagId};
use crate::settings::CullingSettings;

/// Lifecycle state of a culling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullingState {
    /// Not attached; the marker tag does not exist (as far as we know).
    #[default]
    Disabled,
    /// Attached and reclassifying live.
    Active,
    /// Attached but holding still while the user walks the undo history.
    Paused,
}

/// A user-facing notice raised by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CullingNotice {
    /// Culling paused because of undo; any document edit resumes it.
    Interrupted,
}

/// Drives one document's culling lifecycle.
#[derive(Debug)]
pub struct CullingManager {
    settings: CullingSettings,
    state: CullingState,
    redo_depth: u32,
    partition: PartitionStore,
    notices: Vec<CullingNotice>,
}

impl CullingManager {
    pub fn new(settings: CullingSettings) -> Self {
        let partition = PartitionStore::new(settings.marker_tag.clone());
        Self {
            settings,
            state: CullingState::Disabled,
            redo_depth: 0,
            partition,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> CullingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CullingState::Active
    }

    pub fn settings(&self) -> &CullingSettings {
        &self.settings
    }

    /// The marker tag, if the session currently tracks one.
    pub fn marker(&self) -> Option<TagId> {
        self.partition.marker()
    }

    /// Notices raised since the last call (pause announcements and the
    /// like). The caller presents them to the user.
    pub fn take_notices(&mut self) -> Vec<CullingNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Turns culling on: creates the marker tag if needed and runs the
    /// first pass.
    ///
    /// When the marker already exists (adopted from a redo that restored
    /// it), the partition is trusted as-is and no pass runs; the next
    /// document change reconciles it.
    pub fn enable(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state != CullingState::Disabled {
            return Ok(());
        }
        self.state = CullingState::Active;
        self.redo_depth = 0;
        log::info!("culling enabled for document {:?}", doc.id());
        if self.partition.ensure_exists(doc, false)? {
            self.update(doc, false)?;
        }
        Ok(())
    }

    /// Turns culling off and removes the marker tag, restoring every
    /// suppressed face.
    pub fn disable(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state == CullingState::Disabled {
            return Ok(());
        }
        self.state = CullingState::Disabled;
        self.redo_depth = 0;
        log::info!("culling disabled for document {:?}", doc.id());
        self.partition.ensure_absent(doc, false)?;
        Ok(())
    }

    /// Runs one reclassification pass if the session is active and nothing
    /// suppresses it.
    pub fn update(&mut self, doc: &mut Document, remove_broken_edges: bool) -> DocumentResult {
        if self.state != CullingState::Active {
            return Ok(());
        }
        if doc.operation_in_progress() {
            // Someone else's transaction is open; re-tagging inside it
            // would entangle the undo steps.
            return Ok(());
        }
        if self.settings.conflicts_with(doc) {
            log::debug!("skipping update: active tool conflicts with re-tagging");
            return Ok(());
        }
        let Some(marker) = self.partition.marker() else {
            return Ok(());
        };
        engine::reclassify(doc, marker, remove_broken_edges)?;
        Ok(())
    }

    /// Rebuilds the partition from scratch: drops the marker tag, recreates
    /// it, and reclassifies. Both halves are transparent so the rebuild
    /// folds into the previous undo step.
    pub fn reset(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state != CullingState::Active {
            return Ok(());
        }
        log::debug!("resetting partition for document {:?}", doc.id());
        self.partition.ensure_absent(doc, true)?;
        if self.partition.ensure_exists(doc, true)? {
            self.update(doc, false)?;
        }
        Ok(())
    }

    /// Suspends reclassification while the user rewinds history.
    fn pause(&mut self) {
        if self.state != CullingState::Active {
            return;
        }
        self.state = CullingState::Paused;
        self.notices.push(CullingNotice::Interrupted);
        log::info!("culling paused (undo in progress)");
    }

    /// Resumes after a pause and reconciles the partition.
    fn unpause(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state != CullingState::Paused {
            return Ok(());
        }
        self.state = CullingState::Active;
        log::info!("culling resumed");
        self.update(doc, false)
    }

    /// Explicit answer to an [`CullingNotice::Interrupted`] notice: resume
    /// culling without waiting for the next document edit.
    pub fn resume(&mut self, doc: &mut Document) -> DocumentResult {
        self.redo_depth = 0;
        self.unpause(doc)
    }

    // -- History notifications --

    /// A transaction committed: any forward edit ends a pause and resets
    /// the redo depth.
    pub fn on_transaction_committed(&mut self, doc: &mut Document) -> DocumentResult {
        self.redo_depth = 0;
        self.unpause(doc)
    }

    /// An undo step was applied.
    pub fn on_transaction_undone(&mut self) {
        self.redo_depth += 1;
        self.pause();
    }

    /// A redo step was applied. Once every undone step has been redone the
    /// session resumes.
    pub fn on_transaction_redone(&mut self, doc: &mut Document) -> DocumentResult {
        self.redo_depth = self.redo_depth.saturating_sub(1);
        if self.redo_depth == 0 {
            self.unpause(doc)?;
        }
        Ok(())
    }

    // -- Marker tag notifications --

    /// A tag with the marker name appeared without us creating it (redo of
    /// the enabling step, or a collaborating client). Adopt it and attach.
    pub fn on_marker_appeared(&mut self, doc: &mut Document, id: TagId) -> DocumentResult {
        if self.partition.marker().is_some() {
            return Ok(());
        }
        log::debug!("adopting externally created marker tag {id:?}");
        self.partition.adopt(id);
        if self.state == CullingState::Disabled {
            self.state = CullingState::Active;
            self.redo_depth = 0;
            log::info!("culling enabled for document {:?}", doc.id());
        }
        Ok(())
    }

    /// The marker tag vanished without us removing it (undo of the enabling
    /// step, or manual deletion). Detach without touching the document.
    pub fn on_marker_disappeared(&mut self, doc: &Document) {
        if self.partition.marker().is_none() {
            return;
        }
        if doc.tags().find(self.partition.tag_name()).is_some() {
            // A tag by that name still exists; ours was not the one removed.
            return;
        }
        log::debug!("marker tag gone; detaching");
        self.partition.forget();
        self.state = CullingState::Disabled;
        self.redo_depth = 0;
    }

    // -- Save lifecycle --

    /// Strips the marker before a save so documents persist clean.
    /// Transparent, so the save leaves no extra undo step.
    pub fn before_save(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state == CullingState::Disabled {
            return Ok(());
        }
        self.partition.ensure_absent(doc, true)?;
        Ok(())
    }

    /// Restores the marker after a save and re-suppresses back faces.
    pub fn after_save(&mut self, doc: &mut Document) -> DocumentResult {
        if self.state == CullingState::Disabled {
            return Ok(());
        }
        if self.partition.ensure_exists(doc, true)? {
            self.update(doc, false)?;
        }
        Ok(())
    }
}
