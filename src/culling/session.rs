//! One document's culling session, and the registry that keys sessions by
//! document identity.
//!
//! The session wires the manager, adapter, and timer queue together behind
//! a small surface the host loop drives: enable/disable, `process` after
//! any document mutation, `advance` on ticks, and `save` around
//! persistence. The registry exists because host document handles are slot
//! based and slots get reused for unrelated documents.

use std::collections::HashMap;

use crate::culling::adapter::{EventAdapter, SessionTask};
use crate::culling::manager::{CullingManager, CullingNotice, CullingState};
use crate::document::{Document, DocumentContent, DocumentId, DocumentResult, SlotId};
use crate::settings::CullingSettings;
use crate::timer::Timers;

/// Live back-face culling for a single document.
#[derive(Debug)]
pub struct CullingSession {
    manager: CullingManager,
    adapter: EventAdapter,
    timers: Timers<SessionTask>,
}

impl CullingSession {
    pub fn new(settings: CullingSettings) -> Self {
        Self {
            manager: CullingManager::new(settings),
            adapter: EventAdapter::new(),
            timers: Timers::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_active()
    }

    pub fn state(&self) -> CullingState {
        self.manager.state()
    }

    /// Turns culling on and settles all resulting notifications.
    pub fn enable(&mut self, doc: &mut Document) -> DocumentResult {
        self.manager.enable(doc)?;
        self.process(doc);
        Ok(())
    }

    /// Turns culling off and settles all resulting notifications.
    pub fn disable(&mut self, doc: &mut Document) -> DocumentResult {
        self.manager.disable(doc)?;
        self.process(doc);
        Ok(())
    }

    /// Drains the document's notification queue through the adapter. Call
    /// after every batch of document mutations.
    ///
    /// Handling one event can queue more (a triggered pass commits a
    /// transaction); the loop runs until the queue settles.
    pub fn process(&mut self, doc: &mut Document) {
        while let Some(event) = doc.take_event() {
            self.adapter
                .handle(event, doc, &mut self.manager, &mut self.timers);
        }
    }

    /// Advances the session clock, running any debounced reset that came
    /// due.
    pub fn advance(&mut self, doc: &mut Document, dt: std::time::Duration) {
        for task in self.timers.advance(dt) {
            match task {
                SessionTask::Reset => self.adapter.on_reset_due(doc, &mut self.manager),
            }
        }
        self.process(doc);
    }

    /// Produces a persistable snapshot of the document with the marker tag
    /// stripped, then restores the live partition.
    ///
    /// Saved documents never contain the marker; reopening one elsewhere
    /// shows every face.
    pub fn save(&mut self, doc: &mut Document) -> DocumentContent {
        doc.begin_save();
        self.process(doc);
        let snapshot = doc.content().clone();
        doc.finish_save();
        self.process(doc);
        snapshot
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<CullingNotice> {
        self.manager.take_notices()
    }

    /// Answers an [`CullingNotice::Interrupted`] notice by resuming
    /// immediately. The other valid answer is [`disable`](Self::disable).
    pub fn resume(&mut self, doc: &mut Document) -> DocumentResult {
        self.manager.resume(doc)?;
        self.process(doc);
        Ok(())
    }
}

/// Sessions for every open document, keyed by stable document identity.
#[derive(Debug)]
pub struct ManagerRegistry {
    settings: CullingSettings,
    sessions: HashMap<DocumentId, CullingSession>,
    slots: HashMap<SlotId, DocumentId>,
}

impl ManagerRegistry {
    pub fn new(settings: CullingSettings) -> Self {
        Self {
            settings,
            sessions: HashMap::new(),
            slots: HashMap::new(),
        }
    }

    /// The session for `doc`, created on first use. A slot that now holds a
    /// different document retires the stale session first.
    pub fn session_for(&mut self, doc: &Document) -> &mut CullingSession {
        if let Some(previous) = self.slots.insert(doc.slot(), doc.id())
            && previous != doc.id()
        {
            // The host reused this slot for a new document.
            self.sessions.remove(&previous);
            log::debug!("retired stale session for {previous:?}");
        }
        self.sessions
            .entry(doc.id())
            .or_insert_with(|| CullingSession::new(self.settings.clone()))
    }

    /// Enables culling for `doc`.
    pub fn enable_for(&mut self, doc: &mut Document) -> DocumentResult {
        self.session_for(doc).enable(doc)
    }

    /// Disables culling for `doc`.
    pub fn disable_for(&mut self, doc: &mut Document) -> DocumentResult {
        self.session_for(doc).disable(doc)
    }

    /// Whether culling is active for `doc`. Never creates a session.
    pub fn is_active(&self, doc: &Document) -> bool {
        self.sessions
            .get(&doc.id())
            .is_some_and(CullingSession::is_active)
    }

    /// Drops a closed document's session.
    pub fn remove(&mut self, id: DocumentId) {
        self.sessions.remove(&id);
        self.slots.retain(|_, v| *v != id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
