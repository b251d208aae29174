//! The live document: content plus session state (camera, selection, edit
//! path, undo log, active tool) and the notification queue.
//!
//! All transactional mutators require an open operation
//! ([`Document::start_operation`]) and record a reversible [`Edit`] for it.
//! Mutators that observe no actual change record nothing, so an operation
//! that ends up empty still commits but carries no edits.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::content::{Context, DocumentContent};
use crate::document::entity::{DefinitionId, Edge, Entity, EntityId, EntityKind, Face, Instance};
use crate::document::events::{DocumentEvent, EventQueue};
use crate::document::history::{
    DocumentError, DocumentResult, Edit, Operation, OperationHistory,
};
use crate::document::tags::{PageBehavior, TagCollection, TagId};
use crate::math::Point3;

/// Stable identity of a document's content, unique for the process
/// lifetime. Host document handles can be reused for unrelated documents;
/// this id never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

/// A host document handle slot. The host may open a new document into a
/// slot that previously held another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

/// Identifies the host's active interactive tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub u32);

/// Identifies an installed third-party extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(pub String);

impl ExtensionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

fn next_document_id() -> DocumentId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    DocumentId(COUNTER.fetch_add(1, Ordering::Relaxed))
}

struct PendingOperation {
    operation: Operation,
    preserve_redo: bool,
}

/// An editable document.
pub struct Document {
    id: DocumentId,
    slot: SlotId,
    content: DocumentContent,
    camera_eye: Point3,
    selection: HashSet<EntityId>,
    active_path: Vec<EntityId>,
    history: OperationHistory,
    pending: Option<PendingOperation>,
    events: EventQueue,
    active_tool: Option<ToolId>,
    loaded_extensions: HashSet<ExtensionId>,
}

impl Document {
    /// Creates an empty document in slot 0.
    pub fn new() -> Self {
        Self::new_in_slot(SlotId(0))
    }

    /// Creates an empty document in a specific handle slot.
    pub fn new_in_slot(slot: SlotId) -> Self {
        Self {
            id: next_document_id(),
            slot,
            content: DocumentContent::new(),
            camera_eye: Point3::new(0.0, 0.0, 0.0),
            selection: HashSet::new(),
            active_path: Vec::new(),
            history: OperationHistory::new(),
            pending: None,
            events: EventQueue::new(),
            active_tool: None,
            loaded_extensions: HashSet::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    pub fn tags(&self) -> &TagCollection {
        self.content.tags()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.content.entity(id)
    }

    pub fn context_entity_ids(&self, context: Context) -> Vec<EntityId> {
        self.content.context_entity_ids(context)
    }

    // -- Geometry construction (non-transactional, used when modeling) --

    pub fn create_definition(&mut self) -> DefinitionId {
        self.content.create_definition()
    }

    pub fn add_face(&mut self, context: Context, face: Face) -> DocumentResult<EntityId> {
        self.content
            .add_entity(context, EntityKind::Face(face))
            .ok_or(DocumentError::UnknownContext(context))
    }

    pub fn add_edge(&mut self, context: Context, edge: Edge) -> DocumentResult<EntityId> {
        self.content
            .add_entity(context, EntityKind::Edge(edge))
            .ok_or(DocumentError::UnknownContext(context))
    }

    /// Places an instance of `definition` into `context` and notifies
    /// observers that new nested geometry appeared.
    pub fn add_instance(
        &mut self,
        context: Context,
        definition: DefinitionId,
    ) -> DocumentResult<EntityId> {
        if !self.content.has_definition(definition) {
            return Err(DocumentError::UnknownContext(Context::Definition(definition)));
        }
        let id = self
            .content
            .add_entity(context, EntityKind::Instance(Instance::new(definition)))
            .ok_or(DocumentError::UnknownContext(context))?;
        self.events.push(DocumentEvent::InstanceCreated);
        Ok(id)
    }

    // -- Transactions --

    /// Opens a named operation. All transactional mutations until
    /// [`commit_operation`](Self::commit_operation) are grouped into one
    /// undo step (or merged into the previous step when `transparent`).
    pub fn start_operation(
        &mut self,
        name: &str,
        undoable: bool,
        preserve_redo: bool,
        transparent: bool,
    ) -> DocumentResult {
        if let Some(pending) = &self.pending {
            return Err(DocumentError::OperationAlreadyOpen(
                pending.operation.name.clone(),
            ));
        }
        self.pending = Some(PendingOperation {
            operation: Operation::new(name, undoable, transparent),
            preserve_redo,
        });
        Ok(())
    }

    /// Commits the open operation and notifies observers.
    pub fn commit_operation(&mut self) -> DocumentResult {
        let pending = self.pending.take().ok_or(DocumentError::NoOpenOperation)?;
        self.history
            .record(pending.operation, pending.preserve_redo);
        self.events.push(DocumentEvent::TransactionCommitted);
        Ok(())
    }

    /// True while an operation is open.
    pub fn operation_in_progress(&self) -> bool {
        self.pending.is_some()
    }

    pub fn undo(&mut self) -> DocumentResult {
        if self.pending.is_some() {
            return Err(DocumentError::OperationInProgress);
        }
        self.history.undo(&mut self.content, &mut self.events)?;
        self.events.push(DocumentEvent::TransactionUndone);
        Ok(())
    }

    pub fn redo(&mut self) -> DocumentResult {
        if self.pending.is_some() {
            return Err(DocumentError::OperationInProgress);
        }
        self.history.redo(&mut self.content, &mut self.events)?;
        self.events.push(DocumentEvent::TransactionRedone);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }

    fn apply_recorded(&mut self, mut edit: Edit) -> DocumentResult {
        let pending = self.pending.as_mut().ok_or(DocumentError::NoOpenOperation)?;
        edit.apply(&mut self.content, &mut self.events)?;
        pending.operation.edits.push(edit);
        Ok(())
    }

    // -- Transactional mutators --

    /// Creates a tag by name, or returns the existing one (host
    /// create-by-name semantics).
    pub fn create_tag(&mut self, name: &str) -> DocumentResult<TagId> {
        if let Some(id) = self.content.tags().find(name) {
            return Ok(id);
        }
        let id = self.content.tags_mut().allocate_id();
        self.apply_recorded(Edit::AddTag {
            id,
            name: name.to_string(),
        })?;
        Ok(id)
    }

    /// Removes a tag; its members fall back to the default tag.
    pub fn remove_tag(&mut self, id: TagId) -> DocumentResult {
        if id == TagId::DEFAULT {
            return Err(DocumentError::RemoveDefaultTag);
        }
        if !self.content.tags().contains(id) {
            return Err(DocumentError::UnknownTag(id));
        }
        self.apply_recorded(Edit::RemoveTag {
            id,
            tag: None,
            members: Vec::new(),
        })
    }

    pub fn set_tag_visible(&mut self, id: TagId, visible: bool) -> DocumentResult {
        let tag = self
            .content
            .tags()
            .get(id)
            .ok_or(DocumentError::UnknownTag(id))?;
        if tag.visible == visible {
            return Ok(());
        }
        self.apply_recorded(Edit::SetTagVisible {
            tag: id,
            old: !visible,
            new: visible,
        })
    }

    pub fn set_tag_page_behavior(&mut self, id: TagId, behavior: PageBehavior) -> DocumentResult {
        let tag = self
            .content
            .tags()
            .get(id)
            .ok_or(DocumentError::UnknownTag(id))?;
        let old = tag.page_behavior;
        if old == behavior {
            return Ok(());
        }
        self.apply_recorded(Edit::SetTagPageBehavior {
            tag: id,
            old,
            new: behavior,
        })
    }

    /// Moves an entity to a different tag.
    pub fn set_entity_tag(&mut self, entity: EntityId, tag: TagId) -> DocumentResult {
        if !self.content.tags().contains(tag) {
            return Err(DocumentError::UnknownTag(tag));
        }
        let old = self
            .content
            .entity(entity)
            .ok_or(DocumentError::UnknownEntity(entity))?
            .tag();
        if old == tag {
            return Ok(());
        }
        self.apply_recorded(Edit::SetEntityTag { entity, old, new: tag })
    }

    /// Hides or shows an entity directly, independent of its tag.
    pub fn set_entity_hidden(&mut self, entity: EntityId, hidden: bool) -> DocumentResult {
        let old = self
            .content
            .entity(entity)
            .ok_or(DocumentError::UnknownEntity(entity))?
            .hidden();
        if old == hidden {
            return Ok(());
        }
        self.apply_recorded(Edit::SetEntityHidden {
            entity,
            old,
            new: hidden,
        })
    }

    /// Erases an entity from the document.
    pub fn erase_entity(&mut self, entity: EntityId) -> DocumentResult {
        if self.content.entity(entity).is_none() {
            return Err(DocumentError::UnknownEntity(entity));
        }
        self.selection.remove(&entity);
        self.apply_recorded(Edit::EraseEntity {
            entity,
            removed: None,
        })
    }

    // -- Camera --

    pub fn camera_eye(&self) -> Point3 {
        self.camera_eye
    }

    pub fn set_camera_eye(&mut self, eye: Point3) {
        self.camera_eye = eye;
        self.events.push(DocumentEvent::ViewChanged);
    }

    // -- Selection --

    /// Replaces the selection in bulk.
    pub fn set_selection(&mut self, entities: impl IntoIterator<Item = EntityId>) {
        self.selection = entities.into_iter().collect();
        self.events.push(DocumentEvent::SelectionChanged {
            empty: self.selection.is_empty(),
        });
    }

    /// Explicitly clears the selection (distinct from a bulk change that
    /// happens to leave it empty).
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.events.push(DocumentEvent::SelectionCleared);
    }

    pub fn is_selected(&self, entity: EntityId) -> bool {
        self.selection.contains(&entity)
    }

    pub fn selection_is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    // -- Edit context (active path) --

    /// Enters a group/component instance for editing.
    pub fn open_context(&mut self, instance: EntityId) -> DocumentResult {
        let entity = self
            .content
            .entity(instance)
            .ok_or(DocumentError::UnknownEntity(instance))?;
        if entity.as_instance().is_none() {
            return Err(DocumentError::NotAnInstance(instance));
        }
        self.active_path.push(instance);
        self.events.push(DocumentEvent::ActivePathChanged);
        Ok(())
    }

    /// Leaves the innermost open context. Returns `false` at the root.
    pub fn close_context(&mut self) -> bool {
        if self.active_path.pop().is_some() {
            self.events.push(DocumentEvent::ActivePathChanged);
            true
        } else {
            false
        }
    }

    pub fn active_path(&self) -> &[EntityId] {
        &self.active_path
    }

    /// The entity sets visible for live editing: the root plus the
    /// definition of every instance on the active path. Stale path entries
    /// (instance erased while open) are skipped.
    pub fn scan_contexts(&self) -> Vec<Context> {
        let mut contexts = vec![Context::Root];
        for instance in &self.active_path {
            if let Some(entity) = self.content.entity(*instance)
                && let Some(instance) = entity.as_instance()
            {
                contexts.push(Context::Definition(instance.definition));
            }
        }
        contexts
    }

    // -- Tools and extensions --

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active_tool
    }

    pub fn set_active_tool(&mut self, tool: Option<ToolId>) {
        self.active_tool = tool;
    }

    pub fn load_extension(&mut self, extension: ExtensionId) {
        self.loaded_extensions.insert(extension);
    }

    pub fn extension_loaded(&self, extension: &ExtensionId) -> bool {
        self.loaded_extensions.contains(extension)
    }

    // -- Save lifecycle --

    /// Announces an imminent save. Observers run before the content
    /// snapshot is taken.
    pub fn begin_save(&mut self) {
        self.events.push(DocumentEvent::PreSave);
    }

    /// Announces a completed save.
    pub fn finish_save(&mut self) {
        self.events.push(DocumentEvent::PostSave);
    }

    // -- Notifications --

    /// Takes the oldest pending notification.
    pub fn take_event(&mut self) -> Option<DocumentEvent> {
        self.events.pop()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
