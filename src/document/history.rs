//! Reversible edits and the document's transaction log.
//!
//! Every transactional mutation is captured as an [`Edit`] that knows how
//! to apply and revert itself against [`DocumentContent`]. Committed
//! operations land on an undo stack; undo reverts an operation's edits in
//! reverse order and moves it to the redo stack. Edits re-emit the tag
//! lifecycle events they cause, so an undo that deletes a tag notifies
//! observers exactly like a forward deletion would — and does so before
//! the transaction-level undo notification.

use thiserror::Error;

use crate::document::content::{Context, DocumentContent};
use crate::document::entity::{Entity, EntityId};
use crate::document::events::{DocumentEvent, EventQueue};
use crate::document::tags::{PageBehavior, Tag, TagId};

/// Errors from misusing the document/transaction API.
///
/// These indicate a caller bug, not a recoverable document state; the
/// culling core never surfaces them to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("no operation is open")]
    NoOpenOperation,
    #[error("an operation is already open: {0:?}")]
    OperationAlreadyOpen(String),
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("unknown tag {0:?}")]
    UnknownTag(TagId),
    #[error("unknown definition in context {0:?}")]
    UnknownContext(Context),
    #[error("the default tag cannot be removed")]
    RemoveDefaultTag,
    #[error("entity {0:?} is not a group/component instance")]
    NotAnInstance(EntityId),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("cannot undo or redo while an operation is open")]
    OperationInProgress,
}

/// Result alias for document operations.
pub type DocumentResult<T = ()> = Result<T, DocumentError>;

/// One reversible mutation of document content.
#[derive(Debug)]
pub enum Edit {
    SetEntityTag {
        entity: EntityId,
        old: TagId,
        new: TagId,
    },
    SetEntityHidden {
        entity: EntityId,
        old: bool,
        new: bool,
    },
    AddTag {
        id: TagId,
        name: String,
    },
    RemoveTag {
        id: TagId,
        /// The removed tag, captured on apply for revert.
        tag: Option<Tag>,
        /// Entities that carried the tag; removal reassigns them to the
        /// default tag, revert puts them back.
        members: Vec<EntityId>,
    },
    SetTagVisible {
        tag: TagId,
        old: bool,
        new: bool,
    },
    SetTagPageBehavior {
        tag: TagId,
        old: PageBehavior,
        new: PageBehavior,
    },
    EraseEntity {
        entity: EntityId,
        /// Captured on apply so revert can restore the entity in place.
        removed: Option<(Context, Entity)>,
    },
}

impl Edit {
    /// Applies the edit (forward / redo direction).
    pub fn apply(&mut self, content: &mut DocumentContent, events: &mut EventQueue) -> DocumentResult {
        match self {
            Edit::SetEntityTag { entity, new, .. } => {
                content
                    .entity_mut(*entity)
                    .ok_or(DocumentError::UnknownEntity(*entity))?
                    .set_tag(*new);
            }
            Edit::SetEntityHidden { entity, new, .. } => {
                content
                    .entity_mut(*entity)
                    .ok_or(DocumentError::UnknownEntity(*entity))?
                    .set_hidden(*new);
            }
            Edit::AddTag { id, name } => {
                content.tags_mut().insert_named(*id, name.clone());
                events.push(DocumentEvent::TagAdded {
                    id: *id,
                    name: name.clone(),
                });
            }
            Edit::RemoveTag { id, tag, members } => {
                // Removing a tag reassigns its members to the default tag.
                members.clear();
                for eid in content.all_entity_ids() {
                    if content.entity(eid).map(|e| e.tag()) == Some(*id) {
                        members.push(eid);
                    }
                }
                for eid in members.iter() {
                    if let Some(entity) = content.entity_mut(*eid) {
                        entity.set_tag(TagId::DEFAULT);
                    }
                }
                let removed = content
                    .tags_mut()
                    .remove(*id)
                    .ok_or(DocumentError::UnknownTag(*id))?;
                events.push(DocumentEvent::TagRemoved {
                    name: removed.name.clone(),
                });
                *tag = Some(removed);
            }
            Edit::SetTagVisible { tag, new, .. } => {
                content
                    .tags_mut()
                    .get_mut(*tag)
                    .ok_or(DocumentError::UnknownTag(*tag))?
                    .visible = *new;
            }
            Edit::SetTagPageBehavior { tag, new, .. } => {
                content
                    .tags_mut()
                    .get_mut(*tag)
                    .ok_or(DocumentError::UnknownTag(*tag))?
                    .page_behavior = *new;
            }
            Edit::EraseEntity { entity, removed } => {
                *removed = Some(
                    content
                        .remove_entity(*entity)
                        .ok_or(DocumentError::UnknownEntity(*entity))?,
                );
            }
        }
        Ok(())
    }

    /// Reverts the edit (undo direction).
    pub fn revert(&mut self, content: &mut DocumentContent, events: &mut EventQueue) -> DocumentResult {
        match self {
            Edit::SetEntityTag { entity, old, .. } => {
                content
                    .entity_mut(*entity)
                    .ok_or(DocumentError::UnknownEntity(*entity))?
                    .set_tag(*old);
            }
            Edit::SetEntityHidden { entity, old, .. } => {
                content
                    .entity_mut(*entity)
                    .ok_or(DocumentError::UnknownEntity(*entity))?
                    .set_hidden(*old);
            }
            Edit::AddTag { id, name } => {
                content
                    .tags_mut()
                    .remove(*id)
                    .ok_or(DocumentError::UnknownTag(*id))?;
                events.push(DocumentEvent::TagRemoved { name: name.clone() });
            }
            Edit::RemoveTag { id, tag, members } => {
                let restored = tag.take().ok_or(DocumentError::UnknownTag(*id))?;
                let name = restored.name.clone();
                content.tags_mut().insert(*id, restored);
                for eid in members.iter() {
                    if let Some(entity) = content.entity_mut(*eid) {
                        entity.set_tag(*id);
                    }
                }
                events.push(DocumentEvent::TagAdded { id: *id, name });
            }
            Edit::SetTagVisible { tag, old, .. } => {
                content
                    .tags_mut()
                    .get_mut(*tag)
                    .ok_or(DocumentError::UnknownTag(*tag))?
                    .visible = *old;
            }
            Edit::SetTagPageBehavior { tag, old, .. } => {
                content
                    .tags_mut()
                    .get_mut(*tag)
                    .ok_or(DocumentError::UnknownTag(*tag))?
                    .page_behavior = *old;
            }
            Edit::EraseEntity { entity, removed } => {
                let (context, entity_data) =
                    removed.take().ok_or(DocumentError::UnknownEntity(*entity))?;
                content.restore_entity(context, entity_data);
            }
        }
        Ok(())
    }
}

/// A committed (or committing) group of edits, one undo step.
#[derive(Debug)]
pub struct Operation {
    pub name: String,
    /// Non-undoable operations are applied but never recorded.
    pub undoable: bool,
    /// Transparent operations merge into the previous undo entry instead of
    /// forming their own step.
    pub transparent: bool,
    pub edits: Vec<Edit>,
}

impl Operation {
    pub fn new(name: impl Into<String>, undoable: bool, transparent: bool) -> Self {
        Self {
            name: name.into(),
            undoable,
            transparent,
            edits: Vec::new(),
        }
    }
}

/// Linear undo/redo log of committed operations.
#[derive(Debug, Default)]
pub struct OperationHistory {
    undo_stack: Vec<Operation>,
    redo_stack: Vec<Operation>,
}

impl OperationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a committed operation.
    ///
    /// Non-undoable operations are dropped. Transparent operations merge
    /// into the top undo entry when one exists. Unless `preserve_redo` is
    /// set, committing discards the redo branch.
    pub fn record(&mut self, operation: Operation, preserve_redo: bool) {
        if operation.undoable {
            if operation.transparent
                && let Some(last) = self.undo_stack.last_mut()
            {
                last.edits.extend(operation.edits);
            } else {
                self.undo_stack.push(operation);
            }
        }
        if !preserve_redo {
            self.redo_stack.clear();
        }
    }

    /// Undoes the most recent operation, reverting its edits in reverse
    /// order.
    pub fn undo(
        &mut self,
        content: &mut DocumentContent,
        events: &mut EventQueue,
    ) -> DocumentResult {
        let mut operation = self.undo_stack.pop().ok_or(DocumentError::NothingToUndo)?;
        for edit in operation.edits.iter_mut().rev() {
            edit.revert(content, events)?;
        }
        self.redo_stack.push(operation);
        Ok(())
    }

    /// Re-applies the most recently undone operation.
    pub fn redo(
        &mut self,
        content: &mut DocumentContent,
        events: &mut EventQueue,
    ) -> DocumentResult {
        let mut operation = self.redo_stack.pop().ok_or(DocumentError::NothingToRedo)?;
        for edit in operation.edits.iter_mut() {
            edit.apply(content, events)?;
        }
        self.undo_stack.push(operation);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
