//! An in-memory, event-emitting 3D document model.
//!
//! This is the editable substrate the culling engine operates on: an entity
//! graph (faces, edges, group/component instances nested through
//! definitions), a tag namespace used as visibility markers, a camera, a
//! selection set, an edit-context stack, and a transactional undo/redo log.
//! Observable changes queue [`DocumentEvent`]s that the host loop delivers
//! serially.
//!
//! - [`Document`] — the live document and its mutation API
//! - [`DocumentContent`] — the persistable body (entities + tags)
//! - [`Edit`] / [`OperationHistory`] — reversible edits and the undo log
//! - [`DocumentEvent`] — change notifications

mod content;
mod entity;
mod events;
mod history;
mod model;
mod tags;

pub use content::{Context, DocumentContent};
pub use entity::{DefinitionId, Edge, Entity, EntityId, EntityKind, Face, Instance};
pub use events::{DocumentEvent, EventQueue};
pub use history::{DocumentError, DocumentResult, Edit, Operation, OperationHistory};
pub use model::{Document, DocumentId, ExtensionId, SlotId, ToolId};
pub use tags::{PageBehavior, Tag, TagCollection, TagId};
