//! The persistable body of a document: entity stores and the tag namespace.
//!
//! [`DocumentContent`] is everything that would be written to disk on save.
//! Camera, selection, edit path, and the undo log live on
//! [`Document`](super::Document) instead. Content is `Clone` so save can
//! hand out a snapshot.

use std::collections::{BTreeMap, HashMap};

use crate::document::entity::{DefinitionId, Entity, EntityId, EntityKind};
use crate::document::tags::TagCollection;

/// Where an entity lives: the document root or a definition's entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Root,
    Definition(DefinitionId),
}

/// Entity stores, definitions, and tags of one document.
#[derive(Debug, Clone)]
pub struct DocumentContent {
    root: BTreeMap<EntityId, Entity>,
    definitions: BTreeMap<DefinitionId, BTreeMap<EntityId, Entity>>,
    /// Maps each live entity to the store holding it.
    index: HashMap<EntityId, Context>,
    tags: TagCollection,
    next_entity: u64,
    next_definition: u32,
}

impl DocumentContent {
    pub fn new() -> Self {
        Self {
            root: BTreeMap::new(),
            definitions: BTreeMap::new(),
            index: HashMap::new(),
            tags: TagCollection::new(),
            next_entity: 1,
            next_definition: 1,
        }
    }

    pub fn tags(&self) -> &TagCollection {
        &self.tags
    }

    pub(crate) fn tags_mut(&mut self) -> &mut TagCollection {
        &mut self.tags
    }

    /// Creates a new, empty group/component definition.
    pub fn create_definition(&mut self) -> DefinitionId {
        let id = DefinitionId(self.next_definition);
        self.next_definition += 1;
        self.definitions.insert(id, BTreeMap::new());
        id
    }

    pub fn has_definition(&self, id: DefinitionId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Adds an entity to a context, assigning it a fresh id.
    ///
    /// Returns `None` if the context's definition does not exist.
    pub(crate) fn add_entity(&mut self, context: Context, kind: EntityKind) -> Option<EntityId> {
        let store = match context {
            Context::Root => &mut self.root,
            Context::Definition(def) => self.definitions.get_mut(&def)?,
        };
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        store.insert(id, Entity::new(id, kind));
        self.index.insert(id, context);
        Some(id)
    }

    /// Removes an entity, returning it together with the context it was in.
    pub(crate) fn remove_entity(&mut self, id: EntityId) -> Option<(Context, Entity)> {
        let context = self.index.remove(&id)?;
        let store = match context {
            Context::Root => &mut self.root,
            Context::Definition(def) => self.definitions.get_mut(&def)?,
        };
        store.remove(&id).map(|entity| (context, entity))
    }

    /// Re-inserts a previously removed entity under its original id.
    pub(crate) fn restore_entity(&mut self, context: Context, entity: Entity) {
        let id = entity.id();
        let store = match context {
            Context::Root => &mut self.root,
            Context::Definition(def) => self
                .definitions
                .entry(def)
                .or_default(),
        };
        store.insert(id, entity);
        self.index.insert(id, context);
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        let context = self.index.get(&id)?;
        match context {
            Context::Root => self.root.get(&id),
            Context::Definition(def) => self.definitions.get(def)?.get(&id),
        }
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let context = self.index.get(&id)?;
        match context {
            Context::Root => self.root.get_mut(&id),
            Context::Definition(def) => self.definitions.get_mut(def)?.get_mut(&id),
        }
    }

    /// Entity ids in one context, in id order. Empty for unknown definitions.
    pub fn context_entity_ids(&self, context: Context) -> Vec<EntityId> {
        match context {
            Context::Root => self.root.keys().copied().collect(),
            Context::Definition(def) => self
                .definitions
                .get(&def)
                .map(|store| store.keys().copied().collect())
                .unwrap_or_default(),
        }
    }

    /// All live entity ids across the root and every definition.
    pub fn all_entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.index.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn entity_count(&self) -> usize {
        self.index.len()
    }
}

impl Default for DocumentContent {
    fn default() -> Self {
        Self::new()
    }
}
