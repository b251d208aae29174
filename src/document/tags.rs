//! The document's tag (layer) namespace.
//!
//! Tags are pure visibility markers: an entity carries exactly one tag, and
//! an invisible tag suppresses its members from view. The default tag
//! ("untagged") always exists and can never be removed.

use std::collections::BTreeMap;

/// Identifies a tag within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagId(pub u32);

impl TagId {
    /// The reserved default tag every document starts with.
    pub const DEFAULT: TagId = TagId(0);
}

/// How a tag behaves on saved view pages that were created after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageBehavior {
    /// New pages show the tag.
    #[default]
    VisibleByDefault,
    /// New pages hide the tag.
    HiddenByDefault,
}

/// A named tag with visibility state.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub visible: bool,
    pub page_behavior: PageBehavior,
}

impl Tag {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            page_behavior: PageBehavior::default(),
        }
    }
}

/// The set of tags in a document, keyed by [`TagId`].
#[derive(Debug, Clone)]
pub struct TagCollection {
    tags: BTreeMap<TagId, Tag>,
    next_id: u32,
}

impl TagCollection {
    /// Creates a collection containing only the default tag.
    pub fn new() -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(TagId::DEFAULT, Tag::new("untagged"));
        Self { tags, next_id: 1 }
    }

    /// Allocates a fresh id without inserting anything.
    pub(crate) fn allocate_id(&mut self) -> TagId {
        let id = TagId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts a tag under a specific id. Used by edit apply/revert so that
    /// undo restores the exact identity a tag had before removal.
    pub(crate) fn insert(&mut self, id: TagId, tag: Tag) {
        self.tags.insert(id, tag);
    }

    pub(crate) fn insert_named(&mut self, id: TagId, name: impl Into<String>) {
        self.tags.insert(id, Tag::new(name));
    }

    pub(crate) fn remove(&mut self, id: TagId) -> Option<Tag> {
        if id == TagId::DEFAULT {
            return None;
        }
        self.tags.remove(&id)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.tags.contains_key(&id)
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TagId) -> Option<&mut Tag> {
        self.tags.get_mut(&id)
    }

    /// Looks a tag up by name.
    pub fn find(&self, name: &str) -> Option<TagId> {
        self.tags
            .iter()
            .find(|(_, tag)| tag.name == name)
            .map(|(id, _)| *id)
    }

    /// Number of tags, including the default tag.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> {
        self.tags.iter().map(|(id, tag)| (*id, tag))
    }
}

impl Default for TagCollection {
    fn default() -> Self {
        Self::new()
    }
}
