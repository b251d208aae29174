//! The marker tag that represents the "currently suppressed" partition.
//!
//! Faces carrying the marker tag are hidden from view; everything else is
//! untouched. The store owns the tag's lifecycle as a transactional side
//! effect and tolerates the tag disappearing underneath it (external
//! deletion, undo).

use crate::document::{Document, DocumentResult, PageBehavior, TagId};

/// Owns the marker tag for one document.
#[derive(Debug)]
pub struct PartitionStore {
    tag_name: String,
    marker: Option<TagId>,
}

impl PartitionStore {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            marker: None,
        }
    }

    /// The reserved tag name this store manages.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// The marker's id, if the store currently holds one.
    pub fn marker(&self) -> Option<TagId> {
        self.marker
    }

    /// Adopts a marker tag created elsewhere (observed via a tag-added
    /// notification during undo/redo).
    pub fn adopt(&mut self, id: TagId) {
        self.marker = Some(id);
    }

    /// Drops the cached marker without touching the document (the tag is
    /// already gone).
    pub fn forget(&mut self) {
        self.marker = None;
    }

    /// Creates the marker tag if it does not exist.
    ///
    /// Returns `true` if the tag was created by this call. Creation is one
    /// committed operation: add the tag, make it invisible, and keep it off
    /// saved view pages. The caller runs the first reclassification
    /// afterwards — outside this transaction.
    pub fn ensure_exists(&mut self, doc: &mut Document, transparent: bool) -> DocumentResult<bool> {
        if let Some(id) = self.marker
            && doc.tags().contains(id)
        {
            return Ok(false);
        }

        doc.start_operation(&self.tag_name, true, false, transparent)?;
        let id = doc.create_tag(&self.tag_name)?;
        doc.set_tag_visible(id, false)?;
        doc.set_tag_page_behavior(id, PageBehavior::HiddenByDefault)?;
        doc.commit_operation()?;

        log::debug!("created marker tag {:?} ({})", id, self.tag_name);
        self.marker = Some(id);
        Ok(true)
    }

    /// Removes the marker tag if it exists.
    ///
    /// Returns `true` if the tag was removed by this call. Removal
    /// reassigns the tag's members to the default tag per host semantics,
    /// so every suppressed face becomes visible again.
    pub fn ensure_absent(&mut self, doc: &mut Document, transparent: bool) -> DocumentResult<bool> {
        let Some(id) = self.marker else {
            return Ok(false);
        };
        if !doc.tags().contains(id) {
            // Deleted externally (or by undo); nothing left to do.
            self.marker = None;
            return Ok(false);
        }

        doc.start_operation("Show Back Faces", true, false, transparent)?;
        doc.remove_tag(id)?;
        doc.commit_operation()?;

        log::debug!("removed marker tag {:?} ({})", id, self.tag_name);
        self.marker = None;
        Ok(true)
    }
}
