//! The scan-and-reclassify pass.
//!
//! One pass walks the root entities plus every open edit context, compares
//! each eligible face's orientation against the camera, and moves faces
//! across the partition boundary. Faces inside closed groups are left at
//! whatever partition they last had. All mutations of one pass are batched
//! into a single transparent transaction, opened lazily on the first actual
//! mutation — a pass that changes nothing commits nothing, so the undo log
//! never collects empty steps.

use crate::document::{Document, DocumentResult, EntityId, TagId};
use crate::math::{Point3, is_front_facing};

/// Name of the transaction a reclassification pass commits.
pub const OPERATION_NAME: &str = "Back Face Culling";

/// What one reclassification pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    /// Faces moved into the marker (now back-facing).
    pub suppressed: usize,
    /// Faces moved back to the default tag (front-facing or selected).
    pub restored: usize,
    /// Non-face entities found in the marker and reassigned.
    pub repaired: usize,
    /// Broken edges found in the marker and erased.
    pub erased: usize,
}

impl UpdateStats {
    /// True if the pass performed any mutation (and therefore committed a
    /// transaction).
    pub fn mutated(&self) -> bool {
        self.suppressed + self.restored + self.repaired + self.erased > 0
    }
}

enum Action {
    Suppress,
    Restore,
    Repair,
    Erase,
}

fn classify(
    doc: &Document,
    id: EntityId,
    marker: TagId,
    eye: &Point3,
    remove_broken_edges: bool,
) -> Option<Action> {
    // Entities can vanish mid-pass (broken host references); skip quietly.
    let entity = doc.entity(id)?;

    if let Some(face) = entity.as_face() {
        if entity.hidden() {
            // Hidden by the user independently of culling; preserve intent.
            return None;
        }
        if doc.is_selected(id) {
            // Selected geometry must stay directly operable: pull it out of
            // the marker and leave it alone until deselected.
            return (entity.tag() == marker).then_some(Action::Restore);
        }
        let point = face.any_point()?;
        let front = is_front_facing(&face.normal, point, eye);
        if entity.tag() == marker {
            return front.then_some(Action::Restore);
        }
        if entity.tag() == TagId::DEFAULT {
            return (!front).then_some(Action::Suppress);
        }
        // Faces on unrelated tags are not part of the partition.
        return None;
    }

    // Only faces belong in the marker. Stranded edges (leftovers of a
    // partial erase) are swept out only when a deletion was signalled;
    // anything else is reassigned on sight.
    if entity.tag() == marker {
        if entity.is_edge() {
            return remove_broken_edges.then_some(Action::Erase);
        }
        return Some(Action::Repair);
    }
    None
}

/// Runs one reclassification pass over the document's visible contexts.
///
/// The caller is responsible for lifecycle gating (only Active managers
/// reclassify) and conflict suppression; this function assumes the pass
/// should run.
pub fn reclassify(
    doc: &mut Document,
    marker: TagId,
    remove_broken_edges: bool,
) -> DocumentResult<UpdateStats> {
    let eye = doc.camera_eye();
    let mut stats = UpdateStats::default();
    let mut opened = false;

    for context in doc.scan_contexts() {
        for id in doc.context_entity_ids(context) {
            let Some(action) = classify(doc, id, marker, &eye, remove_broken_edges) else {
                continue;
            };
            if !opened {
                doc.start_operation(OPERATION_NAME, true, false, true)?;
                opened = true;
            }
            match action {
                Action::Suppress => {
                    doc.set_entity_tag(id, marker)?;
                    stats.suppressed += 1;
                }
                Action::Restore => {
                    doc.set_entity_tag(id, TagId::DEFAULT)?;
                    stats.restored += 1;
                }
                Action::Repair => {
                    log::warn!("non-face entity {id:?} carried the marker tag; reassigning");
                    doc.set_entity_tag(id, TagId::DEFAULT)?;
                    stats.repaired += 1;
                }
                Action::Erase => {
                    log::warn!("erasing broken edge {id:?} left in the marker tag");
                    // The host refuses to erase members of an invisible tag;
                    // expose the marker for the duration of the erase. The
                    // marker is re-hidden even if the erase fails.
                    doc.set_tag_visible(marker, true)?;
                    let erased = doc.erase_entity(id);
                    doc.set_tag_visible(marker, false)?;
                    erased?;
                    stats.erased += 1;
                }
            }
        }
    }

    if opened {
        doc.commit_operation()?;
        log::debug!(
            "reclassified: {} suppressed, {} restored, {} repaired, {} erased",
            stats.suppressed,
            stats.restored,
            stats.repaired,
            stats.erased,
        );
    }
    Ok(stats)
}
