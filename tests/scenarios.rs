//! End-to-end scenarios driving a session the way a host event loop would:
//! mutate the document, then `process` (or `advance`) and check the
//! partition.

use std::time::Duration;

use backface_culling::culling::{CullingNotice, CullingSession, CullingState, ManagerRegistry};
use backface_culling::document::{
    Context, Document, Edge, EntityId, Face, SlotId, TagId, ToolId,
};
use backface_culling::math::{Point3, Vec3};
use backface_culling::settings::{CullingSettings, ToolConflict};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An axis-aligned unit cube: six quads with outward normals.
fn add_cube(doc: &mut Document) -> Vec<EntityId> {
    let quads: [(Vec3, [Point3; 4]); 6] = [
        (
            Vec3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
        ),
        (
            Vec3::new(0.0, 0.0, -1.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
        ),
        (
            Vec3::new(1.0, 0.0, 0.0),
            [
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
        ),
        (
            Vec3::new(-1.0, 0.0, 0.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        ),
        (
            Vec3::new(0.0, 1.0, 0.0),
            [
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        ),
        (
            Vec3::new(0.0, -1.0, 0.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        ),
    ];
    quads
        .into_iter()
        .map(|(normal, verts)| {
            doc.add_face(Context::Root, Face::new(normal, verts.to_vec()))
                .unwrap()
        })
        .collect()
}

fn suppressed(doc: &Document, marker: TagId, faces: &[EntityId]) -> Vec<EntityId> {
    faces
        .iter()
        .copied()
        .filter(|id| doc.entity(*id).unwrap().tag() == marker)
        .collect()
}

#[test]
fn orbiting_a_cube_tracks_the_silhouette() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let marker = doc.tags().find("Hide Back Faces").unwrap();

    // Looking straight down +z from above the cube: only the top face
    // shows; the bottom and the four edge-on sides are hidden.
    assert_eq!(suppressed(&doc, marker, &faces), faces[1..].to_vec());

    // Orbit to a corner: three faces visible, three hidden.
    doc.set_camera_eye(Point3::new(10.0, 10.0, 10.0));
    session.process(&mut doc);
    assert_eq!(
        suppressed(&doc, marker, &faces),
        vec![faces[1], faces[3], faces[5]]
    );

    // Orbit to the opposite corner: the partition flips.
    doc.set_camera_eye(Point3::new(-10.0, -10.0, -10.0));
    session.process(&mut doc);
    assert_eq!(
        suppressed(&doc, marker, &faces),
        vec![faces[0], faces[2], faces[4]]
    );
}

#[test]
fn settled_partition_commits_nothing_further() {
    init_logging();
    let mut doc = Document::new();
    add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();

    let undo = doc.undo_count();
    // Re-announcing the same camera must not open a new transaction.
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));
    session.process(&mut doc);
    assert_eq!(doc.undo_count(), undo);
    assert_eq!(doc.pending_events(), 0);
}

#[test]
fn selected_faces_stay_visible_until_deselected() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    let hidden = faces[1];
    assert_eq!(doc.entity(hidden).unwrap().tag(), marker);

    doc.set_selection([hidden]);
    session.process(&mut doc);
    assert_eq!(doc.entity(hidden).unwrap().tag(), TagId::DEFAULT);

    doc.clear_selection();
    session.process(&mut doc);
    assert_eq!(doc.entity(hidden).unwrap().tag(), marker);
}

#[test]
fn undo_interrupts_and_any_edit_resumes() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();

    doc.start_operation("Hide top", true, false, false).unwrap();
    doc.set_entity_hidden(faces[0], true).unwrap();
    doc.commit_operation().unwrap();
    session.process(&mut doc);

    doc.undo().unwrap();
    session.process(&mut doc);
    assert_eq!(session.state(), CullingState::Paused);
    assert_eq!(session.take_notices(), vec![CullingNotice::Interrupted]);

    doc.start_operation("Nudge", true, false, false).unwrap();
    doc.commit_operation().unwrap();
    session.process(&mut doc);
    assert_eq!(session.state(), CullingState::Active);
    assert!(session.take_notices().is_empty());
}

#[test]
fn undoing_past_the_enable_detaches_and_redo_reattaches() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);

    // Undo the enabling step: the tag vanishes and the session follows.
    doc.undo().unwrap();
    session.process(&mut doc);
    assert_eq!(session.state(), CullingState::Disabled);
    assert!(doc.tags().find("Hide Back Faces").is_none());
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), TagId::DEFAULT);

    // Redo restores tag and membership; the session re-attaches without
    // fighting the history replay.
    doc.redo().unwrap();
    session.process(&mut doc);
    assert_eq!(session.state(), CullingState::Active);
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);
}

#[test]
fn empty_bulk_selection_sweeps_broken_edges() {
    init_logging();
    let mut doc = Document::new();
    add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let marker = doc.tags().find("Hide Back Faces").unwrap();

    // Leave an edge stranded in the marker, as a partial erase would.
    let edge = doc
        .add_edge(
            Context::Root,
            Edge::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
        )
        .unwrap();
    doc.start_operation("Corrupt", true, false, false).unwrap();
    doc.set_entity_tag(edge, marker).unwrap();
    doc.commit_operation().unwrap();

    // Ordinary triggers leave the stranded edge alone.
    session.process(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));
    session.process(&mut doc);
    assert_eq!(doc.entity(edge).unwrap().tag(), marker);

    // An empty bulk selection signals a deletion; the sweep erases the
    // edge and leaves the marker invisible as before.
    doc.set_selection([]);
    session.process(&mut doc);
    assert!(doc.entity(edge).is_none());
    assert!(!doc.tags().get(marker).unwrap().visible);
}

#[test]
fn save_produces_a_clean_snapshot() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let undo = doc.undo_count();

    let snapshot = session.save(&mut doc);

    // The snapshot has no trace of the marker.
    assert!(snapshot.tags().find("Hide Back Faces").is_none());
    for id in &faces {
        assert_eq!(snapshot.entity(*id).unwrap().tag(), TagId::DEFAULT);
    }

    // The live document culls again, with no extra undo steps.
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);
    assert_eq!(doc.undo_count(), undo);
}

#[test]
fn repeated_save_announcements_strip_only_once() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let undo = doc.undo_count();

    // A retried autosave can announce the save twice before finishing;
    // the second announcement must be a no-op.
    doc.begin_save();
    doc.begin_save();
    session.process(&mut doc);
    assert!(doc.tags().find("Hide Back Faces").is_none());
    assert_eq!(session.state(), CullingState::Active);

    doc.finish_save();
    session.process(&mut doc);
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);
    assert_eq!(session.state(), CullingState::Active);
    assert_eq!(doc.undo_count(), undo);
}

#[test]
fn disable_answers_the_pause_by_stopping() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();

    doc.start_operation("Hide top", true, false, false).unwrap();
    doc.set_entity_hidden(faces[0], true).unwrap();
    doc.commit_operation().unwrap();
    session.process(&mut doc);
    doc.undo().unwrap();
    session.process(&mut doc);
    assert_eq!(session.state(), CullingState::Paused);
    assert_eq!(session.take_notices(), vec![CullingNotice::Interrupted]);

    // The other answer to the interruption: stop culling entirely.
    session.disable(&mut doc).unwrap();
    assert_eq!(session.state(), CullingState::Disabled);
    assert!(doc.tags().find("Hide Back Faces").is_none());
    for id in &faces {
        assert_eq!(doc.entity(*id).unwrap().tag(), TagId::DEFAULT);
    }
}

#[test]
fn entering_a_group_resets_after_the_debounce() {
    init_logging();
    let mut doc = Document::new();
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let def = doc.create_definition();
    let nested = doc
        .add_face(
            Context::Definition(def),
            Face::new(
                Vec3::new(0.0, 0.0, -1.0),
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                    Point3::new(1.0, 1.0, 0.0),
                ],
            ),
        )
        .unwrap();
    let instance = doc.add_instance(Context::Root, def).unwrap();

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    assert_eq!(doc.entity(nested).unwrap().tag(), TagId::DEFAULT);

    doc.open_context(instance).unwrap();
    session.process(&mut doc);
    // Not yet: the reset is debounced.
    assert_eq!(doc.entity(nested).unwrap().tag(), TagId::DEFAULT);

    session.advance(&mut doc, Duration::from_millis(100));
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(nested).unwrap().tag(), marker);
}

#[test]
fn rapid_context_changes_coalesce_into_one_reset() {
    init_logging();
    let mut doc = Document::new();
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));
    let def = doc.create_definition();
    let a = doc.add_instance(Context::Root, def).unwrap();
    let b = doc.add_instance(Context::Root, def).unwrap();

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    let undo = doc.undo_count();

    doc.open_context(a).unwrap();
    doc.close_context();
    doc.open_context(b).unwrap();
    session.process(&mut doc);
    session.advance(&mut doc, Duration::from_millis(100));

    // One transparent rebuild, not three; no new undo steps either way.
    assert_eq!(doc.undo_count(), undo);
    assert!(session.is_active());
}

#[test]
fn conflicting_tool_defers_reclassification() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let settings = CullingSettings {
        tool_conflicts: vec![ToolConflict {
            tool: ToolId(21048),
            requires_extension: None,
        }],
        ..Default::default()
    };
    let mut session = CullingSession::new(settings);
    session.enable(&mut doc).unwrap();
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);

    // With the conflicting tool active, camera moves change nothing.
    doc.set_active_tool(Some(ToolId(21048)));
    doc.set_camera_eye(Point3::new(0.5, 0.5, -10.0));
    session.process(&mut doc);
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);

    // Dropping the tool lets the next trigger catch up.
    doc.set_active_tool(None);
    doc.set_camera_eye(Point3::new(0.5, 0.5, -10.0));
    session.process(&mut doc);
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), TagId::DEFAULT);
}

#[test]
fn third_party_tags_are_never_touched() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    doc.start_operation("Organize", true, false, false).unwrap();
    let structure = doc.create_tag("Structure").unwrap();
    doc.set_entity_tag(faces[1], structure).unwrap();
    doc.commit_operation().unwrap();

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();

    // The back face on a user tag was left alone.
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), structure);

    session.disable(&mut doc).unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), structure);
    assert!(doc.tags().contains(structure));
}

#[test]
fn disable_then_enable_equals_a_clean_enable() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(10.0, 10.0, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    session.disable(&mut doc).unwrap();
    session.enable(&mut doc).unwrap();

    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(
        suppressed(&doc, marker, &faces),
        vec![faces[1], faces[3], faces[5]]
    );
    assert!(session.is_active());
}

#[test]
fn registry_tracks_documents_across_slot_reuse() {
    init_logging();
    let mut registry = ManagerRegistry::new(CullingSettings::default());

    let mut first = Document::new_in_slot(SlotId(1));
    add_cube(&mut first);
    first.set_camera_eye(Point3::new(0.5, 0.5, 10.0));
    registry.enable_for(&mut first).unwrap();
    assert!(registry.is_active(&first));

    let mut second = Document::new_in_slot(SlotId(2));
    assert!(!registry.is_active(&second));
    registry.enable_for(&mut second).unwrap();
    assert_eq!(registry.session_count(), 2);

    // The host closes the first document and opens a new one in its slot;
    // the replacement starts from a fresh, inactive session.
    let replacement = Document::new_in_slot(SlotId(1));
    registry.session_for(&replacement);
    assert!(!registry.is_active(&replacement));
    assert!(registry.is_active(&second));
    assert_eq!(registry.session_count(), 2);
}

#[test]
fn disable_is_a_single_undoable_step() {
    init_logging();
    let mut doc = Document::new();
    let faces = add_cube(&mut doc);
    doc.set_camera_eye(Point3::new(0.5, 0.5, 10.0));

    let mut session = CullingSession::new(CullingSettings::default());
    session.enable(&mut doc).unwrap();
    session.disable(&mut doc).unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), TagId::DEFAULT);

    // Undoing the disable brings the tag and its membership back. The
    // session re-attaches but holds still, like any other undo.
    doc.undo().unwrap();
    session.process(&mut doc);
    let marker = doc.tags().find("Hide Back Faces").unwrap();
    assert_eq!(doc.entity(faces[1]).unwrap().tag(), marker);
    assert_eq!(session.state(), CullingState::Paused);
    assert_eq!(session.take_notices(), vec![CullingNotice::Interrupted]);
}
