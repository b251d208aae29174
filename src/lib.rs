//! Live, non-destructive back-face culling for an editable 3D document.
//!
//! Back faces are suppressed by moving them onto a reserved invisible tag
//! instead of deleting or hiding them individually, so the effect is fully
//! reversible: disabling the session, removing the tag, or saving the
//! document restores every face. The partition follows the camera and the
//! document live, stays coherent across undo/redo, and never leaks into
//! saved files.
//!
//! ```
//! use backface_culling::culling::CullingSession;
//! use backface_culling::document::{Context, Document, Face};
//! use backface_culling::math::Point3;
//! use backface_culling::settings::CullingSettings;
//!
//! let mut doc = Document::new();
//! doc.set_camera_eye(Point3::new(0.0, 0.0, 10.0));
//! let face = doc
//!     .add_face(
//!         Context::Root,
//!         Face::from_vertices(vec![
//!             Point3::new(0.0, 0.0, 0.0),
//!             Point3::new(0.0, 1.0, 0.0),
//!             Point3::new(1.0, 1.0, 0.0),
//!         ])
//!         .unwrap(),
//!     )
//!     .unwrap();
//!
//! let mut session = CullingSession::new(CullingSettings::default());
//! session.enable(&mut doc).unwrap();
//!
//! // The triangle winds clockwise as seen from the camera, so it was
//! // moved onto the invisible marker tag.
//! let marker = doc.tags().find("Hide Back Faces").unwrap();
//! assert_eq!(doc.entity(face).unwrap().tag(), marker);
//!
//! session.disable(&mut doc).unwrap();
//! assert!(doc.tags().find("Hide Back Faces").is_none());
//! ```

pub mod culling;
pub mod document;
pub mod math;
pub mod settings;
pub mod timer;
