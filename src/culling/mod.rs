//! Live back-face culling.
//!
//! Faces are partitioned into front-facing and back-facing against the
//! current camera; back-facing faces are suppressed by moving them onto an
//! invisible marker tag. The partition is maintained incrementally as the
//! camera orbits and the document changes, never destructively: disabling
//! (or saving) puts every face back.
//!
//! - [`CullingSession`] is the per-document entry point
//! - [`ManagerRegistry`] keys sessions by document identity
//! - [`CullingManager`] is the lifecycle state machine underneath
//! - [`reclassify`] is the single scan pass

mod adapter;
mod engine;
mod manager;
mod partition;
mod session;

pub use adapter::{EventAdapter, SessionTask};
pub use engine::{OPERATION_NAME, UpdateStats, reclassify};
pub use manager::{CullingManager, CullingNotice, CullingState};
pub use partition::PartitionStore;
pub use session::{CullingSession, ManagerRegistry};
