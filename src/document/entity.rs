//! Drawing entities: faces, edges, and group/component instances.

use crate::document::tags::TagId;
use crate::math::{Point3, Vec3, polygon_normal};

/// Identifies an entity within a document. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

/// Identifies a group/component definition within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionId(pub u32);

/// A planar polygonal face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Outward normal. Supplied by the geometry kernel; assumed non-degenerate.
    pub normal: Vec3,
    /// Vertex positions. A well-formed face has at least three.
    pub vertices: Vec<Point3>,
}

impl Face {
    /// Creates a face with an explicit normal.
    pub fn new(normal: Vec3, vertices: Vec<Point3>) -> Self {
        Self { normal, vertices }
    }

    /// Creates a face from its vertex loop, deriving the normal via
    /// Newell's method. Returns `None` for degenerate loops.
    pub fn from_vertices(vertices: Vec<Point3>) -> Option<Self> {
        let normal = polygon_normal(&vertices)?;
        Some(Self { normal, vertices })
    }

    /// An arbitrary point on the face, if it has any vertices.
    pub fn any_point(&self) -> Option<&Point3> {
        self.vertices.first()
    }
}

/// A straight edge between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub start: Point3,
    pub end: Point3,
}

impl Edge {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }
}

/// An instance of a group/component definition placed in a context.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// The definition whose entities this instance shows.
    pub definition: DefinitionId,
    /// Optional instance name.
    pub name: Option<String>,
}

impl Instance {
    pub fn new(definition: DefinitionId) -> Self {
        Self {
            definition,
            name: None,
        }
    }

    /// Set the instance name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The geometric payload of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Face(Face),
    Edge(Edge),
    Instance(Instance),
}

/// An entity in the document graph.
///
/// Every entity carries exactly one tag assignment at a time, plus a
/// per-entity hidden flag independent of tag visibility.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    tag: TagId,
    hidden: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            tag: TagId::DEFAULT,
            hidden: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// The entity's current tag assignment.
    pub fn tag(&self) -> TagId {
        self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: TagId) {
        self.tag = tag;
    }

    /// Whether the entity was hidden directly (independent of its tag).
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn as_face(&self) -> Option<&Face> {
        match &self.kind {
            EntityKind::Face(face) => Some(face),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match &self.kind {
            EntityKind::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, EntityKind::Edge(_))
    }
}
