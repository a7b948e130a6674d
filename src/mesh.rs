//! Arena holding the boundary structure shared by a polyhedron and every
//! piece split off it.
//!
//! Vertices, edges and polygons are addressed by typed slotmap keys. Pieces
//! produced by splitting reference the same keys as their parents, which is
//! how adjacent faces agree on where a shared edge was cut.

use crate::edge::Edge;
use crate::errors::ClipError;
use crate::float_types::{MIN_EDGE_LENGTH, Real};
use crate::polygon::Polygon;
use crate::vertex::{Vertex, VertexPool};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct PolygonId;
}

/// Outcome of splitting an element by a plane.
///
/// `front` and `back` are the parts on the outside and inside of the plane;
/// `splitter` is where the element meets the plane (a vertex for an edge, an
/// edge for a polygon, a polygon for a polyhedron). An element lying in the
/// plane reports itself as both `front` and `back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<T, S> {
    pub front: Option<T>,
    pub back: Option<T>,
    pub splitter: Option<S>,
}

impl<T: PartialEq, S> Split<T, S> {
    pub const fn new(front: Option<T>, back: Option<T>, splitter: Option<S>) -> Self {
        Split {
            front,
            back,
            splitter,
        }
    }

    /// True when the element lies in the plane.
    pub fn is_coplanar(&self) -> bool {
        self.front.is_some() && self.front == self.back
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) polygons: SlotMap<PolygonId, Polygon>,
    pool: VertexPool<VertexId>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vertex at `pos`, reusing a coincident one when the mesh already has it.
    pub fn vertex(&mut self, pos: Point3<Real>) -> VertexId {
        if let Some(id) = self.pool.find(&pos) {
            return id;
        }
        let id = self.vertices.insert(Vertex::new(pos));
        self.pool.insert(pos, id);
        id
    }

    pub fn position(&self, id: VertexId) -> Point3<Real> {
        self.vertices[id].pos
    }

    pub fn vertex_ref(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub fn edge_ref(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn polygon_ref(&self, id: PolygonId) -> &Polygon {
        &self.polygons[id]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// The registered edge joining `a` and `b`, in either direction.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&edge_key(a, b)).copied()
    }

    /// The edge joining `a` and `b`, created if the mesh has none yet.
    pub fn edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, ClipError> {
        if let Some(id) = self.find_edge(a, b) {
            return Ok(id);
        }
        let (pa, pb) = (self.position(a), self.position(b));
        if a == b || (pb - pa).norm() < MIN_EDGE_LENGTH {
            return Err(ClipError::DegenerateEdge(pa, pb));
        }
        let id = self.edges.insert(Edge::new(a, b));
        self.edge_index.insert(edge_key(a, b), id);
        Ok(id)
    }

    /// Register a polygon bounded by `edges`, which must form a closed loop.
    pub fn polygon(&mut self, edges: Vec<EdgeId>) -> Result<PolygonId, ClipError> {
        let n = edges.len();
        if n < 3 {
            return Err(ClipError::TooFewEdges(n));
        }
        for i in 0..n {
            let (a, b) = (edges[i], edges[(i + 1) % n]);
            let corner = self.shared_vertex(a, b)?;
            if self.are_parallel(a, b) {
                return Err(ClipError::CollinearEdges(self.position(corner)));
            }
        }
        Ok(self.polygons.insert(Polygon::new(edges)))
    }

    /// Direction of `edge` from `end1` to `end2`.
    pub fn edge_vector(&self, edge: EdgeId) -> Vector3<Real> {
        let e = &self.edges[edge];
        self.position(e.end2) - self.position(e.end1)
    }

    pub fn edge_length(&self, edge: EdgeId) -> Real {
        self.edge_vector(edge).norm()
    }

    /// The vertex `a` and `b` have in common.
    pub fn shared_vertex(&self, a: EdgeId, b: EdgeId) -> Result<VertexId, ClipError> {
        let (ea, eb) = (&self.edges[a], &self.edges[b]);
        if eb.has_end(ea.end1) {
            Ok(ea.end1)
        } else if eb.has_end(ea.end2) {
            Ok(ea.end2)
        } else {
            Err(ClipError::DisjointEdges)
        }
    }
}
