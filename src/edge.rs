use crate::errors::ClipError;
use crate::float_types::{PARALLEL_EPSILON, Real, SNAP_DISTANCE};
use crate::mesh::{EdgeId, Mesh, Split, VertexId};
use crate::plane::{Plane, SegmentHit, Side};
use nalgebra::Vector3;
use tracing::{debug, error};

/// Where an edge was cut: its two pieces and the vertex between them.
///
/// `front` and `back` name the sides of the first plane that cut the edge (or
/// the order the pieces were joined in); later planes may face either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSplit {
    pub front: EdgeId,
    pub back: EdgeId,
    pub vertex: VertexId,
}

/// A segment between two vertices, optionally refined into two sub-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub end1: VertexId,
    pub end2: VertexId,
    pub split: Option<EdgeSplit>,
}

impl Edge {
    pub const fn new(end1: VertexId, end2: VertexId) -> Self {
        Edge {
            end1,
            end2,
            split: None,
        }
    }

    pub fn has_end(&self, v: VertexId) -> bool {
        self.end1 == v || self.end2 == v
    }

    /// The end that is not `v`.
    pub fn opposite(&self, v: VertexId) -> VertexId {
        if v == self.end1 { self.end2 } else { self.end1 }
    }
}

/// An unchanged edge reported on one side of a plane.
fn whole(edge: EdgeId, side: Side, touch: Option<VertexId>) -> Split<EdgeId, VertexId> {
    match side {
        Side::Outside => Split::new(Some(edge), None, touch),
        Side::Inside => Split::new(None, Some(edge), touch),
        Side::On => Split::new(Some(edge), Some(edge), None),
    }
}

impl Mesh {
    /// Vector along `edge` pointing towards the vertex it shares with `next`.
    pub fn vector_to(&self, edge: EdgeId, next: EdgeId) -> Vector3<Real> {
        let e = self.edges[edge];
        if self.edges[next].has_end(e.end2) {
            self.position(e.end2) - self.position(e.end1)
        } else {
            self.position(e.end1) - self.position(e.end2)
        }
    }

    /// Sine of the angle between two edges.
    pub fn parallelism(&self, a: EdgeId, b: EdgeId) -> Real {
        let (va, vb) = (self.edge_vector(a), self.edge_vector(b));
        va.cross(&vb).norm() / (va.norm() * vb.norm())
    }

    pub fn are_parallel(&self, a: EdgeId, b: EdgeId) -> bool {
        self.parallelism(a, b) <= PARALLEL_EPSILON
    }

    /// Side of `plane` the vertex `v` lies on, counting anything within
    /// `SNAP_DISTANCE` as on the plane.
    pub fn vertex_side(&self, v: VertexId, plane: &Plane) -> Side {
        plane.classify_within(&self.position(v), SNAP_DISTANCE)
    }

    /// True when `v` is an end of `edge` or of any piece it was split into.
    pub fn edge_contains_vertex(&self, edge: EdgeId, v: VertexId) -> bool {
        let e = &self.edges[edge];
        if e.has_end(v) {
            return true;
        }
        match e.split {
            Some(split) => {
                self.edge_contains_vertex(split.front, v) || self.edge_contains_vertex(split.back, v)
            },
            None => false,
        }
    }

    /// Split `edge` by `plane`.
    ///
    /// The first cut of an edge is remembered, so every face sharing the edge
    /// sees the same pieces and the same intersection vertex. Cutting an
    /// already split edge recurses into its pieces and, when a piece is cut
    /// again, joins the untouched sibling onto the adjacent part.
    ///
    /// An end within `SNAP_DISTANCE` of the plane counts as lying in it, so
    /// the edge is only cut when both ends are clear of the plane.
    pub fn split_edge(
        &mut self,
        edge: EdgeId,
        plane: &Plane,
    ) -> Result<Split<EdgeId, VertexId>, ClipError> {
        let e = self.edges[edge];
        let side1 = self.vertex_side(e.end1, plane);
        let side2 = self.vertex_side(e.end2, plane);

        match (side1, side2) {
            (Side::On, Side::On) => Ok(whole(edge, Side::On, None)),
            (Side::On, other) => Ok(whole(edge, other, Some(e.end1))),
            (other, Side::On) => Ok(whole(edge, other, Some(e.end2))),
            (a, b) if a == b => Ok(whole(edge, a, None)),
            _ => match e.split {
                None => self.cut_edge(edge, plane, side1),
                Some(split) => self.recut_edge(edge, split, plane),
            },
        }
    }

    fn cut_edge(
        &mut self,
        edge: EdgeId,
        plane: &Plane,
        side1: Side,
    ) -> Result<Split<EdgeId, VertexId>, ClipError> {
        let e = self.edges[edge];
        let (p1, p2) = (self.position(e.end1), self.position(e.end2));
        let at = match plane.intersect_segment(&p1, &p2) {
            Some(SegmentHit::Start) => p1,
            Some(SegmentHit::End) => p2,
            Some(SegmentHit::Interior(p)) => p,
            None => return Err(ClipError::MissingIntersection(p1, p2)),
        };

        let vertex = self.vertex(at);
        let sub1 = self.edge(e.end1, vertex)?;
        let sub2 = self.edge(e.end2, vertex)?;
        let (front, back) = if side1 == Side::Outside { (sub1, sub2) } else { (sub2, sub1) };
        self.edges[edge].split = Some(EdgeSplit {
            front,
            back,
            vertex,
        });
        debug!(?edge, ?vertex, "edge cut");
        Ok(Split::new(Some(front), Some(back), Some(vertex)))
    }

    fn recut_edge(
        &mut self,
        edge: EdgeId,
        split: EdgeSplit,
        plane: &Plane,
    ) -> Result<Split<EdgeId, VertexId>, ClipError> {
        let mid = split.vertex;

        // Both ends are clear of the plane, so a piece can only touch it at `mid`.
        let part = self.split_edge(split.front, plane)?;
        match (part.front, part.back, part.splitter) {
            (Some(ff), Some(fb), Some(s)) => {
                return if self.edges[ff].has_end(mid) {
                    let joined = self.make_split_edge(split.back, ff, mid)?;
                    Ok(Split::new(Some(joined), Some(fb), Some(s)))
                } else {
                    let joined = self.make_split_edge(fb, split.back, mid)?;
                    Ok(Split::new(Some(ff), Some(joined), Some(s)))
                };
            },
            (Some(_), None, Some(s)) if s == mid => {
                return Ok(Split::new(Some(split.front), Some(split.back), Some(mid)));
            },
            (None, Some(_), Some(s)) if s == mid => {
                return Ok(Split::new(Some(split.back), Some(split.front), Some(mid)));
            },
            _ => {},
        }

        let part = self.split_edge(split.back, plane)?;
        match (part.front, part.back, part.splitter) {
            (Some(bf), Some(bb), Some(s)) => {
                if self.edges[bf].has_end(mid) {
                    let joined = self.make_split_edge(split.front, bf, mid)?;
                    Ok(Split::new(Some(joined), Some(bb), Some(s)))
                } else {
                    let joined = self.make_split_edge(bb, split.front, mid)?;
                    Ok(Split::new(Some(bf), Some(joined), Some(s)))
                }
            },
            _ => {
                let e = self.edges[edge];
                let (p1, p2) = (self.position(e.end1), self.position(e.end2));
                error!(?edge, ?plane, "split edge meets plane in an unrecognized way");
                Err(ClipError::UnrecognizedEdgeSplit(p1, p2))
            },
        }
    }

    /// An edge made of two collinear pieces meeting at `vertex`.
    ///
    /// Reuses the registered edge between the pieces' far ends when there is
    /// one, recording the split on it if it has none yet.
    pub fn make_split_edge(
        &mut self,
        front: EdgeId,
        back: EdgeId,
        vertex: VertexId,
    ) -> Result<EdgeId, ClipError> {
        let front_end = self.edges[front].opposite(vertex);
        let back_end = self.edges[back].opposite(vertex);
        let joined = self.edge(front_end, back_end)?;
        let e = &mut self.edges[joined];
        if e.split.is_none() {
            e.split = Some(EdgeSplit {
                front,
                back,
                vertex,
            });
        }
        Ok(joined)
    }

    /// The single edge equal to the union of `a` and `b`, if they are
    /// collinear and meet end to end.
    ///
    /// Pieces count as collinear when their shared vertex lies within
    /// `SNAP_DISTANCE` of the segment between their far ends, the same
    /// tolerance that let a cut pass through that vertex.
    pub fn common_parent(&mut self, a: EdgeId, b: EdgeId) -> Result<Option<EdgeId>, ClipError> {
        if a == b {
            return Ok(None);
        }
        let (ea, eb) = (self.edges[a], self.edges[b]);
        let shared = if eb.has_end(ea.end1) {
            ea.end1
        } else if eb.has_end(ea.end2) {
            ea.end2
        } else {
            return Ok(None);
        };

        let origin = self.position(shared);
        let far_a = self.position(ea.opposite(shared)) - origin;
        let far_b = self.position(eb.opposite(shared)) - origin;
        if far_a.dot(&far_b) >= 0.0 {
            // overlapping, not end to end
            return Ok(None);
        }
        if far_a.cross(&far_b).norm() > SNAP_DISTANCE * (far_a - far_b).norm() {
            return Ok(None);
        }

        if let Some(existing) = self.find_edge(ea.opposite(shared), eb.opposite(shared)) {
            return Ok(Some(existing));
        }
        self.extend_with(a, b).map(Some)
    }

    /// Join `edge` and the collinear `extension` at their shared vertex.
    pub fn extend_with(&mut self, edge: EdgeId, extension: EdgeId) -> Result<EdgeId, ClipError> {
        let shared = self.shared_vertex(edge, extension)?;
        self.make_split_edge(edge, extension, shared)
    }

    /// Append `edge` to `list`, first merging it with the list's tail for as
    /// long as the two have a common parent.
    pub fn hoist_into(
        &mut self,
        mut edge: EdgeId,
        mut list: Vec<EdgeId>,
    ) -> Result<Vec<EdgeId>, ClipError> {
        while let Some(&last) = list.last() {
            match self.common_parent(edge, last)? {
                Some(parent) => {
                    list.pop();
                    edge = parent;
                },
                None => break,
            }
        }
        list.push(edge);
        Ok(list)
    }

    /// Merge pieces that a closed loop splits across its start and end.
    pub fn check_end_parents(&mut self, mut edges: Vec<EdgeId>) -> Result<Vec<EdgeId>, ClipError> {
        while edges.len() > 1 {
            let last = edges[edges.len() - 1];
            match self.common_parent(edges[0], last)? {
                Some(parent) => {
                    edges[0] = parent;
                    edges.pop();
                },
                None => break,
            }
        }
        while edges.len() > 1 {
            match self.common_parent(edges[0], edges[1])? {
                Some(parent) => {
                    edges[1] = parent;
                    edges.remove(0);
                },
                None => break,
            }
        }
        Ok(edges)
    }
}
