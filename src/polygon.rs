use crate::errors::ClipError;
use crate::float_types::{COLLINEAR_WARNING, Real};
use crate::mesh::{EdgeId, Mesh, PolygonId, Split, VertexId};
use crate::plane::{Plane, Side};
use nalgebra::{Point3, Vector3};
use tracing::{debug, error, warn};

/// Which way round a polygon's edge loop is traversed.
///
/// `Forward` follows the stored edge order, `Reversed` the opposite order.
/// A face picks the traversal whose right-hand normal points outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    Reversed,
}

impl Orientation {
    pub const fn sign(self) -> Real {
        match self {
            Orientation::Forward => 1.0,
            Orientation::Reversed => -1.0,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }
}

/// Where a polygon was cut: the two sub-polygons and the edge between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonSplit {
    pub front: PolygonId,
    pub back: PolygonId,
    pub splitter: EdgeId,
}

/// A closed loop of edges, each sharing one vertex with the next.
///
/// The loop has no preferred direction; see [`Orientation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub edges: Vec<EdgeId>,
    pub split: Option<PolygonSplit>,
}

impl Polygon {
    pub const fn new(edges: Vec<EdgeId>) -> Self {
        Polygon { edges, split: None }
    }
}

impl Mesh {
    fn edge_in_plane(&self, edge: EdgeId, plane: &Plane) -> bool {
        let e = &self.edges[edge];
        self.vertex_side(e.end1, plane) == Side::On && self.vertex_side(e.end2, plane) == Side::On
    }

    /// Split `polygon` by `plane`.
    ///
    /// A polygon lying in the plane comes back as both front and back. The
    /// first real cut is remembered on the polygon; cutting it again works
    /// through the remembered pieces and recombines them.
    pub fn split_polygon(
        &mut self,
        polygon: PolygonId,
        plane: &Plane,
    ) -> Result<Split<PolygonId, EdgeId>, ClipError> {
        let edges = self.polygons[polygon].edges.clone();
        if edges.iter().all(|&e| self.edge_in_plane(e, plane)) {
            return Ok(Split::new(Some(polygon), Some(polygon), None));
        }
        match self.polygons[polygon].split {
            None => self.cut_polygon(polygon, &edges, plane),
            Some(split) => self.recut_polygon(polygon, split, plane),
        }
    }

    fn cut_polygon(
        &mut self,
        polygon: PolygonId,
        edges: &[EdgeId],
        plane: &Plane,
    ) -> Result<Split<PolygonId, EdgeId>, ClipError> {
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut in_plane = Vec::new();
        let mut splitters: Vec<VertexId> = Vec::new();

        for &edge in edges {
            let part = self.split_edge(edge, plane)?;
            if part.is_coplanar() {
                in_plane.extend(part.front);
            } else {
                front.extend(part.front);
                back.extend(part.back);
            }
            if let Some(v) = part.splitter {
                if !splitters.contains(&v) {
                    splitters.push(v);
                }
            }
        }

        if front.len() >= 2 && back.len() >= 2 && splitters.len() == 2 {
            let splitter = self.edge(splitters[0], splitters[1])?;
            let front = self.insert_edge(splitter, front)?;
            let back = self.insert_edge(splitter, back)?;
            if self.near_collinear(splitter, &front) || self.near_collinear(splitter, &back) {
                warn!(?polygon, ?splitter, "splitter edge is nearly collinear with a neighbour");
            }
            let front = self.polygon(front)?;
            let back = self.polygon(back)?;
            self.polygons[polygon].split = Some(PolygonSplit {
                front,
                back,
                splitter,
            });
            debug!(?polygon, ?front, ?back, "polygon cut");
            return Ok(Split::new(Some(front), Some(back), Some(splitter)));
        }

        // An edge lying in the plane is reported even when the rest of the
        // polygon is on one side: it may be part of the seam of a cut solid.
        let n = edges.len();
        if self.touches_plane(n, &front, &in_plane, &splitters) {
            Ok(Split::new(Some(polygon), None, Some(in_plane[0])))
        } else if self.touches_plane(n, &back, &in_plane, &splitters) {
            Ok(Split::new(None, Some(polygon), Some(in_plane[0])))
        } else if self.touches_plane(n, &front, &back, &splitters) {
            Ok(Split::new(Some(polygon), None, Some(back[0])))
        } else if self.touches_plane(n, &back, &front, &splitters) {
            Ok(Split::new(None, Some(polygon), Some(front[0])))
        } else if !front.is_empty() && back.is_empty() {
            Ok(Split::new(Some(polygon), None, None))
        } else if !back.is_empty() && front.is_empty() {
            Ok(Split::new(None, Some(polygon), None))
        } else {
            let detail = format!(
                "first cut left {} front, {} back and {} in-plane edges with {} splitter vertices",
                front.len(),
                back.len(),
                in_plane.len(),
                splitters.len()
            );
            error!(?polygon, ?plane, "{detail}");
            Err(ClipError::UnrecognizedPolygonSplit(detail))
        }
    }

    /// All edges but one lie on one side, and the odd one joins the two
    /// points where the polygon meets the plane.
    fn touches_plane(
        &self,
        n: usize,
        on_side: &[EdgeId],
        off_side: &[EdgeId],
        splitters: &[VertexId],
    ) -> bool {
        on_side.len() + 1 == n
            && off_side.len() == 1
            && splitters.len() == 2
            && self.edges[off_side[0]].has_end(splitters[0])
            && self.edges[off_side[0]].has_end(splitters[1])
    }

    fn recut_polygon(
        &mut self,
        polygon: PolygonId,
        split: PolygonSplit,
        plane: &Plane,
    ) -> Result<Split<PolygonId, EdgeId>, ClipError> {
        let PolygonSplit {
            front,
            back,
            splitter,
        } = split;

        if self.edge_in_plane(splitter, plane) {
            return Ok(if self.which_side(front, plane) == Side::Outside {
                Split::new(Some(front), Some(back), Some(splitter))
            } else {
                Split::new(Some(back), Some(front), Some(splitter))
            });
        }

        let f = self.split_polygon(front, plane)?;
        let b = self.split_polygon(back, plane)?;
        let all_front = |s: &Split<PolygonId, EdgeId>, id: PolygonId| s.front == Some(id) && s.back.is_none();
        let all_back = |s: &Split<PolygonId, EdgeId>, id: PolygonId| s.front.is_none() && s.back == Some(id);
        let cut = |s: &Split<PolygonId, EdgeId>| match (s.front, s.back, s.splitter) {
            (Some(a), Some(b), Some(e)) if a != b => Some((a, b, e)),
            _ => None,
        };

        if all_front(&f, front) && all_front(&b, back) {
            let edge = self.plane_edge(f.splitter, b.splitter)?;
            return Ok(Split::new(Some(polygon), None, edge));
        }
        if all_back(&f, front) && all_back(&b, back) {
            let edge = self.plane_edge(f.splitter, b.splitter)?;
            return Ok(Split::new(None, Some(polygon), edge));
        }

        match (cut(&f), cut(&b)) {
            (None, Some((bf, bb, bs))) if all_front(&f, front) && f.splitter.is_none() => {
                let joined = self.make_split_polygon(front, bf, splitter)?;
                Ok(Split::new(Some(joined), Some(bb), Some(bs)))
            },
            (None, Some((bf, bb, bs))) if all_back(&f, front) && f.splitter.is_none() => {
                let joined = self.make_split_polygon(bb, front, splitter)?;
                Ok(Split::new(Some(bf), Some(joined), Some(bs)))
            },
            (Some((ff, fb, fs)), None) if all_front(&b, back) && b.splitter.is_none() => {
                let joined = self.make_split_polygon(ff, back, splitter)?;
                Ok(Split::new(Some(joined), Some(fb), Some(fs)))
            },
            (Some((ff, fb, fs)), None) if all_back(&b, back) && b.splitter.is_none() => {
                let joined = self.make_split_polygon(fb, back, splitter)?;
                Ok(Split::new(Some(ff), Some(joined), Some(fs)))
            },
            (Some((ff, fb, fs)), Some((bf, bb, bs))) => {
                let shared = self.shared_edge(ff, bf)?;
                let joined_front = self.make_split_polygon(ff, bf, shared)?;
                let shared = self.shared_edge(fb, bb)?;
                let joined_back = self.make_split_polygon(fb, bb, shared)?;
                let edge = self
                    .common_parent(fs, bs)?
                    .ok_or(ClipError::UnmatchedPlaneEdges)?;
                Ok(Split::new(Some(joined_front), Some(joined_back), Some(edge)))
            },
            _ => {
                let detail = format!(
                    "pieces split as ({:?}, {:?}, {:?}) and ({:?}, {:?}, {:?})",
                    f.front, f.back, f.splitter, b.front, b.back, b.splitter
                );
                error!(?polygon, ?plane, "{detail}");
                Err(ClipError::UnrecognizedPolygonSplit(detail))
            },
        }
    }

    /// The edge two recombined pieces share with the plane.
    fn plane_edge(
        &mut self,
        front: Option<EdgeId>,
        back: Option<EdgeId>,
    ) -> Result<Option<EdgeId>, ClipError> {
        match (front, back) {
            (None, other) | (other, None) => Ok(other),
            (Some(f), Some(b)) => match self.common_parent(f, b)? {
                Some(parent) => Ok(Some(parent)),
                None => Err(ClipError::UnmatchedPlaneEdges),
            },
        }
    }

    /// Splice `edge` into the loop between the two edges touching its ends.
    fn insert_edge(&self, edge: EdgeId, mut list: Vec<EdgeId>) -> Result<Vec<EdgeId>, ClipError> {
        let e = self.edges[edge];
        let n = list.len();
        for i in 0..n {
            let (here, next) = (&self.edges[list[i]], &self.edges[list[(i + 1) % n]]);
            if (here.has_end(e.end1) && next.has_end(e.end2))
                || (here.has_end(e.end2) && next.has_end(e.end1))
            {
                list.insert(i + 1, edge);
                return Ok(list);
            }
        }
        Err(ClipError::NoInsertionPoint(n))
    }

    fn near_collinear(&self, edge: EdgeId, loop_edges: &[EdgeId]) -> bool {
        let Some(pos) = loop_edges.iter().position(|&e| e == edge) else {
            return false;
        };
        let n = loop_edges.len();
        let previous = loop_edges[(pos + n - 1) % n];
        let next = loop_edges[(pos + 1) % n];
        self.parallelism(previous, edge) < COLLINEAR_WARNING
            || self.parallelism(edge, next) < COLLINEAR_WARNING
    }

    /// First edge of `a` that also bounds `b`.
    pub fn shared_edge(&self, a: PolygonId, b: PolygonId) -> Result<EdgeId, ClipError> {
        let other = &self.polygons[b].edges;
        self.polygons[a]
            .edges
            .iter()
            .copied()
            .find(|e| other.contains(e))
            .ok_or(ClipError::NoSharedEdge)
    }

    /// Side of `plane` holding the corners of `polygon` that are clear of it.
    pub fn which_side(&self, polygon: PolygonId, plane: &Plane) -> Side {
        self.polygons[polygon]
            .edges
            .iter()
            .flat_map(|&e| [self.edges[e].end1, self.edges[e].end2])
            .map(|v| self.vertex_side(v, plane))
            .find(|&side| side != Side::On)
            .unwrap_or(Side::On)
    }

    /// Rebuild the polygon that `front` and `back` were cut from along `splitter`.
    pub fn make_split_polygon(
        &mut self,
        front: PolygonId,
        back: PolygonId,
        splitter: EdgeId,
    ) -> Result<PolygonId, ClipError> {
        let front_edges = self.polygons[front].edges.clone();
        let mut back_edges = self.polygons[back].edges.clone();
        let agree = self
            .polygon_normal(front, Orientation::Forward)
            .dot(&self.polygon_normal(back, Orientation::Forward));
        if agree < 0.0 {
            back_edges.reverse();
        }

        let fi = front_edges
            .iter()
            .position(|&e| e == splitter)
            .ok_or(ClipError::EdgeNotInPolygon)?;
        let bi = back_edges
            .iter()
            .position(|&e| e == splitter)
            .ok_or(ClipError::EdgeNotInPolygon)?;

        let chain: Vec<EdgeId> = front_edges[..fi]
            .iter()
            .chain(&back_edges[bi + 1..])
            .chain(&back_edges[..bi])
            .chain(&front_edges[fi + 1..])
            .copied()
            .collect();

        let mut edges = Vec::with_capacity(chain.len());
        for edge in chain {
            edges = self.hoist_into(edge, edges)?;
        }
        let edges = self.check_end_parents(edges)?;

        let joined = self.polygon(edges)?;
        self.polygons[joined].split = Some(PolygonSplit {
            front,
            back,
            splitter,
        });
        Ok(joined)
    }

    /// Unnormalized normal of `polygon` by the right-hand rule for the given traversal.
    pub fn polygon_normal(&self, polygon: PolygonId, orientation: Orientation) -> Vector3<Real> {
        let edges = &self.polygons[polygon].edges;
        let normal = self
            .vector_to(edges[0], edges[1])
            .cross(&self.vector_to(edges[1], edges[2]));
        normal * orientation.sign()
    }

    /// The traversal whose normal points the same way as `reference`.
    pub fn polygon_orientation(&self, polygon: PolygonId, reference: &Vector3<Real>) -> Orientation {
        if self.polygon_normal(polygon, Orientation::Forward).dot(reference) > 0.0 {
            Orientation::Forward
        } else {
            Orientation::Reversed
        }
    }

    /// Supporting plane of `polygon`, facing along the traversal's normal.
    pub fn polygon_plane(
        &self,
        polygon: PolygonId,
        orientation: Orientation,
    ) -> Result<Plane, ClipError> {
        let normal = self.polygon_normal(polygon, orientation);
        let anchor = self.position(self.edges[self.polygons[polygon].edges[0]].end1);
        Plane::from_normal(normal, normal.dot(&anchor.coords))
    }

    /// Corners of `polygon` in traversal order.
    ///
    /// Both traversals start from the same corner, so fans built from them
    /// use the same diagonals.
    pub fn polygon_vertices(
        &self,
        polygon: PolygonId,
        orientation: Orientation,
    ) -> Result<Vec<VertexId>, ClipError> {
        let edges = &self.polygons[polygon].edges;
        let n = edges.len();
        let mut corners = Vec::with_capacity(n);
        for i in 0..n {
            corners.push(self.shared_vertex(edges[i], edges[(i + 1) % n])?);
        }
        if orientation == Orientation::Reversed {
            corners[1..].reverse();
        }
        Ok(corners)
    }

    /// The unsplit polygons `polygon` has been refined into (itself if never cut).
    pub fn polygon_leaves(&self, polygon: PolygonId) -> Vec<PolygonId> {
        let mut leaves = Vec::new();
        let mut stack = vec![polygon];
        while let Some(p) = stack.pop() {
            match self.polygons[p].split {
                Some(split) => {
                    stack.push(split.back);
                    stack.push(split.front);
                },
                None => leaves.push(p),
            }
        }
        leaves
    }

    /// Fan triangles covering `polygon`, wound counter-clockwise about `normal`.
    pub fn triangulate(
        &self,
        polygon: PolygonId,
        normal: &Vector3<Real>,
    ) -> Result<Vec<[Point3<Real>; 3]>, ClipError> {
        let mut triangles = Vec::new();
        for leaf in self.polygon_leaves(polygon) {
            let orientation = self.polygon_orientation(leaf, normal);
            let corners = self.polygon_vertices(leaf, orientation)?;
            let anchor = self.position(corners[0]);
            for pair in corners[1..].windows(2) {
                triangles.push([anchor, self.position(pair[0]), self.position(pair[1])]);
            }
        }
        Ok(triangles)
    }
}
