use crate::bsp::{Node, NodeId, Tree};
use crate::errors::ClipError;
use crate::face::Face;
use crate::float_types::Real;
use crate::float_types::parry3d::{
    bounding_volume::{Aabb, BoundingVolume},
    shape::{Shape, SharedShape},
};
use crate::mesh::{EdgeId, Mesh, PolygonId, Split, VertexId};
use crate::plane::{Plane, Side};
use crate::polygon::Orientation;
use crate::render::{TriangleSink, TriangleSoup};
use hashbrown::HashMap;
use nalgebra::{Point3, Quaternion, Unit};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pieces produced by [`Polyhedron::split`], gathered over every leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitParts {
    pub front: Vec<NodeId>,
    pub back: Vec<NodeId>,
    pub separators: Vec<PolygonId>,
}

/// A solid made of convex pieces arranged in a split tree.
///
/// A freshly built polyhedron is a single convex leaf. Clipping cuts leaves
/// along the clipper's face planes and drops the pieces inside the clipper,
/// so over time the tree holds every piece that survived. All pieces share
/// one [`Mesh`], so a vertex or edge cut for one piece is cut for its
/// neighbours too.
#[derive(Debug, Clone)]
pub struct Polyhedron<S: Clone> {
    mesh: Mesh,
    tree: Tree,

    /// Metadata handed to the renderer with every triangle
    pub metadata: Option<S>,
}

impl<S: Clone> Polyhedron<S> {
    /// Build a convex polyhedron from corner points and faces.
    ///
    /// Each face lists indices into `points` counter-clockwise as seen from
    /// outside the solid. Faces that share a pair of consecutive points share
    /// the edge between them.
    ///
    /// ```
    /// # use druse::polyhedron::Polyhedron;
    /// let pts = &[
    ///     [1.0, 1.0, 1.0],
    ///     [1.0, -1.0, -1.0],
    ///     [-1.0, 1.0, -1.0],
    ///     [-1.0, -1.0, 1.0],
    /// ];
    /// let faces = vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]];
    ///
    /// let tetra: Polyhedron<()> = Polyhedron::from_faces(pts, &faces, None).unwrap();
    /// assert!(tetra.contains(&nalgebra::Point3::origin()));
    /// ```
    pub fn from_faces(
        points: &[[Real; 3]],
        faces: &[Vec<usize>],
        metadata: Option<S>,
    ) -> Result<Self, ClipError> {
        let mut mesh = Mesh::new();
        let corners: Vec<VertexId> = points
            .iter()
            .map(|&[x, y, z]| mesh.vertex(Point3::new(x, y, z)))
            .collect();

        let mut built = Vec::with_capacity(faces.len());
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(ClipError::DegenerateFace(i));
            }
            if let Some(&index) = face.iter().find(|&&index| index >= points.len()) {
                return Err(ClipError::FaceIndexOutOfRange {
                    index,
                    len: points.len(),
                });
            }

            let mut edges = Vec::with_capacity(face.len());
            for k in 0..face.len() {
                let next = face[(k + 1) % face.len()];
                edges.push(mesh.edge(corners[face[k]], corners[next])?);
            }
            let polygon = mesh.polygon(edges)?;
            built.push(Face::from_polygon(&mesh, polygon, Orientation::Forward, false)?);
        }

        Ok(Polyhedron {
            mesh,
            tree: Tree::new(built),
            metadata,
        })
    }

    pub const fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    /// Non-empty convex pieces.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.tree.leaves()
    }

    /// Faces of a leaf (none for other nodes).
    pub fn faces(&self, node: NodeId) -> &[Face] {
        self.tree.node(node).map_or(&[], Node::faces)
    }

    pub fn face_count(&self, node: NodeId) -> usize {
        self.faces(node).len()
    }

    /// True when nothing of the solid is left.
    pub fn is_empty(&self) -> bool {
        self.tree.is_clipped_away()
    }

    /// True when `point` is inside or on the boundary of the solid.
    pub fn contains(&self, point: &Point3<Real>) -> bool {
        self.node_contains(self.tree.root(), point)
    }

    /// True when `point` is inside or on the boundary of the piece at `node`.
    pub fn node_contains(&self, node: NodeId, point: &Point3<Real>) -> bool {
        match self.tree.node(node) {
            Some(Node::Leaf { faces }) => {
                faces.len() >= 4 && faces.iter().all(|f| f.plane.classify(point) != Side::Outside)
            },
            Some(Node::Split { front, back, .. }) => {
                self.node_contains(*front, point) || self.node_contains(*back, point)
            },
            Some(Node::Empty) | None => false,
        }
    }

    /// Split every convex piece by `plane`.
    ///
    /// Pieces wholly on one side are reported as they are. Pieces the plane
    /// cuts become split nodes with two new leaves, each closed by a face on
    /// the shared separator polygon.
    #[instrument(skip_all, fields(normal = ?plane.normal, w = plane.w))]
    pub fn split(&mut self, plane: &Plane) -> Result<SplitParts, ClipError> {
        let mut parts = SplitParts::default();
        for leaf in self.tree.leaves() {
            let part = self.split_leaf(leaf, plane)?;
            parts.front.extend(part.front);
            parts.back.extend(part.back);
            parts.separators.extend(part.splitter);
        }
        Ok(parts)
    }

    fn split_leaf(
        &mut self,
        node: NodeId,
        plane: &Plane,
    ) -> Result<Split<NodeId, PolygonId>, ClipError> {
        let faces = self.faces(node).to_vec();
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut seam: Vec<EdgeId> = Vec::new();

        for face in &faces {
            let part = face.split(&mut self.mesh, plane)?;
            front.extend(part.front);
            back.extend(part.back);
            if let Some(edge) = part.splitter {
                if !seam.contains(&edge) {
                    seam.push(edge);
                }
            }
        }

        // A piece merely touching the plane can leave a single face on the far side.
        if front.len() <= 1 {
            return Ok(Split::new(None, Some(node), None));
        }
        if back.len() <= 1 {
            return Ok(Split::new(Some(node), None, None));
        }

        let seam = stitch_seam(&mut self.mesh, &seam)?;
        let separator = self.mesh.polygon(seam)?;
        front.push(Face::new(&self.mesh, separator, plane.flipped(), true));
        back.push(Face::new(&self.mesh, separator, *plane, true));

        let front_node = self.tree.insert(Node::Leaf { faces: front });
        let back_node = self.tree.insert(Node::Leaf { faces: back });
        self.tree.replace(
            node,
            Node::Split {
                front: front_node,
                back: back_node,
                separator,
            },
        );
        debug!(?node, ?front_node, ?back_node, "piece split");
        Ok(Split::new(Some(front_node), Some(back_node), Some(separator)))
    }

    /// Remove from this solid everything inside `other`.
    ///
    /// `other` may itself be a tree of convex pieces; the space it occupies is
    /// the union of those pieces, so each is clipped away in turn.
    #[instrument(skip_all, fields(clippers = other.leaves().len()))]
    pub fn clip_to<T: Clone>(&mut self, other: &Polyhedron<T>) -> Result<(), ClipError> {
        for leaf in other.leaves() {
            let planes: Vec<Plane> = other.faces(leaf).iter().map(|f| f.plane).collect();
            let bounds = other.leaf_bounds(leaf);
            self.clip_within(&planes, Some(&bounds))?;
        }
        Ok(())
    }

    /// Remove from this solid everything inside the convex region bounded by `planes`.
    ///
    /// Each plane's normal points out of the region.
    #[instrument(skip_all, fields(planes = planes.len()))]
    pub fn clip_to_planes(&mut self, planes: &[Plane]) -> Result<(), ClipError> {
        self.clip_within(planes, None)
    }

    fn clip_within(&mut self, planes: &[Plane], bounds: Option<&Aabb>) -> Result<(), ClipError> {
        let mut work = self.tree.leaves();
        if let Some(bounds) = bounds {
            work.retain(|&leaf| self.leaf_bounds(leaf).intersects(bounds));
        }

        for plane in planes {
            if work.is_empty() {
                break;
            }
            let mut inside = Vec::with_capacity(work.len());
            for node in work {
                // the front part is outside the clipper and stays as it is
                inside.extend(self.split_leaf(node, plane)?.back);
            }
            work = inside;
        }

        debug!(removed = work.len(), "pieces inside clipper");
        for node in work {
            self.tree.make_empty(node);
        }
        self.simplify();
        Ok(())
    }

    /// Prune pieces that were clipped away.
    pub fn simplify(&mut self) {
        self.tree.simplify();
    }

    /// Draw every face of every piece, except the separators between pieces.
    pub fn draw<R: TriangleSink<S>>(&self, renderer: &mut R) -> Result<(), ClipError> {
        for leaf in self.leaves() {
            for face in self.faces(leaf).iter().filter(|f| !f.is_splitter) {
                for [a, b, c] in face.triangles(&self.mesh)? {
                    renderer.triangle(a, b, c, self.metadata.as_ref());
                }
            }
        }
        Ok(())
    }

    /// Every face of every piece, separators included, so each piece is closed.
    fn closed_triangles(&self) -> Result<Vec<[Point3<Real>; 3]>, ClipError> {
        let mut triangles = Vec::new();
        for leaf in self.leaves() {
            for face in self.faces(leaf) {
                triangles.extend(face.triangles(&self.mesh)?);
            }
        }
        Ok(triangles)
    }

    /// Enclosed volume, summed over the convex pieces.
    #[cfg(not(feature = "parallel"))]
    pub fn volume(&self) -> Result<Real, ClipError> {
        Ok(self.closed_triangles()?.iter().map(signed_volume).sum())
    }

    /// Enclosed volume, summed over the convex pieces in parallel.
    #[cfg(feature = "parallel")]
    pub fn volume(&self) -> Result<Real, ClipError> {
        Ok(self.closed_triangles()?.par_iter().map(signed_volume).sum())
    }

    fn leaf_bounds(&self, node: NodeId) -> Aabb {
        let points: Vec<Point3<Real>> = self
            .faces(node)
            .iter()
            .flat_map(|f| self.mesh.polygon_ref(f.polygon).edges.iter())
            .flat_map(|&e| {
                let edge = self.mesh.edge_ref(e);
                [self.mesh.position(edge.end1), self.mesh.position(edge.end2)]
            })
            .collect();
        bounds_of(&points)
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] enclosing every piece.
    pub fn bounding_box(&self) -> Aabb {
        let leaves = self.leaves();
        let mut boxes = leaves.iter().map(|&leaf| self.leaf_bounds(leaf));
        match boxes.next() {
            Some(first) => boxes.fold(first, |acc, b| acc.merged(&b)),
            None => Aabb::new(Point3::origin(), Point3::origin()),
        }
    }

    /// Convert the pieces to a Parry `TriMesh`.\
    /// Useful for collision detection or physics simulations.
    pub fn to_trimesh(&self) -> Result<SharedShape, ClipError> {
        let mut soup = TriangleSoup::<S>::new();
        for [a, b, c] in self.closed_triangles()? {
            soup.triangle(a, b, c, None);
        }
        let trimesh = soup.to_trimesh()?;
        Ok(SharedShape::new(trimesh))
    }

    /// Approximate mass properties using Parry.
    pub fn mass_properties(
        &self,
        density: Real,
    ) -> Result<(Real, Point3<Real>, Unit<Quaternion<Real>>), ClipError> {
        let shape = self.to_trimesh()?;
        let mp = Shape::mass_properties(&*shape, density);
        Ok((
            mp.mass(),
            mp.local_com,                     // a Point3<Real>
            mp.principal_inertia_local_frame, // a Unit<Quaternion<Real>>
        ))
    }
}

/// Signed volume of the tetrahedron spanned by the origin and a triangle.
fn signed_volume([a, b, c]: &[Point3<Real>; 3]) -> Real {
    a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
}

fn bounds_of(points: &[Point3<Real>]) -> Aabb {
    let Some(first) = points.first() else {
        return Aabb::new(Point3::origin(), Point3::origin());
    };
    let (mins, maxs) = points.iter().fold((*first, *first), |(lo, hi), p| {
        (lo.inf(p), hi.sup(p))
    });
    Aabb::new(mins, maxs)
}

/// Chain the edges where a piece meets a cutting plane into one closed loop.
fn stitch_seam(mesh: &mut Mesh, edges: &[EdgeId]) -> Result<Vec<EdgeId>, ClipError> {
    if edges.len() < 3 {
        return Err(ClipError::OpenSeam(edges.len()));
    }

    let mut incident: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
    for &e in edges {
        let edge = mesh.edge_ref(e);
        incident.entry(edge.end1).or_default().push(e);
        incident.entry(edge.end2).or_default().push(e);
    }

    let first = edges[0];
    let start = mesh.edge_ref(first).end1;
    let mut at = mesh.edge_ref(first).end2;
    let mut current = first;
    let mut used = 1;
    let mut chain = vec![first];

    while at != start {
        if used == edges.len() {
            return Err(ClipError::OpenSeam(edges.len()));
        }
        let next = incident
            .get(&at)
            .and_then(|list| list.iter().copied().find(|&e| e != current))
            .ok_or(ClipError::OpenSeam(edges.len() - used))?;
        chain = mesh.hoist_into(next, chain)?;
        at = mesh.edge_ref(next).opposite(at);
        current = next;
        used += 1;
    }

    if used != edges.len() {
        return Err(ClipError::OpenSeam(edges.len() - used));
    }
    mesh.check_end_parents(chain)
}
