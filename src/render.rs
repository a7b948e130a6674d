use crate::errors::ClipError;
use crate::float_types::Real;
use crate::float_types::parry3d::shape::TriMesh;
use nalgebra::Point3;

/// Receiver for the triangles a polyhedron draws itself as.
///
/// Triangles arrive wound counter-clockwise seen from outside the solid.
pub trait TriangleSink<S> {
    fn triangle(&mut self, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>, metadata: Option<&S>);
}

/// A sink that keeps every triangle it is given.
#[derive(Debug, Clone)]
pub struct TriangleSoup<S> {
    pub triangles: Vec<([Point3<Real>; 3], Option<S>)>,
}

impl<S> Default for TriangleSoup<S> {
    fn default() -> Self {
        TriangleSoup {
            triangles: Vec::new(),
        }
    }
}

impl<S: Clone> TriangleSink<S> for TriangleSoup<S> {
    fn triangle(&mut self, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>, metadata: Option<&S>) {
        self.triangles.push(([a, b, c], metadata.cloned()));
    }
}

impl<S> TriangleSoup<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn area(&self) -> Real {
        self.triangles
            .iter()
            .map(|([a, b, c], _)| (b - a).cross(&(c - a)).norm() / 2.0)
            .sum()
    }

    /// Convert the soup to a Parry `TriMesh`, three fresh vertices per triangle.
    pub fn to_trimesh(&self) -> Result<TriMesh, ClipError> {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 3);
        let mut indices = Vec::with_capacity(self.triangles.len());
        let mut index_offset = 0;

        for ([a, b, c], _) in &self.triangles {
            vertices.push(*a);
            vertices.push(*b);
            vertices.push(*c);

            indices.push([index_offset, index_offset + 1, index_offset + 2]);
            index_offset += 3;
        }

        TriMesh::new(vertices, indices).map_err(|e| ClipError::TriMesh(format!("{e:?}")))
    }
}
