use crate::errors::ClipError;
use crate::float_types::Real;
use crate::mesh::{EdgeId, Mesh, PolygonId, Split};
use crate::plane::Plane;
use crate::polygon::Orientation;
use nalgebra::{Point3, Vector3};

/// One bounding face of a convex polyhedron.
///
/// `plane` is the face's outward supporting plane. It is fixed when the face
/// is created and handed down unchanged to the pieces the face is split into.
/// Separator faces created by splitting a polyhedron have `is_splitter` set
/// and are not drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub polygon: PolygonId,
    pub orientation: Orientation,
    pub is_splitter: bool,
    pub plane: Plane,
}

impl Face {
    /// Face on `polygon` whose outward plane is `plane`.
    pub fn new(mesh: &Mesh, polygon: PolygonId, plane: Plane, is_splitter: bool) -> Self {
        Face {
            polygon,
            orientation: mesh.polygon_orientation(polygon, &plane.normal),
            is_splitter,
            plane,
        }
    }

    /// Face on `polygon` facing the way `orientation` winds.
    pub fn from_polygon(
        mesh: &Mesh,
        polygon: PolygonId,
        orientation: Orientation,
        is_splitter: bool,
    ) -> Result<Self, ClipError> {
        Ok(Face {
            polygon,
            orientation,
            is_splitter,
            plane: mesh.polygon_plane(polygon, orientation)?,
        })
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.plane.normal
    }

    /// Split this face by `plane`.
    ///
    /// A face lying in the plane is placed behind it when both face the same
    /// way and in front otherwise. Pieces keep this face's outward direction.
    pub fn split(&self, mesh: &mut Mesh, plane: &Plane) -> Result<Split<Face, EdgeId>, ClipError> {
        let part = mesh.split_polygon(self.polygon, plane)?;
        if part.is_coplanar() {
            return Ok(if self.plane.normal.dot(&plane.normal) > 0.0 {
                Split::new(None, Some(*self), None)
            } else {
                Split::new(Some(*self), None, None)
            });
        }

        let mesh = &*mesh;
        let wrap = |polygon: PolygonId| {
            if polygon == self.polygon {
                *self
            } else {
                Face::new(mesh, polygon, self.plane, self.is_splitter)
            }
        };
        Ok(Split::new(part.front.map(&wrap), part.back.map(&wrap), part.splitter))
    }

    /// Fan triangles covering the face, wound counter-clockwise seen from outside.
    pub fn triangles(&self, mesh: &Mesh) -> Result<Vec<[Point3<Real>; 3]>, ClipError> {
        mesh.triangulate(self.polygon, &self.plane.normal)
    }
}
