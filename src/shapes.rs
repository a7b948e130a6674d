use crate::errors::ClipError;
use crate::float_types::{PI, Real};
use crate::polyhedron::Polyhedron;
use nalgebra::{Point3, Rotation3, Vector3};

impl<S: Clone> Polyhedron<S> {
    /// Axis-aligned box spanning `min` to `max`, as used for the substrate a
    /// crystal cluster grows on.
    ///
    /// ```
    /// # use druse::polyhedron::Polyhedron;
    /// # use nalgebra::Point3;
    /// let slab: Polyhedron<()> =
    ///     Polyhedron::cuboid(Point3::new(-2.0, -1.0, -2.0), Point3::new(2.0, 0.0, 2.0), None).unwrap();
    /// assert!(slab.contains(&Point3::new(0.0, -0.5, 0.0)));
    /// ```
    pub fn cuboid(
        min: Point3<Real>,
        max: Point3<Real>,
        metadata: Option<S>,
    ) -> Result<Polyhedron<S>, ClipError> {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let points = [
            [x0, y0, z0],
            [x1, y0, z0],
            [x1, y1, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x1, y1, z1],
            [x0, y1, z1],
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // z = min
            vec![4, 5, 6, 7], // z = max
            vec![0, 1, 5, 4], // y = min
            vec![3, 7, 6, 2], // y = max
            vec![0, 4, 7, 3], // x = min
            vec![1, 2, 6, 5], // x = max
        ];
        Polyhedron::from_faces(&points, &faces, metadata)
    }

    /// An amethyst crystal: a hexagonal prism capped by a hexagonal pyramid at
    /// each end.
    ///
    /// `size` is half the prism's length. The hexagon's circumradius is
    /// `0.9 * size` and each pyramid rises `1.1` times that radius beyond the
    /// prism. The crystal's c-axis starts along +y, is tilted away from +y by
    /// `polar` radians, swung about +y by `azimuth` radians, and the whole
    /// crystal is centred on `center`.
    pub fn amethyst(
        center: Point3<Real>,
        polar: Real,
        azimuth: Real,
        size: Real,
        metadata: Option<S>,
    ) -> Result<Polyhedron<S>, ClipError> {
        let radius = 0.9 * size;
        let apex = size + 1.1 * radius;

        let mut canonical = Vec::with_capacity(14);
        canonical.push(Point3::new(0.0, apex, 0.0));
        for y in [size, -size] {
            for k in 0..6 {
                let angle = k as Real * PI / 3.0;
                canonical.push(Point3::new(radius * angle.cos(), y, radius * angle.sin()));
            }
        }
        canonical.push(Point3::new(0.0, -apex, 0.0));

        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), -azimuth)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), -polar);
        let points: Vec<[Real; 3]> = canonical
            .iter()
            .map(|p| {
                let q = rotation * p + center.coords;
                [q.x, q.y, q.z]
            })
            .collect();

        // 0 is the top apex, 1..=6 the top ring, 7..=12 the bottom ring, 13 the bottom apex
        let mut faces = Vec::with_capacity(18);
        for k in 0..6 {
            let next = (k + 1) % 6;
            let (top, top_next) = (1 + k, 1 + next);
            let (bottom, bottom_next) = (7 + k, 7 + next);
            faces.push(vec![0, top_next, top]);
            faces.push(vec![top, top_next, bottom_next, bottom]);
            faces.push(vec![13, bottom, bottom_next]);
        }
        Polyhedron::from_faces(&points, &faces, metadata)
    }
}
