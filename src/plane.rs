use crate::errors::ClipError;
use crate::float_types::{EPSILON, NUMERIC_ZERO, Real};
use nalgebra::{Point3, Vector3};

/// Which side of a plane a point lies on.
///
/// `Outside` is the side the normal points towards ("front"), `Inside` the
/// opposite side ("back").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    On,
    Inside,
    Outside,
}

/// Where a segment crosses a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentHit {
    /// At the segment's first point.
    Start,
    /// At the segment's second point.
    End,
    /// Strictly between the two points.
    Interior(Point3<Real>),
}

/// An oriented plane `normal · p = w` with a unit normal.
///
/// The normal points away from the solid the plane bounds, so points on the
/// normal's side are outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    /// Build the plane `a·x + b·y + c·z = d`, normalizing the coefficients.
    pub fn new(a: Real, b: Real, c: Real, d: Real) -> Result<Self, ClipError> {
        Self::from_normal(Vector3::new(a, b, c), d)
    }

    /// Build the plane `normal · p = w`; both sides are rescaled so the normal has unit length.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Result<Self, ClipError> {
        let len = normal.norm();
        if len < NUMERIC_ZERO {
            return Err(ClipError::ZeroNormal);
        }
        Ok(Plane {
            normal: normal / len,
            w: w / len,
        })
    }

    /// Plane through three points, facing the side from which they wind counter-clockwise.
    pub fn from_points(
        a: &Point3<Real>,
        b: &Point3<Real>,
        c: &Point3<Real>,
    ) -> Result<Self, ClipError> {
        let normal = (b - a).cross(&(c - a));
        let len = normal.norm();
        if len < NUMERIC_ZERO {
            return Err(ClipError::ZeroNormal);
        }
        let normal = normal / len;
        Ok(Plane {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance of `point` from the plane, positive outside.
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        let mut sum = -self.w;
        for i in 0..3 {
            let coefficient = self.normal[i];
            if coefficient.abs() > NUMERIC_ZERO {
                sum += coefficient * point[i];
            }
        }
        sum
    }

    pub fn classify(&self, point: &Point3<Real>) -> Side {
        self.classify_within(point, EPSILON)
    }

    /// Like [`Plane::classify`], with points up to `tolerance` away counted as on the plane.
    pub fn classify_within(&self, point: &Point3<Real>, tolerance: Real) -> Side {
        let distance = self.signed_distance(point);
        if distance > tolerance {
            Side::Outside
        } else if distance < -tolerance {
            Side::Inside
        } else {
            Side::On
        }
    }

    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        self.classify(point) == Side::On
    }

    pub fn contains_segment(&self, a: &Point3<Real>, b: &Point3<Real>) -> bool {
        self.contains_point(a) && self.contains_point(b)
    }

    /// Intersect the segment `p1`–`p2` with the plane.
    ///
    /// Returns `None` when the segment is parallel to the plane or the crossing
    /// lies outside the segment. A crossing within tolerance of either end is
    /// reported as that end so callers can reuse the existing vertex.
    pub fn intersect_segment(&self, p1: &Point3<Real>, p2: &Point3<Real>) -> Option<SegmentHit> {
        let direction = p2 - p1;
        let denominator = self.normal.dot(&direction);
        if denominator.abs() < EPSILON {
            return None;
        }
        let t = -self.signed_distance(p1) / denominator;
        if t.abs() < EPSILON {
            Some(SegmentHit::Start)
        } else if (t - 1.0).abs() < EPSILON {
            Some(SegmentHit::End)
        } else if t > 0.0 && t < 1.0 {
            Some(SegmentHit::Interior(p1 + direction * t))
        } else {
            None
        }
    }
}
