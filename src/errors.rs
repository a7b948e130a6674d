use crate::float_types::Real;
use nalgebra::Point3;
use thiserror::Error;

/// Everything that can go wrong while building, splitting or clipping a polyhedron.
///
/// Any variant other than [`ClipError::FaceIndexOutOfRange`] and
/// [`ClipError::DegenerateFace`] means the boundary structure reached a state
/// the split rules do not cover. The operation that returned it is aborted;
/// the polyhedron stays memory-safe but its tree may be partially split.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    #[error("plane normal has zero length")]
    ZeroNormal,

    #[error("edge from {0} to {1} is degenerate")]
    DegenerateEdge(Point3<Real>, Point3<Real>),

    #[error("polygon needs at least three edges, got {0}")]
    TooFewEdges(usize),

    #[error("consecutive polygon edges are parallel at {0}")]
    CollinearEdges(Point3<Real>),

    #[error("straddling edge from {0} to {1} has no intersection with the plane")]
    MissingIntersection(Point3<Real>, Point3<Real>),

    #[error("split edge from {0} to {1} produced an unrecognized arrangement")]
    UnrecognizedEdgeSplit(Point3<Real>, Point3<Real>),

    #[error("polygon split produced an unrecognized arrangement: {0}")]
    UnrecognizedPolygonSplit(String),

    #[error("no place to insert splitter edge into a loop of {0} edges")]
    NoInsertionPoint(usize),

    #[error("polygons being recombined share no edge")]
    NoSharedEdge,

    #[error("in-plane edges of recombined polygons have no common parent")]
    UnmatchedPlaneEdges,

    #[error("splitter edge is not part of the polygon being recombined")]
    EdgeNotInPolygon,

    #[error("adjacent polygon edges share no vertex")]
    DisjointEdges,

    #[error("separator seam does not close ({0} loose edges)")]
    OpenSeam(usize),

    #[error("face index {index} is out of range (points.len = {len})")]
    FaceIndexOutOfRange { index: usize, len: usize },

    #[error("face {0} has fewer than three vertices")]
    DegenerateFace(usize),

    #[error("triangle mesh rejected: {0}")]
    TriMesh(String),
}
