#[cfg(all(feature = "f64", feature = "f32"))]
compile_error!("features `f64` and `f32` are mutually exclusive");

#[cfg(not(any(feature = "f64", feature = "f32")))]
compile_error!("one of the features `f64` or `f32` must be enabled");

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// Distance under which two points, or a point and a plane, coincide.
#[cfg(feature = "f32")]
pub const EPSILON: Real = 1e-4;
#[cfg(feature = "f64")]
pub const EPSILON: Real = 1e-7;

/// Coefficients smaller than this are dropped from plane evaluations.
#[cfg(feature = "f32")]
pub const NUMERIC_ZERO: Real = 1e-7;
#[cfg(feature = "f64")]
pub const NUMERIC_ZERO: Real = 1e-12;

/// Largest sine of the angle between two edges still treated as parallel.
#[cfg(feature = "f32")]
pub const PARALLEL_EPSILON: Real = 1e-5;
#[cfg(feature = "f64")]
pub const PARALLEL_EPSILON: Real = 1e-9;

/// Vertices closer than this to a cutting plane are treated as lying in it.
///
/// Decided per vertex, so every edge and polygon sharing a vertex agrees on
/// its side. A cut only happens between vertices farther than this from the
/// plane, which keeps both pieces longer than `MIN_EDGE_LENGTH`.
#[cfg(feature = "f32")]
pub const SNAP_DISTANCE: Real = 5e-4;
#[cfg(feature = "f64")]
pub const SNAP_DISTANCE: Real = 1e-4;

/// Shortest edge the mesh will create.
pub const MIN_EDGE_LENGTH: Real = 5e-5;

/// Splitter edges closer than this to collinear with a neighbour are logged.
pub const COLLINEAR_WARNING: Real = 0.03;

// Pi
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Tau
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;
