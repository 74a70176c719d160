pub mod ode;
pub mod polyline_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Linear interpolation between two samples of a path-parallel array.
///
/// Implemented for planar points and for scalar profiles (e.g. elevation),
/// so the same clipping code can cut every array that runs parallel to a
/// reference line.
pub trait Lerp: Copy {
    /// Returns `self + t * (other - self)`.
    #[must_use]
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for Point2 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

/// Rotates a local `(u, v)` vector by `heading` radians counter-clockwise.
#[must_use]
pub fn rotate(local: Vector2, heading: f64) -> Vector2 {
    let (sin, cos) = heading.sin_cos();
    Vector2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
}
