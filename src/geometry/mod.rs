pub mod composite;
pub mod curve;

pub use composite::CompositeCurve;
pub use curve::{
    Arc, CubicPolynomial, Curve, Geometry, GeometryKind, Line, ParamRange,
    ParametricCubicPolynomial, Pose, Spiral,
};

use crate::math::Vector2;

/// Lateral side relative to the direction of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Positive `t`, counter-clockwise from the tangent.
    Left,
    /// Negative `t`, clockwise from the tangent.
    Right,
}

impl Side {
    /// Returns the unit normal on this side of a unit `tangent`.
    #[must_use]
    pub fn normal(self, tangent: &Vector2) -> Vector2 {
        match self {
            Self::Left => Vector2::new(-tangent.y, tangent.x),
            Self::Right => Vector2::new(tangent.y, -tangent.x),
        }
    }
}
