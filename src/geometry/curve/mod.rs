mod arc;
mod line;
mod param_poly3;
mod poly3;
mod spiral;

use std::fmt;

pub use arc::Arc;
pub use line::Line;
pub use param_poly3::{ParamRange, ParametricCubicPolynomial};
pub use poly3::CubicPolynomial;
pub use spiral::Spiral;

use crate::error::{GeometryError, Result};
use crate::math::{rotate, Point2, Vector2, TOLERANCE};

/// Global pose of a geometry at the start of its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Global x coordinate of the local origin.
    pub x: f64,
    /// Global y coordinate of the local origin.
    pub y: f64,
    /// Heading of the local u axis, in radians counter-clockwise from global x.
    pub heading: f64,
}

impl Pose {
    /// Creates a new pose.
    #[must_use]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Maps a local `(u, v)` point into global coordinates.
    #[must_use]
    pub fn to_global(&self, local: &Point2) -> Point2 {
        let rotated = rotate(Vector2::new(local.x, local.y), self.heading);
        Point2::new(self.x + rotated.x, self.y + rotated.y)
    }
}

/// Trait for the parametric curve families that make up a road plan view.
///
/// Curves are evaluated in their own local frame (origin at the start,
/// initial heading along +u) and mapped to global coordinates through
/// their [`Pose`].
pub trait Curve {
    /// Returns the pose of the local frame.
    fn pose(&self) -> &Pose;

    /// Returns the declared arc length, if any.
    fn length(&self) -> Option<f64>;

    /// Returns the upper bound of the sampling parameter, starting at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the range depends on a length that was not declared.
    fn parameter_range(&self) -> Result<f64>;

    /// Evaluates local `(u, v)` coordinates at each sampling parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters cannot be evaluated.
    fn local_points(&self, params: &[f64]) -> Result<Vec<Point2>>;

    /// Evaluates the explicit lateral value `v(u)` at local coordinate `u`.
    ///
    /// # Errors
    ///
    /// Returns an error for curves that have no explicit `v(u)` form.
    fn offset_at(&self, _u: f64) -> Result<f64> {
        Err(GeometryError::ParametricOnly.into())
    }
}

/// Discriminant of a [`Geometry`], used for logging and attribute export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Line,
    Arc,
    Spiral,
    CubicPolynomial,
    ParametricCubicPolynomial,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Arc => "arc",
            Self::Spiral => "spiral",
            Self::CubicPolynomial => "poly3",
            Self::ParametricCubicPolynomial => "paramPoly3",
        };
        f.write_str(name)
    }
}

/// One plan-view or profile segment.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// A straight segment.
    Line(Line),
    /// A constant-curvature segment.
    Arc(Arc),
    /// A segment whose curvature changes linearly with arc length.
    Spiral(Spiral),
    /// An explicit cubic `v(u)`.
    CubicPolynomial(CubicPolynomial),
    /// A pair of cubics `u(p)`, `v(p)`.
    ParametricCubicPolynomial(ParametricCubicPolynomial),
}

impl Geometry {
    fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(c) => c,
            Self::Arc(c) => c,
            Self::Spiral(c) => c,
            Self::CubicPolynomial(c) => c,
            Self::ParametricCubicPolynomial(c) => c,
        }
    }

    /// Returns the variant of this geometry.
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Line(_) => GeometryKind::Line,
            Self::Arc(_) => GeometryKind::Arc,
            Self::Spiral(_) => GeometryKind::Spiral,
            Self::CubicPolynomial(_) => GeometryKind::CubicPolynomial,
            Self::ParametricCubicPolynomial(_) => GeometryKind::ParametricCubicPolynomial,
        }
    }

    /// Returns the global pose at the start of the segment.
    #[must_use]
    pub fn pose(&self) -> &Pose {
        self.as_curve().pose()
    }

    /// Returns the declared arc length, if any.
    #[must_use]
    pub fn length(&self) -> Option<f64> {
        self.as_curve().length()
    }

    /// Evaluates the explicit lateral value `v(u)`.
    ///
    /// # Errors
    ///
    /// Returns an error for variants without an explicit `v(u)`.
    pub fn offset_at(&self, u: f64) -> Result<f64> {
        self.as_curve().offset_at(u)
    }

    /// Samples the whole segment in global coordinates.
    ///
    /// The number of samples is `ceil(length / resolution) + 1` (at least 2),
    /// spread evenly over the sampling parameter range.
    ///
    /// # Errors
    ///
    /// Returns an error if `resolution` is not positive or evaluation fails.
    pub fn evaluate(&self, resolution: f64) -> Result<Vec<Point2>> {
        if resolution < TOLERANCE || !resolution.is_finite() {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "resolution",
                value: resolution,
                min: TOLERANCE,
                max: f64::INFINITY,
            }
            .into());
        }
        let curve = self.as_curve();
        let range = curve.parameter_range()?;
        let sampled_length = curve.length().unwrap_or(range);
        let params = linspace(range, sample_count(sampled_length, resolution));
        let pose = curve.pose();
        Ok(curve
            .local_points(&params)?
            .iter()
            .map(|p| pose.to_global(p))
            .collect())
    }
}

/// Number of samples needed to cover `length` at `resolution`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_count(length: f64, resolution: f64) -> usize {
    ((length.abs() / resolution).ceil() as usize + 1).max(2)
}

/// `count` evenly spaced values from `0.0` to `upper` inclusive.
#[allow(clippy::cast_precision_loss)]
fn linspace(upper: f64, count: usize) -> Vec<f64> {
    let last = (count - 1) as f64;
    (0..count).map(|i| upper * i as f64 / last).collect()
}

fn check_length(length: f64) -> Result<f64> {
    if length < 0.0 || !length.is_finite() {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "length",
            value: length,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into());
    }
    Ok(length)
}
