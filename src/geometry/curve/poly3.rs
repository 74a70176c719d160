use nalgebra::Vector1;

use crate::error::{GeometryError, Result};
use crate::math::ode::{solve_ivp, DEFAULT_MAX_STEP};
use crate::math::Point2;

use super::{check_length, Curve, Pose};

/// An explicit cubic `v(u) = a + b u + c u² + d u³` in a local frame.
///
/// The same type serves as a plan-view segment (with a pose and a declared
/// arc length) and as an offset function for lane widths, lane borders,
/// lane offsets and elevation (identity pose, no length).
///
/// The declared length of a plan-view segment is an arc length while the
/// natural parameter is `u`; sampling therefore converts arc length to `u`
/// by solving `du/ds = (1 + (dv/du)²)^(-1/2)` with `u(0) = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicPolynomial {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    pose: Pose,
    length: Option<f64>,
}

impl CubicPolynomial {
    /// Creates an offset polynomial with an identity pose and no length.
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            a,
            b,
            c,
            d,
            pose: Pose::default(),
            length: None,
        }
    }

    /// Creates a plan-view polynomial placed at `pose` with arc length `length`.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is negative or not finite.
    pub fn with_frame(coefficients: [f64; 4], pose: Pose, length: f64) -> Result<Self> {
        let [a, b, c, d] = coefficients;
        Ok(Self {
            a,
            b,
            c,
            d,
            pose,
            length: Some(check_length(length)?),
        })
    }

    /// Returns `[a, b, c, d]`.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Evaluates `v(u)`.
    #[must_use]
    pub fn v(&self, u: f64) -> f64 {
        self.a + u * (self.b + u * (self.c + u * self.d))
    }

    /// Evaluates `dv/du`.
    #[must_use]
    pub fn derivative(&self, u: f64) -> f64 {
        self.b + u * (2.0 * self.c + 3.0 * self.d * u)
    }

    /// Returns the local point `(u, v(u))`.
    #[must_use]
    pub fn value_at(&self, u: f64) -> Point2 {
        Point2::new(u, self.v(u))
    }

    /// Converts arc lengths along the curve into local `u` coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc lengths are not sorted ascending from
    /// exactly zero, or the solved trajectory cannot be evaluated at every
    /// requested arc length.
    pub fn u_from_arc_lengths(&self, arc_lengths: &[f64]) -> Result<Vec<f64>> {
        let solution = solve_ivp(
            |_, u: &Vector1<f64>| {
                let slope = self.derivative(u.x);
                Vector1::new((1.0 + slope * slope).powf(-0.5))
            },
            Vector1::zeros(),
            arc_lengths,
            DEFAULT_MAX_STEP,
        )?;
        if solution.len() != arc_lengths.len() {
            return Err(GeometryError::SolveFailed(format!(
                "expected {} samples, solved {}",
                arc_lengths.len(),
                solution.len()
            ))
            .into());
        }
        Ok(solution.iter().map(|u| u.x).collect())
    }

    /// Evaluates local points at fractions `p` in `[0, 1]` of the declared length.
    ///
    /// # Errors
    ///
    /// Returns an error if no length was declared or the arc-length solve fails.
    pub fn value_at_fraction(&self, fractions: &[f64]) -> Result<Vec<Point2>> {
        let length = self.parameter_range()?;
        let arc_lengths: Vec<f64> = fractions.iter().map(|p| p * length).collect();
        self.local_points(&arc_lengths)
    }
}

impl Curve for CubicPolynomial {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn length(&self) -> Option<f64> {
        self.length
    }

    fn parameter_range(&self) -> Result<f64> {
        self.length.ok_or_else(|| {
            GeometryError::Degenerate("cubic polynomial has no declared length".into()).into()
        })
    }

    fn local_points(&self, params: &[f64]) -> Result<Vec<Point2>> {
        Ok(self
            .u_from_arc_lengths(params)?
            .into_iter()
            .map(|u| self.value_at(u))
            .collect())
    }

    fn offset_at(&self, u: f64) -> Result<f64> {
        Ok(self.v(u))
    }
}
