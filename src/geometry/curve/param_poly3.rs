use crate::error::{GeometryError, Result};
use crate::math::Point2;

use super::{check_length, CubicPolynomial, Curve, Pose};

/// Range of the parameter `p` of a [`ParametricCubicPolynomial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamRange {
    /// `p` runs over `[0, 1]`.
    #[default]
    Normalized,
    /// `p` runs over `[0, length]`.
    ArcLength,
}

/// A planar curve given by two independent cubics `u(p)` and `v(p)`.
///
/// No arc-length solve is needed: both coordinates are explicit functions
/// of the parameter. There is no `v(u)` form.
#[derive(Debug, Clone)]
pub struct ParametricCubicPolynomial {
    pose: Pose,
    length: f64,
    u: CubicPolynomial,
    v: CubicPolynomial,
    p_range: ParamRange,
}

impl ParametricCubicPolynomial {
    /// Creates a new parametric cubic from `[aU, bU, cU, dU]` and `[aV, bV, cV, dV]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is negative or not finite.
    pub fn new(
        pose: Pose,
        length: f64,
        u_coefficients: [f64; 4],
        v_coefficients: [f64; 4],
        p_range: ParamRange,
    ) -> Result<Self> {
        let [au, bu, cu, du] = u_coefficients;
        let [av, bv, cv, dv] = v_coefficients;
        Ok(Self {
            pose,
            length: check_length(length)?,
            u: CubicPolynomial::new(au, bu, cu, du),
            v: CubicPolynomial::new(av, bv, cv, dv),
            p_range,
        })
    }

    /// Returns the parameter range convention.
    #[must_use]
    pub fn p_range(&self) -> ParamRange {
        self.p_range
    }

    /// Returns the local point `(u(p), v(p))`.
    #[must_use]
    pub fn evaluate_at_fraction(&self, p: f64) -> Point2 {
        Point2::new(self.u.v(p), self.v.v(p))
    }
}

impl Curve for ParametricCubicPolynomial {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn length(&self) -> Option<f64> {
        Some(self.length)
    }

    fn parameter_range(&self) -> Result<f64> {
        Ok(match self.p_range {
            ParamRange::Normalized => 1.0,
            ParamRange::ArcLength => self.length,
        })
    }

    fn local_points(&self, params: &[f64]) -> Result<Vec<Point2>> {
        Ok(params.iter().map(|&p| self.evaluate_at_fraction(p)).collect())
    }

    fn offset_at(&self, _u: f64) -> Result<f64> {
        Err(GeometryError::ParametricOnly.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Geometry;

    #[test]
    fn normalized_and_arc_length_agree_on_end_points() {
        // Straight line of length 10 in both conventions.
        let normalized = ParametricCubicPolynomial::new(
            Pose::default(),
            10.0,
            [0.0, 10.0, 0.0, 0.0],
            [0.0; 4],
            ParamRange::Normalized,
        )
        .unwrap();
        let arc_length = ParametricCubicPolynomial::new(
            Pose::default(),
            10.0,
            [0.0, 1.0, 0.0, 0.0],
            [0.0; 4],
            ParamRange::ArcLength,
        )
        .unwrap();
        let a = Geometry::ParametricCubicPolynomial(normalized).evaluate(1.0).unwrap();
        let b = Geometry::ParametricCubicPolynomial(arc_length).evaluate(1.0).unwrap();
        assert_eq!(a.len(), 11);
        assert_eq!(b.len(), 11);
        assert!((a[10] - b[10]).norm() < 1e-12);
        assert!((a[10].x - 10.0).abs() < 1e-12);
    }

    #[test]
    fn direct_offset_evaluation_fails() {
        let curve =
            ParametricCubicPolynomial::new(Pose::default(), 1.0, [0.0; 4], [0.0; 4], ParamRange::Normalized)
                .unwrap();
        assert!(matches!(
            curve.offset_at(0.5),
            Err(crate::error::OdrError::Geometry(GeometryError::ParametricOnly))
        ));
    }

    #[test]
    fn evaluates_both_polynomials() {
        let curve = ParametricCubicPolynomial::new(
            Pose::default(),
            1.0,
            [1.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 3.0, 0.0],
            ParamRange::Normalized,
        )
        .unwrap();
        let p = curve.evaluate_at_fraction(0.5);
        assert!((p.x - 2.0).abs() < 1e-12);
        assert!((p.y - 0.75).abs() < 1e-12);
    }
}
