use nalgebra::Vector2;

use crate::error::Result;
use crate::math::ode::{solve_ivp, DEFAULT_MAX_STEP};
use crate::math::{Point2, TOLERANCE};

use super::{check_length, Curve, Pose};

/// A transition curve whose curvature changes linearly with arc length.
///
/// Curvature goes from `curv_start` at `s = 0` to `curv_end` at
/// `s = length`. Positions are obtained by integrating the heading
/// `θ(s) = k0 s + (k1 - k0) s² / (2 L)`, which keeps heading and position
/// continuous with the neighbouring segments.
#[derive(Debug, Clone)]
pub struct Spiral {
    pose: Pose,
    length: f64,
    curv_start: f64,
    curv_end: f64,
}

impl Spiral {
    /// Creates a new spiral.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is negative or not finite.
    pub fn new(pose: Pose, length: f64, curv_start: f64, curv_end: f64) -> Result<Self> {
        Ok(Self {
            pose,
            length: check_length(length)?,
            curv_start,
            curv_end,
        })
    }

    /// Curvature at arc length `s`.
    #[must_use]
    pub fn curvature_at(&self, s: f64) -> f64 {
        if self.length < TOLERANCE {
            return self.curv_start;
        }
        self.curv_start + (self.curv_end - self.curv_start) * s / self.length
    }

    /// Local heading at arc length `s`, relative to the pose heading.
    #[must_use]
    pub fn heading_at(&self, s: f64) -> f64 {
        if self.length < TOLERANCE {
            return self.curv_start * s;
        }
        self.curv_start * s + (self.curv_end - self.curv_start) * s * s / (2.0 * self.length)
    }
}

impl Curve for Spiral {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn length(&self) -> Option<f64> {
        Some(self.length)
    }

    fn parameter_range(&self) -> Result<f64> {
        Ok(self.length)
    }

    fn local_points(&self, params: &[f64]) -> Result<Vec<Point2>> {
        let states = solve_ivp(
            |s, _| {
                let (sin, cos) = self.heading_at(s).sin_cos();
                Vector2::new(cos, sin)
            },
            Vector2::zeros(),
            params,
            DEFAULT_MAX_STEP,
        )?;
        Ok(states.iter().map(|p| Point2::new(p.x, p.y)).collect())
    }
}
