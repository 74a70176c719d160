use crate::error::Result;
use crate::math::{Point2, TOLERANCE};

use super::{check_length, Curve, Pose};

/// A circular arc of constant curvature.
///
/// Positive curvature turns left (counter-clockwise). The local form is
/// `P(s) = (sin(k s) / k, (1 - cos(k s)) / k)`, which degenerates to a
/// straight line for `k = 0`.
#[derive(Debug, Clone)]
pub struct Arc {
    pose: Pose,
    length: f64,
    curvature: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is negative or not finite.
    pub fn new(pose: Pose, length: f64, curvature: f64) -> Result<Self> {
        Ok(Self {
            pose,
            length: check_length(length)?,
            curvature,
        })
    }

    /// Returns the signed curvature (1 / radius).
    #[must_use]
    pub fn curvature(&self) -> f64 {
        self.curvature
    }
}

impl Curve for Arc {
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
        let k = self.curvature;
        if k.abs() < TOLERANCE {
            return Ok(params.iter().map(|&s| Point2::new(s, 0.0)).collect());
        }
        Ok(params
            .iter()
            .map(|&s| {
                let (sin, cos) = (k * s).sin_cos();
                Point2::new(sin / k, (1.0 - cos) / k)
            })
            .collect())
    }
}
