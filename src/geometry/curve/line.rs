use crate::error::Result;
use crate::math::Point2;

use super::{check_length, Curve, Pose};

/// A straight segment along the heading of its pose.
///
/// The local form is: `P(s) = (s, 0)` for `s` in `[0, length]`.
#[derive(Debug, Clone)]
pub struct Line {
    pose: Pose,
    length: f64,
}

impl Line {
    /// Creates a new line segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is negative or not finite.
    pub fn new(pose: Pose, length: f64) -> Result<Self> {
        Ok(Self {
            pose,
            length: check_length(length)?,
        })
    }
}

impl Curve for Line {
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
        Ok(params.iter().map(|&s| Point2::new(s, 0.0)).collect())
    }

    fn offset_at(&self, _u: f64) -> Result<f64> {
        Ok(0.0)
    }
}
