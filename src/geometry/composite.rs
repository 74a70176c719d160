use crate::error::{GeometryError, Result};
use crate::math::polyline_2d::{cumulative_distances, repair_zero_rows};
use crate::math::{Point2, Vector2};

use super::{Geometry, Side};

/// An ordered sequence of geometries treated as one continuous curve.
///
/// Each member starts at a declared distance along the owning reference
/// line. The same type represents a road plan view, a lane width or border
/// function, a lane offset function and an elevation profile.
#[derive(Debug, Clone, Default)]
pub struct CompositeCurve {
    members: Vec<Geometry>,
    starts: Vec<f64>,
}

impl CompositeCurve {
    /// Creates a composite curve, ordering members by their start distance.
    ///
    /// Members with equal starts keep their input order.
    ///
    /// # Errors
    ///
    /// Returns an error if `members` and `starts` differ in length.
    pub fn new(members: Vec<Geometry>, starts: Vec<f64>) -> Result<Self> {
        if members.len() != starts.len() {
            return Err(GeometryError::LengthMismatch {
                expected: members.len(),
                actual: starts.len(),
            }
            .into());
        }
        let mut pairs: Vec<(f64, Geometry)> = starts.into_iter().zip(members).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (starts, members) = pairs.into_iter().unzip();
        Ok(Self { members, starts })
    }

    /// Returns the members in start order.
    #[must_use]
    pub fn members(&self) -> &[Geometry] {
        &self.members
    }

    /// Returns the start distance of every member.
    #[must_use]
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    /// Returns `true` if the curve has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Evaluates every member at `resolution` and concatenates the samples.
    ///
    /// # Errors
    ///
    /// Returns an error if any member fails to evaluate.
    pub fn evaluate(&self, resolution: f64) -> Result<Vec<Point2>> {
        let mut points = Vec::new();
        for member in &self.members {
            points.extend(member.evaluate(resolution)?);
        }
        Ok(points)
    }

    /// Evaluates the explicit lateral value at each distance.
    ///
    /// A distance is handled by the last member starting at or before it
    /// (the first member for distances before the first start), evaluated
    /// at the distance relative to that member's start. An empty curve is
    /// zero everywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected member has no explicit `v(u)`.
    pub fn values_at(&self, distances: &[f64]) -> Result<Vec<f64>> {
        if self.members.is_empty() {
            return Ok(vec![0.0; distances.len()]);
        }
        distances
            .iter()
            .map(|&d| {
                let index = self.starts.partition_point(|&s| s <= d).saturating_sub(1);
                self.members[index].offset_at(d - self.starts[index])
            })
            .collect()
    }

    /// Projects this curve, read as a lateral offset function of `s`, into a global path.
    ///
    /// * `reference` - path along which `s` is measured (cumulative chord length)
    /// * `base` - path whose local tangent defines the lateral direction
    /// * `edge` - path the offset is applied to
    /// * `direction` - side on which positive offsets lie
    /// * `s_start`, `s_end` - only samples with `s` in this range are returned;
    ///   `s_end = None` is open ended
    ///
    /// All three paths must be sampled in parallel (same number of points).
    ///
    /// # Errors
    ///
    /// Returns an error if the paths differ in length, have fewer than two
    /// points, `base` has no non-degenerate segment, or a member has no
    /// explicit `v(u)`.
    pub fn project_offset(
        &self,
        reference: &[Point2],
        base: &[Point2],
        edge: &[Point2],
        direction: Side,
        s_start: f64,
        s_end: Option<f64>,
    ) -> Result<Vec<Point2>> {
        let n = reference.len();
        for path in [base, edge] {
            if path.len() != n {
                return Err(GeometryError::LengthMismatch {
                    expected: n,
                    actual: path.len(),
                }
                .into());
            }
        }
        if n < 2 {
            return Err(GeometryError::Degenerate("offset path needs at least two points".into()).into());
        }

        let distances = cumulative_distances(reference);
        let segments: Vec<Vector2> = base.windows(2).map(|w| w[1] - w[0]).collect();
        let mut tangents = repair_zero_rows(&segments)?;
        tangents.push(tangents[tangents.len() - 1]);
        let offsets = self.values_at(&distances)?;

        let upper = s_end.unwrap_or(f64::INFINITY);
        Ok(distances
            .iter()
            .enumerate()
            .filter(|(_, &s)| s >= s_start && s <= upper)
            .map(|(i, _)| {
                let normal = direction.normal(&tangents[i].normalize());
                edge[i] + normal * offsets[i]
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{CubicPolynomial, Line, Pose};
    use approx::assert_relative_eq;

    fn poly(a: f64, b: f64) -> Geometry {
        Geometry::CubicPolynomial(CubicPolynomial::new(a, b, 0.0, 0.0))
    }

    fn straight(n: usize) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn members_are_sorted_by_start() {
        let curve = CompositeCurve::new(vec![poly(2.0, 0.0), poly(1.0, 0.0)], vec![5.0, 0.0]).unwrap();
        assert_eq!(curve.starts(), &[0.0, 5.0]);
        let v = curve.values_at(&[1.0, 6.0]).unwrap();
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn values_use_member_relative_distance() {
        let curve = CompositeCurve::new(vec![poly(0.0, 1.0), poly(10.0, 1.0)], vec![0.0, 4.0]).unwrap();
        let v = curve.values_at(&[0.0, 3.0, 4.0, 5.5]).unwrap();
        assert_eq!(v, vec![0.0, 3.0, 10.0, 11.5]);
    }

    #[test]
    fn empty_curve_is_zero() {
        let v = CompositeCurve::default().values_at(&[0.0, 1.0]).unwrap();
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn mismatched_starts_fail() {
        assert!(CompositeCurve::new(vec![poly(0.0, 0.0)], vec![]).is_err());
    }

    #[test]
    fn evaluate_concatenates_members() {
        let a = Geometry::Line(Line::new(Pose::default(), 2.0).unwrap());
        let b = Geometry::Line(Line::new(Pose::new(2.0, 0.0, 0.0), 2.0).unwrap());
        let curve = CompositeCurve::new(vec![a, b], vec![0.0, 2.0]).unwrap();
        let pts = curve.evaluate(1.0).unwrap();
        assert_eq!(pts.len(), 6);
        assert_relative_eq!(pts[5].x, 4.0);
    }

    #[test]
    fn left_and_right_offsets_mirror() {
        let line = straight(5);
        let width = CompositeCurve::new(vec![poly(2.0, 0.0)], vec![0.0]).unwrap();
        let left = width.project_offset(&line, &line, &line, Side::Left, 0.0, None).unwrap();
        let right = width.project_offset(&line, &line, &line, Side::Right, 0.0, None).unwrap();
        for (l, r) in left.iter().zip(&right) {
            assert_relative_eq!(l.y, 2.0);
            assert_relative_eq!(r.y, -2.0);
            assert_relative_eq!(l.x, r.x);
        }
    }

    #[test]
    fn offset_is_applied_to_edge_path() {
        let line = straight(3);
        let inner: Vec<Point2> = line.iter().map(|p| Point2::new(p.x, -3.0)).collect();
        let width = CompositeCurve::new(vec![poly(1.5, 0.0)], vec![0.0]).unwrap();
        let outer = width.project_offset(&line, &line, &inner, Side::Right, 0.0, None).unwrap();
        assert!(outer.iter().all(|p| (p.y + 4.5).abs() < 1e-12));
    }

    #[test]
    fn range_restriction_keeps_inner_samples() {
        let line = straight(11);
        let width = CompositeCurve::new(vec![poly(1.0, 0.0)], vec![0.0]).unwrap();
        let pts = width.project_offset(&line, &line, &line, Side::Left, 2.0, Some(5.0)).unwrap();
        assert_eq!(pts.len(), 4);
        assert_relative_eq!(pts[0].x, 2.0);
        assert_relative_eq!(pts[3].x, 5.0);
    }

    #[test]
    fn continuous_across_knots() {
        let line = straight(21);
        // Width ramps 0 -> 1 over [0, 10) then stays 1.
        let width = CompositeCurve::new(vec![poly(0.0, 0.1), poly(1.0, 0.0)], vec![0.0, 10.0]).unwrap();
        let pts = width.project_offset(&line, &line, &line, Side::Left, 0.0, None).unwrap();
        for w in pts.windows(2) {
            assert!((w[1].y - w[0].y).abs() <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn duplicate_vertices_do_not_break_normals() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let width = CompositeCurve::new(vec![poly(1.0, 0.0)], vec![0.0]).unwrap();
        let pts = width.project_offset(&line, &line, &line, Side::Left, 0.0, None).unwrap();
        assert!(pts.iter().all(|p| (p.y - 1.0).abs() < 1e-12));
    }
}
