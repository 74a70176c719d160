use super::{Lerp, Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Distance within which a cut point reuses an existing path sample.
const CUT_TOLERANCE: f64 = 1e-8;

/// Returns the cumulative chord length at every vertex of `points`.
///
/// The first entry is always `0.0`; the result has the same length as the input.
#[must_use]
pub fn cumulative_distances(points: &[Point2]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += (*point - points[i - 1]).norm();
        }
        distances.push(total);
    }
    distances
}

/// Total chord length of a path.
#[must_use]
pub fn path_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Resamples a path at a fixed arc-length spacing.
///
/// Consecutive coincident vertices are removed first. Samples are placed at
/// `0, r, 2r, ...` along the path and the final vertex is always kept, so only
/// the last interval may be shorter than `resolution`. A path shorter than one
/// step collapses to its two end points.
///
/// # Errors
///
/// Returns an error if `resolution` is not positive or `points` is empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resample(points: &[Point2], resolution: f64) -> Result<Vec<Point2>> {
    if resolution <= 0.0 || !resolution.is_finite() {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "resolution",
            value: resolution,
            min: TOLERANCE,
            max: f64::INFINITY,
        }
        .into());
    }
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Err(GeometryError::Degenerate("cannot resample an empty path".into()).into());
    };

    let mut unique: Vec<Point2> = Vec::with_capacity(points.len());
    for &point in points {
        if unique
            .last()
            .is_none_or(|prev| (point - *prev).norm() > TOLERANCE)
        {
            unique.push(point);
        }
    }

    let distances = cumulative_distances(&unique);
    let total = distances.last().copied().unwrap_or(0.0);
    if total < resolution {
        return Ok(vec![first, last]);
    }

    let mut resampled = Vec::with_capacity((total / resolution).ceil() as usize + 2);
    let mut segment = 0;
    let mut step = 0_u32;
    loop {
        let target = f64::from(step) * resolution;
        if target >= total - CUT_TOLERANCE {
            break;
        }
        while segment + 2 < distances.len() && distances[segment + 1] < target {
            segment += 1;
        }
        resampled.push(interpolate_segment(&unique, &distances, segment, target));
        step += 1;
    }
    resampled.push(unique[unique.len() - 1]);

    Ok(resampled)
}

/// Linearly interpolates `values` at the exact distance `target`.
///
/// Targets outside the sampled range are clamped to the end values.
#[must_use]
pub fn interpolate_at<T: Lerp>(values: &[T], distances: &[f64], target: f64) -> T {
    if target <= distances[0] {
        return values[0];
    }
    let last = distances.len() - 1;
    if target >= distances[last] {
        return values[last];
    }
    let segment = distances.partition_point(|&d| d <= target).saturating_sub(1);
    interpolate_segment(values, distances, segment.min(last - 1), target)
}

fn interpolate_segment<T: Lerp>(values: &[T], distances: &[f64], segment: usize, target: f64) -> T {
    let span = distances[segment + 1] - distances[segment];
    if span < TOLERANCE {
        return values[segment];
    }
    let t = ((target - distances[segment]) / span).clamp(0.0, 1.0);
    values[segment].lerp(&values[segment + 1], t)
}

/// Clips a path-parallel array to the distance range `[start, end]`.
///
/// Cut points that do not fall on an existing sample are interpolated at
/// their exact distance instead of being snapped to the nearest sample.
///
/// # Errors
///
/// Returns an error if `values` and `distances` differ in length, or if the
/// clipped range holds fewer than two samples.
pub fn sub_polyline<T: Lerp>(values: &[T], distances: &[f64], start: f64, end: f64) -> Result<Vec<T>> {
    if values.len() != distances.len() {
        return Err(GeometryError::LengthMismatch {
            expected: distances.len(),
            actual: values.len(),
        }
        .into());
    }
    if values.is_empty() {
        return Err(GeometryError::Degenerate("cannot clip an empty path".into()).into());
    }

    let mut clipped = Vec::new();
    let reuse_start = distances
        .iter()
        .any(|&d| (d - start).abs() <= CUT_TOLERANCE);
    if !reuse_start {
        clipped.push(interpolate_at(values, distances, start));
    }
    clipped.extend(
        values
            .iter()
            .zip(distances)
            .filter(|(_, &d)| d >= start - CUT_TOLERANCE && d <= end + CUT_TOLERANCE)
            .map(|(&v, _)| v),
    );
    let reuse_end = distances.iter().any(|&d| (d - end).abs() <= CUT_TOLERANCE);
    if !reuse_end {
        clipped.push(interpolate_at(values, distances, end));
    }

    if clipped.len() < 2 {
        return Err(GeometryError::Degenerate(format!(
            "sub path [{start}, {end}] has less than two points"
        ))
        .into());
    }
    Ok(clipped)
}

/// Replaces all-zero rows with the nearest non-zero neighbouring row.
///
/// Interior rows are filled by alternating forward and backward sweeps until
/// no interior zero row remains; the first and last rows then copy their
/// neighbour.
///
/// # Errors
///
/// Returns an error if every row is zero.
pub fn repair_zero_rows(rows: &[Vector2]) -> Result<Vec<Vector2>> {
    let is_zero = |v: &Vector2| v.x == 0.0 && v.y == 0.0;
    let mut rows = rows.to_vec();
    let n = rows.len();
    let zero_count = rows.iter().filter(|v| is_zero(v)).count();
    if zero_count == 0 {
        return Ok(rows);
    }
    if zero_count == n {
        return Err(GeometryError::Degenerate("all direction rows are zero".into()).into());
    }

    let fill = |rows: &mut [Vector2], i: usize| {
        if is_zero(&rows[i]) {
            if !is_zero(&rows[i - 1]) {
                rows[i] = rows[i - 1];
            } else if !is_zero(&rows[i + 1]) {
                rows[i] = rows[i + 1];
            }
        }
    };
    let interior_clean = |rows: &[Vector2]| rows[1..n - 1].iter().all(|v| !is_zero(v));

    if n > 2 {
        for _ in 1..n - 1 {
            for i in 1..n - 1 {
                fill(rows.as_mut_slice(), i);
            }
            if interior_clean(rows.as_slice()) {
                break;
            }
            for i in (1..n - 1).rev() {
                fill(rows.as_mut_slice(), i);
            }
            if interior_clean(rows.as_slice()) {
                break;
            }
        }
    }

    if is_zero(&rows[0]) {
        rows[0] = rows[1];
    }
    if is_zero(&rows[n - 1]) {
        rows[n - 1] = rows[n - 2];
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize, step: f64) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f64 * step, 0.0)).collect()
    }

    #[test]
    fn cumulative_distances_of_3_4_5() {
        let d = cumulative_distances(&[Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)]);
        assert_eq!(d.len(), 2);
        assert_relative_eq!(d[1], 5.0);
    }

    #[test]
    fn resample_spacing_is_resolution() {
        let pts = resample(&line(11, 1.0), 0.25).unwrap();
        let d = cumulative_distances(&pts);
        for w in d.windows(2) {
            assert!(w[1] > w[0]);
            assert!((w[1] - w[0] - 0.25).abs() < 1e-9, "spacing {}", w[1] - w[0]);
        }
        assert_relative_eq!(*d.last().unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn resample_keeps_short_final_interval() {
        let pts = resample(&line(2, 1.0), 0.3).unwrap();
        let d = cumulative_distances(&pts);
        assert_eq!(pts.len(), 5);
        assert!((d[4] - d[3] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn resample_short_path_falls_back_to_end_points() {
        let pts = resample(&line(2, 0.05), 0.1).unwrap();
        assert_eq!(pts.len(), 2);
        assert_relative_eq!(pts[1].x, 0.05);
    }

    #[test]
    fn resample_single_point_returns_two() {
        let pts = resample(&[Point2::new(1.0, 2.0)], 0.1).unwrap();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn resample_removes_duplicate_knots() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let out = resample(&pts, 0.5).unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn resample_rejects_bad_resolution() {
        assert!(resample(&line(3, 1.0), 0.0).is_err());
        assert!(resample(&[], 1.0).is_err());
    }

    #[test]
    fn sub_polyline_interpolates_exact_cuts() {
        let pts = line(5, 1.0);
        let d = cumulative_distances(&pts);
        let sub = sub_polyline(&pts, &d, 0.5, 2.25).unwrap();
        assert_relative_eq!(sub[0].x, 0.5);
        assert_relative_eq!(sub[sub.len() - 1].x, 2.25);
        assert_eq!(sub.len(), 4);
    }

    #[test]
    fn sub_polyline_reuses_grid_points() {
        let z = vec![0.0, 1.0, 2.0, 3.0];
        let d = vec![0.0, 1.0, 2.0, 3.0];
        let sub = sub_polyline(&z, &d, 1.0, 3.0).unwrap();
        assert_eq!(sub, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sub_polyline_length_mismatch_fails() {
        assert!(sub_polyline(&[0.0, 1.0], &[0.0], 0.0, 1.0).is_err());
    }

    #[test]
    fn repair_fills_interior_and_ends() {
        let rows = vec![
            Vector2::zeros(),
            Vector2::new(1.0, 0.0),
            Vector2::zeros(),
            Vector2::zeros(),
            Vector2::new(0.0, 1.0),
            Vector2::zeros(),
        ];
        let fixed = repair_zero_rows(&rows).unwrap();
        assert!(fixed.iter().all(|v| v.norm() > 0.0));
        assert_eq!(fixed[0], Vector2::new(1.0, 0.0));
        assert_eq!(fixed[2], Vector2::new(1.0, 0.0));
        assert_eq!(fixed[5], Vector2::new(0.0, 1.0));
    }

    #[test]
    fn repair_all_zero_fails() {
        assert!(repair_zero_rows(&[Vector2::zeros(), Vector2::zeros()]).is_err());
    }
}
