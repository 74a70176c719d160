//! Fixed-step Runge-Kutta integration for small initial value problems.
//!
//! Used to convert the arc length of a cubic polynomial into its local
//! parameter and to integrate the heading of a spiral into positions.

use nalgebra::SVector;

use crate::error::{GeometryError, Result};

/// Default upper bound for a single integration step.
pub const DEFAULT_MAX_STEP: f64 = 1e-2;

/// Solves `dy/dt = f(t, y)` with `y(0) = y0`, reporting `y` at every `t_eval`.
///
/// `t_eval` must be non-decreasing with a first (and minimum) value of exactly
/// zero. Between requested samples the classical fourth-order Runge-Kutta
/// scheme is applied with steps no larger than `max_step`.
///
/// # Errors
///
/// Returns [`GeometryError::UnsortedSamples`] if `t_eval` is empty, unsorted or
/// does not start at zero, and [`GeometryError::SolveFailed`] if the trajectory
/// becomes non-finite before reaching every requested sample.
pub fn solve_ivp<const N: usize, F>(
    f: F,
    y0: SVector<f64, N>,
    t_eval: &[f64],
    max_step: f64,
) -> Result<Vec<SVector<f64, N>>>
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    let sorted = t_eval.windows(2).all(|w| w[0] <= w[1]);
    if t_eval.first() != Some(&0.0) || !sorted {
        return Err(GeometryError::UnsortedSamples(t_eval.to_vec()).into());
    }
    if max_step <= 0.0 || !max_step.is_finite() {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "max_step",
            value: max_step,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into());
    }

    let mut solution = Vec::with_capacity(t_eval.len());
    let mut t = 0.0;
    let mut y = y0;
    for &target in t_eval {
        let span = target - t;
        if span > 0.0 {
            let steps = (span / max_step).ceil().max(1.0);
            let h = span / steps;
            // `steps` is a small positive integer stored as f64.
            let mut remaining = steps;
            while remaining > 0.0 {
                y = rk4_step(&f, t, &y, h);
                t += h;
                remaining -= 1.0;
            }
            t = target;
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::SolveFailed(format!(
                "trajectory is not finite at t = {target}"
            ))
            .into());
        }
        solution.push(y);
    }
    Ok(solution)
}

fn rk4_step<const N: usize, F>(f: &F, t: f64, y: &SVector<f64, N>, h: f64) -> SVector<f64, N>
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    let k1 = f(t, y);
    let k2 = f(t + h * 0.5, &(y + k1 * (h * 0.5)));
    let k3 = f(t + h * 0.5, &(y + k2 * (h * 0.5)));
    let k4 = f(t + h, &(y + k3 * h));
    y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nalgebra::{Vector1, Vector2};

    #[test]
    fn exponential_growth() {
        let ys = solve_ivp(|_, y| *y, Vector1::new(1.0), &[0.0, 0.5, 1.0], DEFAULT_MAX_STEP).unwrap();
        assert!((ys[0][0] - 1.0).abs() < 1e-12);
        assert!((ys[2][0] - std::f64::consts::E).abs() < 1e-8);
    }

    #[test]
    fn unit_circle_from_heading() {
        let ys = solve_ivp(
            |t, _| Vector2::new(t.cos(), t.sin()),
            Vector2::zeros(),
            &[0.0, std::f64::consts::PI],
            DEFAULT_MAX_STEP,
        )
        .unwrap();
        assert!(ys[1][0].abs() < 1e-9);
        assert!((ys[1][1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_samples_are_allowed() {
        let ys = solve_ivp(|_, _| Vector1::new(1.0), Vector1::zeros(), &[0.0, 0.0, 2.0, 2.0], 0.5)
            .unwrap();
        assert_eq!(ys.len(), 4);
        assert!((ys[3][0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_samples_not_starting_at_zero() {
        assert!(solve_ivp(|_, y| *y, Vector1::new(1.0), &[0.1, 0.2], 0.1).is_err());
        assert!(solve_ivp(|_, y| *y, Vector1::new(1.0), &[0.0, 0.2, 0.1], 0.1).is_err());
        assert!(solve_ivp(|_, y| *y, Vector1::new(1.0), &[], 0.1).is_err());
    }

    #[test]
    fn diverging_trajectory_fails() {
        let result = solve_ivp(|_, y| y.component_mul(y) * 1e6, Vector1::new(1.0), &[0.0, 10.0], 0.1);
        assert!(result.is_err());
    }
}
