//! Scalar cubic spline through strictly increasing knots.
//!
//! Stored as knot values plus second derivatives `M_i`. On interval
//! `[t_i, t_{i+1}]` with `h = t_{i+1} - t_i`, `s = (t - t_i) / h`, `a = 1 - s`:
//!
//! `S(t) = a·y_i + s·y_{i+1} + ((a³ - a)·M_i + (s³ - s)·M_{i+1})·h² / 6`
//!
//! which reproduces `y_i` at `s = 0` and `y_{i+1}` at `s = 1` exactly.

use crate::error::TrajectoryError;

/// End condition of the fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplineBoundary {
    /// Zero second derivative at both ends.
    Natural,
    /// Third derivative continuous across the second and second-to-last knots.
    #[default]
    NotAKnot,
    /// Value, slope, and curvature match across the ends. The last knot value
    /// must equal the first.
    Periodic,
}

/// A fitted cubic spline. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivs: Vec<f64>,
    boundary: SplineBoundary,
}

impl CubicSpline {
    /// Fit a spline through `(knots[i], values[i])`.
    ///
    /// `knots` must be strictly increasing and as long as `values`. At least
    /// three knots are required.
    pub fn fit(
        knots: &[f64],
        values: &[f64],
        boundary: SplineBoundary,
    ) -> Result<Self, TrajectoryError> {
        if knots.len() != values.len() {
            return Err(TrajectoryError::LengthMismatch {
                field: "values",
                expected: knots.len(),
                actual: values.len(),
            });
        }
        let n = knots.len();
        if n < 3 {
            return Err(match boundary {
                SplineBoundary::Periodic => TrajectoryError::PeriodicTooFewSamples(n),
                _ => TrajectoryError::TooFewSamples {
                    required: 3,
                    actual: n,
                },
            });
        }
        for (index, pair) in knots.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TrajectoryError::NonIncreasingTime {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = values
            .windows(2)
            .zip(&h)
            .map(|(w, hi)| (w[1] - w[0]) / hi)
            .collect();

        let second_derivs = match boundary {
            SplineBoundary::Natural => natural_second_derivs(&h, &slope),
            SplineBoundary::NotAKnot => not_a_knot_second_derivs(&h, &slope),
            SplineBoundary::Periodic => periodic_second_derivs(&h, &slope),
        };

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second_derivs,
            boundary,
        })
    }

    /// Boundary condition used for the fit.
    pub fn boundary(&self) -> SplineBoundary {
        self.boundary
    }

    /// First knot.
    pub fn t_min(&self) -> f64 {
        self.knots[0]
    }

    /// Last knot.
    pub fn t_max(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Evaluate at `t`. Outside the knot range the end polynomials are
    /// extrapolated; callers clamp or wrap first.
    pub fn evaluate(&self, t: f64) -> f64 {
        let i = interval_index(&self.knots, t);
        let h = self.knots[i + 1] - self.knots[i];
        let s = (t - self.knots[i]) / h;
        let a = 1.0 - s;
        a * self.values[i]
            + s * self.values[i + 1]
            + ((a * a * a - a) * self.second_derivs[i]
                + (s * s * s - s) * self.second_derivs[i + 1])
                * h
                * h
                / 6.0
    }
}

/// Index `i` of the interval `[knots[i], knots[i + 1])` holding `t`, clamped
/// to the first and last intervals.
pub(crate) fn interval_index(knots: &[f64], t: f64) -> usize {
    let last = knots.len() - 2;
    let upper = knots.partition_point(|&k| k <= t);
    upper.saturating_sub(1).min(last)
}

fn natural_second_derivs(h: &[f64], slope: &[f64]) -> Vec<f64> {
    let n = h.len() + 1;
    let interior = n - 2;
    let mut sub = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut sup = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];
    for row in 0..interior {
        let i = row + 1;
        sub[row] = h[i - 1];
        diag[row] = 2.0 * (h[i - 1] + h[i]);
        sup[row] = h[i];
        rhs[row] = 6.0 * (slope[i] - slope[i - 1]);
    }
    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs);
    let mut m = Vec::with_capacity(n);
    m.push(0.0);
    m.extend(inner);
    m.push(0.0);
    m
}

fn not_a_knot_second_derivs(h: &[f64], slope: &[f64]) -> Vec<f64> {
    let n = h.len() + 1;
    if n == 3 {
        // Both end conditions collapse onto the single interior knot: the
        // result is the interpolating parabola, with constant curvature.
        let curvature = 2.0 * (slope[1] - slope[0]) / (h[0] + h[1]);
        return vec![curvature; 3];
    }

    let interior = n - 2;
    let mut sub = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut sup = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];
    for row in 0..interior {
        let i = row + 1;
        sub[row] = h[i - 1];
        diag[row] = 2.0 * (h[i - 1] + h[i]);
        sup[row] = h[i];
        rhs[row] = 6.0 * (slope[i] - slope[i - 1]);
    }

    // Eliminate M_0 = ((h0 + h1)·M_1 - h0·M_2) / h1 from the first row.
    let (h0, h1) = (h[0], h[1]);
    diag[0] += h0 * (h0 + h1) / h1;
    sup[0] -= h0 * h0 / h1;
    sub[0] = 0.0;

    // Eliminate M_{n-1} = ((ha + hb)·M_{n-2} - hb·M_{n-3}) / ha from the last row.
    let (ha, hb) = (h[n - 3], h[n - 2]);
    let last = interior - 1;
    diag[last] += hb * (ha + hb) / ha;
    sub[last] -= hb * hb / ha;
    sup[last] = 0.0;

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs);
    let m_first = ((h0 + h1) * inner[0] - h0 * inner[1]) / h1;
    let m_last = ((ha + hb) * inner[last] - hb * inner[last - 1]) / ha;

    let mut m = Vec::with_capacity(n);
    m.push(m_first);
    m.extend(inner);
    m.push(m_last);
    m
}

fn periodic_second_derivs(h: &[f64], slope: &[f64]) -> Vec<f64> {
    // Unknowns M_0..M_{p-1}; M_p wraps onto M_0.
    let p = h.len();
    let prev = |i: usize| if i == 0 { p - 1 } else { i - 1 };

    let mut sub = vec![0.0; p];
    let mut diag = vec![0.0; p];
    let mut sup = vec![0.0; p];
    let mut rhs = vec![0.0; p];
    for i in 0..p {
        let hp = h[prev(i)];
        sub[i] = hp;
        diag[i] = 2.0 * (hp + h[i]);
        sup[i] = h[i];
        rhs[i] = 6.0 * (slope[i] - slope[prev(i)]);
    }

    let mut m = if p >= 3 {
        solve_cyclic(&sub, &diag, &sup, &rhs)
    } else {
        // Two unknowns: both neighbors of each row are the same unknown.
        let a = [[diag[0], sub[0] + sup[0]], [sub[1] + sup[1], diag[1]]];
        let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
        if det.abs() < f64::EPSILON {
            vec![0.0, 0.0]
        } else {
            vec![
                (rhs[0] * a[1][1] - a[0][1] * rhs[1]) / det,
                (a[0][0] * rhs[1] - rhs[0] * a[1][0]) / det,
            ]
        }
    };
    m.push(m[0]);
    m
}

/// Thomas algorithm. `sub[0]` and `sup[last]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c[i - 1];
        c[i] = if i + 1 < n { sup[i] / denom } else { 0.0 };
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / denom;
    }
    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

/// Cyclic tridiagonal solve via Sherman–Morrison. `sub[0]` couples row 0 to
/// the last unknown and `sup[last]` couples the last row to unknown 0.
fn solve_cyclic(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let alpha = sup[n - 1];
    let beta = sub[0];
    let gamma = -diag[0];

    let mut bb = diag.to_vec();
    bb[0] = diag[0] - gamma;
    bb[n - 1] = diag[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(sub, &bb, sup, rhs);

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(sub, &bb, sup, &u);

    let fact = (x[0] + beta * x[n - 1] / gamma) / (1.0 + z[0] + beta * z[n - 1] / gamma);
    x.iter().zip(&z).map(|(xi, zi)| xi - fact * zi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_reproduces_knot_values() {
        let knots = [0.0, 0.7, 1.5, 3.0, 3.2];
        let values = [1.0, -2.0, 0.5, 4.0, 3.0];
        for boundary in [SplineBoundary::Natural, SplineBoundary::NotAKnot] {
            let spline = CubicSpline::fit(&knots, &values, boundary).unwrap();
            for (t, y) in knots.iter().zip(values) {
                assert_eq!(spline.evaluate(*t), y, "{boundary:?} at t={t}");
            }
        }
    }

    #[test]
    fn test_natural_has_zero_end_curvature() {
        let spline =
            CubicSpline::fit(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0], SplineBoundary::Natural)
                .unwrap();
        assert_eq!(spline.second_derivs[0], 0.0);
        assert_eq!(spline.second_derivs[3], 0.0);
    }

    #[test]
    fn test_not_a_knot_reproduces_cubic_exactly() {
        let f = |t: f64| 2.0 * t * t * t - t * t + 0.5 * t - 3.0;
        let knots = [0.0, 0.5, 1.25, 2.0, 3.0, 3.5];
        let values: Vec<f64> = knots.iter().map(|&t| f(t)).collect();
        let spline = CubicSpline::fit(&knots, &values, SplineBoundary::NotAKnot).unwrap();
        for t in [0.1, 0.9, 1.7, 2.6, 3.4] {
            assert!((spline.evaluate(t) - f(t)).abs() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn test_not_a_knot_three_points_is_parabola() {
        let f = |t: f64| 3.0 * t * t - 2.0 * t + 1.0;
        let knots = [0.0, 1.0, 3.0];
        let values: Vec<f64> = knots.iter().map(|&t| f(t)).collect();
        let spline = CubicSpline::fit(&knots, &values, SplineBoundary::NotAKnot).unwrap();
        for t in [0.25, 0.5, 2.0, 2.9] {
            assert!((spline.evaluate(t) - f(t)).abs() < EPS, "t={t}");
        }
    }

    #[test]
    fn test_periodic_matches_slope_and_curvature_across_ends() {
        let knots = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values = [1.0, 0.0, -1.0, 0.0, 1.0];
        let spline = CubicSpline::fit(&knots, &values, SplineBoundary::Periodic).unwrap();
        let d = 1e-6;
        let slope_start = (spline.evaluate(d) - spline.evaluate(0.0)) / d;
        let slope_end = (spline.evaluate(4.0) - spline.evaluate(4.0 - d)) / d;
        assert!((slope_start - slope_end).abs() < 1e-4);
        assert!((spline.second_derivs[0] - spline.second_derivs[4]).abs() < EPS);
    }

    #[test]
    fn test_periodic_uniform_circle_second_derivatives() {
        let knots = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values = [1.0, 0.0, -1.0, 0.0, 1.0];
        let spline = CubicSpline::fit(&knots, &values, SplineBoundary::Periodic).unwrap();
        let expected = [-3.0, 0.0, 3.0, 0.0, -3.0];
        for (m, e) in spline.second_derivs.iter().zip(expected) {
            assert!((m - e).abs() < EPS, "{m} vs {e}");
        }
        assert!((spline.evaluate(0.5) - 0.6875).abs() < EPS);
    }

    #[test]
    fn test_periodic_two_intervals() {
        let spline =
            CubicSpline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], SplineBoundary::Periodic).unwrap();
        assert_eq!(spline.evaluate(1.0), 1.0);
        assert!((spline.second_derivs[0] - spline.second_derivs[2]).abs() < EPS);
    }

    #[test]
    fn test_rejects_too_few_knots() {
        assert!(matches!(
            CubicSpline::fit(&[0.0, 1.0], &[0.0, 1.0], SplineBoundary::Periodic),
            Err(TrajectoryError::PeriodicTooFewSamples(2))
        ));
        assert!(matches!(
            CubicSpline::fit(&[0.0, 1.0], &[0.0, 1.0], SplineBoundary::Natural),
            Err(TrajectoryError::TooFewSamples { required: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(matches!(
            CubicSpline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0], SplineBoundary::Natural),
            Err(TrajectoryError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_interval_index_clamps() {
        let knots = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(interval_index(&knots, -5.0), 0);
        assert_eq!(interval_index(&knots, 0.0), 0);
        assert_eq!(interval_index(&knots, 1.0), 1);
        assert_eq!(interval_index(&knots, 2.5), 2);
        assert_eq!(interval_index(&knots, 3.0), 2);
        assert_eq!(interval_index(&knots, 10.0), 2);
    }
}
