//! Fading trace of recent motion, recomputed on every query.

use crate::interpolant::Interpolant;
use crate::sampler::{PathPoint, PathPolyline, Resolution, sample_times};
use crate::spec::Rgba;

/// Points per trace window unless configured otherwise.
pub const DEFAULT_TRACE_SAMPLES: usize = 50;

/// Sub-path over `[now - dt, now]`, clipped to the sample domain. Looping
/// fits and analytic orbits are never clipped.
///
/// Points are evenly spaced across the clipped window; point `i` of `n`
/// gets alpha `i / (n - 1)` on top of `color`. Returns `None` when the window
/// has no width or `sample_count < 2`. `now` need not be monotonic between
/// calls.
pub fn trace_window(
    interpolant: &Interpolant,
    now: f64,
    dt: f64,
    sample_count: usize,
    color: Rgba,
) -> Option<PathPolyline> {
    if sample_count < 2 || dt.is_nan() || dt <= 0.0 || !now.is_finite() {
        return None;
    }
    let (lo, hi) = match (interpolant.loop_span(), interpolant.domain()) {
        (None, Some((t_min, t_max))) => ((now - dt).max(t_min), now.min(t_max)),
        _ => (now - dt, now),
    };
    if hi <= lo {
        return None;
    }

    let last = (sample_count - 1) as f32;
    let points = sample_times(lo, hi, Resolution::Segments(sample_count - 1))
        .into_iter()
        .enumerate()
        .map(|(i, t)| PathPoint {
            t,
            position: interpolant.evaluate(t),
            color: Rgba::new(color.x, color.y, color.z, i as f32 / last),
        })
        .collect();
    PathPolyline::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolant::SplineMode;
    use crate::spec::{
        AnalyticOrbit, DiscreteTrajectory, TrajectoryOptions, TrajectorySample, TrajectorySpec,
    };
    use crate::spline::SplineBoundary;
    use glam::{DVec3, Vec4};

    const YELLOW: Rgba = Vec4::new(1.0, 1.0, 0.0, 1.0);

    fn ramp() -> Interpolant {
        let samples = (0..=10)
            .map(|i| TrajectorySample::new(i as f64, DVec3::new(i as f64, 0.0, 0.0)))
            .collect();
        let spec = TrajectorySpec::Discrete(
            DiscreteTrajectory::new(samples, TrajectoryOptions::default()).unwrap(),
        );
        Interpolant::build(&spec, SplineMode::Linear).unwrap()
    }

    #[test]
    fn test_window_ends_at_now() {
        let trace = trace_window(&ramp(), 5.0, 2.0, DEFAULT_TRACE_SAMPLES, YELLOW).unwrap();
        assert_eq!(trace.len(), DEFAULT_TRACE_SAMPLES);
        let points = trace.points();
        assert!((points[0].t - 3.0).abs() < 1e-12);
        assert_eq!(points[points.len() - 1].t, 5.0);
        assert!((points[points.len() - 1].position.x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_never_longer_than_dt() {
        let interp = ramp();
        for now in [-1.0, 0.5, 3.3, 9.9, 10.0, 14.0] {
            if let Some(trace) = trace_window(&interp, now, 2.0, 20, YELLOW) {
                assert!(trace.duration() <= 2.0 + 1e-12, "now={now}");
            }
        }
    }

    #[test]
    fn test_window_truncated_at_start() {
        let trace = trace_window(&ramp(), 0.5, 2.0, 11, YELLOW).unwrap();
        assert_eq!(trace.points()[0].t, 0.0);
        assert!((trace.duration() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_window_truncated_at_end() {
        let trace = trace_window(&ramp(), 12.0, 3.0, 11, YELLOW).unwrap();
        assert!((trace.points()[0].t - 9.0).abs() < 1e-12);
        assert_eq!(trace.points()[10].t, 10.0);
    }

    #[test]
    fn test_collapsed_window_is_empty() {
        let interp = ramp();
        assert!(trace_window(&interp, 0.0, 2.0, 50, YELLOW).is_none());
        assert!(trace_window(&interp, -5.0, 2.0, 50, YELLOW).is_none());
        assert!(trace_window(&interp, 5.0, 0.0, 50, YELLOW).is_none());
        assert!(trace_window(&interp, 5.0, 2.0, 1, YELLOW).is_none());
    }

    #[test]
    fn test_alpha_fades_in() {
        let trace = trace_window(&ramp(), 5.0, 2.0, 5, YELLOW).unwrap();
        let alphas: Vec<f32> = trace.points().iter().map(|p| p.color.w).collect();
        assert_eq!(alphas, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(trace.points().iter().all(|p| p.color.x == 1.0 && p.color.z == 0.0));
    }

    #[test]
    fn test_non_monotonic_now() {
        let interp = ramp();
        let later = trace_window(&interp, 8.0, 1.0, 3, YELLOW).unwrap();
        let earlier = trace_window(&interp, 2.0, 1.0, 3, YELLOW).unwrap();
        assert!((later.points()[2].position.x - 8.0).abs() < 1e-12);
        assert!((earlier.points()[2].position.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_looping_window_crosses_last_sample() {
        let samples = [DVec3::X, DVec3::Y, DVec3::NEG_X, DVec3::NEG_Y]
            .iter()
            .enumerate()
            .map(|(i, &p)| TrajectorySample::new(i as f64, p))
            .collect();
        let options = TrajectoryOptions {
            looping: true,
            ..TrajectoryOptions::default()
        };
        let spec = TrajectorySpec::Discrete(DiscreteTrajectory::new(samples, options).unwrap());
        let interp = Interpolant::build(&spec, SplineMode::Cubic(SplineBoundary::NotAKnot)).unwrap();

        let trace = trace_window(&interp, 3.5, 1.0, 5, YELLOW).unwrap();
        let last = trace.points()[4];
        assert_eq!(last.t, 3.5);
        assert!((last.position - interp.evaluate(3.5)).length() < 1e-12);
        assert!((trace.duration() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_analytic_window_unbounded() {
        let orbit = AnalyticOrbit::from_degrees(2.0, 0.0, 1.0).unwrap();
        let interp = Interpolant::build(&TrajectorySpec::Analytic(orbit), SplineMode::Linear).unwrap();
        let trace = trace_window(&interp, -40.0, 1.0, 4, YELLOW).unwrap();
        assert!((trace.duration() - 1.0).abs() < 1e-12);
    }
}
