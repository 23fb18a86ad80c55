//! Continuous position as a function of time, built once from a [`TrajectorySpec`].

use glam::DVec3;
use tracing::debug;

use crate::error::TrajectoryError;
use crate::spec::{AnalyticOrbit, DiscreteTrajectory, Rgba, TrajectorySpec};
use crate::spline::{CubicSpline, SplineBoundary};

/// Requested interpolation for discrete trajectories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplineMode {
    /// Piecewise-linear between consecutive samples.
    Linear,
    /// One cubic spline per axis. The boundary applies to non-looping
    /// trajectories; looping ones are always fitted periodically.
    Cubic(SplineBoundary),
}

impl Default for SplineMode {
    fn default() -> Self {
        SplineMode::Cubic(SplineBoundary::NotAKnot)
    }
}

/// Sample times plus optional per-sample colors, for color lookups keyed to
/// the original samples.
#[derive(Clone, Debug, PartialEq)]
struct SampleTrack {
    times: Vec<f64>,
    colors: Option<Vec<Rgba>>,
}

impl SampleTrack {
    fn from_discrete(d: &DiscreteTrajectory) -> Self {
        let colors = if d.has_colors() {
            d.samples().iter().map(|s| s.color).collect()
        } else {
            None
        };
        Self {
            times: d.times(),
            colors,
        }
    }

    fn t_min(&self) -> f64 {
        self.times[0]
    }

    fn t_max(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Per-channel linear color at `t`, holding the end colors outside the domain.
    fn color_at(&self, t: f64) -> Option<Rgba> {
        let colors = self.colors.as_ref()?;
        let (i, alpha) = bracket(&self.times, t);
        match alpha {
            None => Some(colors[i]),
            Some(a) => Some(colors[i].lerp(colors[i + 1], a as f32)),
        }
    }
}

/// Locate `t` in strictly increasing `times`.
///
/// Returns `(i, None)` when `t` is clamped onto sample `i`, or `(i, Some(a))`
/// for a blend `a ∈ (0, 1)` between samples `i` and `i + 1`.
fn bracket(times: &[f64], t: f64) -> (usize, Option<f64>) {
    let last = times.len() - 1;
    if t <= times[0] {
        return (0, None);
    }
    if t >= times[last] {
        return (last, None);
    }
    let i = times.partition_point(|&x| x <= t) - 1;
    if t == times[i] {
        return (i, None);
    }
    (i, Some((t - times[i]) / (times[i + 1] - times[i])))
}

/// Piecewise-linear interpolant.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearInterpolant {
    track: SampleTrack,
    points: Vec<DVec3>,
}

impl LinearInterpolant {
    fn evaluate(&self, t: f64) -> DVec3 {
        match bracket(&self.track.times, t) {
            (i, None) => self.points[i],
            (i, Some(a)) => self.points[i] * (1.0 - a) + self.points[i + 1] * a,
        }
    }
}

/// Per-axis cubic spline interpolant.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicInterpolant {
    track: SampleTrack,
    axes: [CubicSpline; 3],
    /// `(start, length)` of the fitted period when looping.
    period: Option<(f64, f64)>,
}

impl CubicInterpolant {
    fn fit(d: &DiscreteTrajectory, boundary: SplineBoundary) -> Result<Self, TrajectoryError> {
        let samples = d.samples();
        let looping = d.options().looping || boundary == SplineBoundary::Periodic;
        if looping && samples.len() < 3 {
            return Err(TrajectoryError::PeriodicTooFewSamples(samples.len()));
        }

        let mut knots = d.times();
        let mut points: Vec<DVec3> = samples.iter().map(|s| s.position).collect();

        let boundary = if looping {
            let first = points[0];
            if points[points.len() - 1] != first {
                // Close the loop one mean spacing after the last sample.
                let spacing = (d.t_max() - d.t_min()) / (samples.len() - 1) as f64;
                knots.push(d.t_max() + spacing);
                points.push(first);
            }
            SplineBoundary::Periodic
        } else {
            boundary
        };

        let axis = |pick: fn(&DVec3) -> f64| -> Vec<f64> { points.iter().map(pick).collect() };
        let axes = [
            CubicSpline::fit(&knots, &axis(|p| p.x), boundary)?,
            CubicSpline::fit(&knots, &axis(|p| p.y), boundary)?,
            CubicSpline::fit(&knots, &axis(|p| p.z), boundary)?,
        ];

        let period = looping.then(|| (knots[0], knots[knots.len() - 1] - knots[0]));

        Ok(Self {
            track: SampleTrack::from_discrete(d),
            axes,
            period,
        })
    }

    fn evaluate(&self, t: f64) -> DVec3 {
        let t = match self.period {
            Some((start, length)) if t < start || t > start + length => {
                start + (t - start).rem_euclid(length)
            }
            Some(_) => t,
            None => t.clamp(self.track.t_min(), self.track.t_max()),
        };
        DVec3::new(
            self.axes[0].evaluate(t),
            self.axes[1].evaluate(t),
            self.axes[2].evaluate(t),
        )
    }
}

/// A continuous function of time. Immutable; rebuild to change it.
#[derive(Clone, Debug, PartialEq)]
pub enum Interpolant {
    /// A single sample: the same position at every time.
    Fixed {
        /// Sample time (the degenerate domain).
        t: f64,
        /// The one position.
        position: DVec3,
        /// The one color, if any.
        color: Option<Rgba>,
    },
    /// Piecewise-linear over discrete samples.
    Linear(LinearInterpolant),
    /// Per-axis cubic spline over discrete samples.
    Cubic(CubicInterpolant),
    /// Closed-form circular orbit.
    Analytic(AnalyticOrbit),
}

impl Interpolant {
    /// Build from a spec.
    ///
    /// A single-sample spec always yields [`Interpolant::Fixed`]. A
    /// non-looping cubic request over only two samples falls back to linear,
    /// since no curvature can be fitted.
    pub fn build(spec: &TrajectorySpec, mode: SplineMode) -> Result<Self, TrajectoryError> {
        let discrete = match spec {
            TrajectorySpec::Analytic(orbit) => return Ok(Interpolant::Analytic(*orbit)),
            TrajectorySpec::Discrete(d) => d,
        };

        if discrete.len() == 1 {
            let sample = discrete.samples()[0];
            return Ok(Interpolant::Fixed {
                t: sample.t,
                position: sample.position,
                color: sample.color,
            });
        }

        match mode {
            SplineMode::Cubic(boundary) => {
                let looping = discrete.options().looping || boundary == SplineBoundary::Periodic;
                if discrete.len() == 2 && !looping {
                    debug!("cubic requested over 2 samples, using linear");
                    return Ok(Self::linear(discrete));
                }
                Ok(Interpolant::Cubic(CubicInterpolant::fit(discrete, boundary)?))
            }
            SplineMode::Linear => Ok(Self::linear(discrete)),
        }
    }

    fn linear(d: &DiscreteTrajectory) -> Self {
        Interpolant::Linear(LinearInterpolant {
            track: SampleTrack::from_discrete(d),
            points: d.samples().iter().map(|s| s.position).collect(),
        })
    }

    /// Position at `t`.
    ///
    /// Out-of-domain times clamp to the end samples, or wrap into the period
    /// for looping cubic fits. Never fails.
    pub fn evaluate(&self, t: f64) -> DVec3 {
        match self {
            Interpolant::Fixed { position, .. } => *position,
            Interpolant::Linear(linear) => linear.evaluate(t),
            Interpolant::Cubic(cubic) => cubic.evaluate(t),
            Interpolant::Analytic(orbit) => orbit.position(t),
        }
    }

    /// Color at `t` resampled from the original per-sample colors, if present.
    pub fn color_at(&self, t: f64) -> Option<Rgba> {
        match self {
            Interpolant::Fixed { color, .. } => *color,
            Interpolant::Linear(linear) => linear.track.color_at(t),
            Interpolant::Cubic(cubic) => cubic.track.color_at(t),
            Interpolant::Analytic(_) => None,
        }
    }

    /// Whether per-sample colors are available.
    pub fn has_colors(&self) -> bool {
        match self {
            Interpolant::Fixed { color, .. } => color.is_some(),
            Interpolant::Linear(linear) => linear.track.colors.is_some(),
            Interpolant::Cubic(cubic) => cubic.track.colors.is_some(),
            Interpolant::Analytic(_) => false,
        }
    }

    /// Sample-time domain `[t_min, t_max]`. `None` for analytic orbits, which
    /// are defined everywhere.
    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            Interpolant::Fixed { t, .. } => Some((*t, *t)),
            Interpolant::Linear(linear) => Some((linear.track.t_min(), linear.track.t_max())),
            Interpolant::Cubic(cubic) => Some((cubic.track.t_min(), cubic.track.t_max())),
            Interpolant::Analytic(_) => None,
        }
    }

    /// `[start, start + period]` of a looping fit, including the closing arc
    /// back to the first sample. `None` for anything not fitted as a loop.
    pub fn loop_span(&self) -> Option<(f64, f64)> {
        match self {
            Interpolant::Cubic(cubic) => cubic.period.map(|(start, length)| (start, start + length)),
            _ => None,
        }
    }

    /// Repeat period, if the interpolant is periodic.
    pub fn period(&self) -> Option<f64> {
        match self {
            Interpolant::Cubic(cubic) => cubic.period.map(|(_, length)| length),
            Interpolant::Analytic(orbit) => orbit.period(),
            _ => None,
        }
    }
}
