//! One displayed trajectory: source data, its interpolant and display settings.

use std::sync::Arc;

use glam::{DVec3, Vec4};
use tracing::debug;

use crate::error::TrajectoryError;
use crate::interpolant::{Interpolant, SplineMode};
use crate::provider::PositionProvider;
use crate::sampler::{PathPolyline, Resolution, sample_path, sample_times};
use crate::spec::{DiscreteTrajectory, Rgba, TrajectoryOptions, TrajectorySample, TrajectorySpec};
use crate::trace::{DEFAULT_TRACE_SAMPLES, trace_window};

/// How a trajectory is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryStyle {
    /// Nominal path color, used where samples carry none.
    pub color: Rgba,
    /// Default resolution for the full path.
    pub resolution: Resolution,
    /// Length of the trace window in simulation time.
    pub trace_dt: f64,
    /// Points per trace window.
    pub trace_samples: usize,
}

impl Default for TrajectoryStyle {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 0.0, 1.0),
            resolution: Resolution::Segments(100),
            trace_dt: 2.0,
            trace_samples: DEFAULT_TRACE_SAMPLES,
        }
    }
}

/// A trajectory ready for queries from the rendering side.
#[derive(Clone, Debug)]
pub struct Trajectory {
    spec: TrajectorySpec,
    mode: SplineMode,
    interpolant: Arc<Interpolant>,
    style: TrajectoryStyle,
}

impl Trajectory {
    /// Build the interpolant for `spec`.
    pub fn new(
        spec: TrajectorySpec,
        mode: SplineMode,
        style: TrajectoryStyle,
    ) -> Result<Self, TrajectoryError> {
        let interpolant = Arc::new(Interpolant::build(&spec, mode)?);
        Ok(Self {
            spec,
            mode,
            interpolant,
            style,
        })
    }

    /// Sample any position source over `[t0, tf]` every `step` into a
    /// discrete trajectory.
    pub fn tabulate(
        provider: &PositionProvider,
        t0: f64,
        tf: f64,
        step: f64,
        mode: SplineMode,
    ) -> Result<Self, TrajectoryError> {
        let samples = sample_times(t0, tf, Resolution::TimeStep(step))
            .into_iter()
            .map(|t| TrajectorySample::new(t, provider.position(t)))
            .collect();
        let discrete = DiscreteTrajectory::new(samples, TrajectoryOptions::default())?;
        Self::new(
            TrajectorySpec::Discrete(discrete),
            mode,
            TrajectoryStyle::default(),
        )
    }

    /// Replace the display settings.
    pub fn with_style(mut self, style: TrajectoryStyle) -> Self {
        self.style = style;
        self
    }

    /// Position at simulation time `t`.
    pub fn get_orbit_state(&self, t: f64) -> DVec3 {
        self.interpolant.evaluate(t)
    }

    /// Full path at `resolution`, or `None` when there is nothing to draw.
    pub fn get_path_polyline(&self, resolution: Resolution) -> Option<PathPolyline> {
        sample_path(&self.interpolant, resolution, self.style.color)
    }

    /// Full path at the style's resolution.
    pub fn path(&self) -> Option<PathPolyline> {
        self.get_path_polyline(self.style.resolution)
    }

    /// Fading window over `[now - dt, now]`.
    pub fn get_trace_window(&self, now: f64, dt: f64) -> Option<PathPolyline> {
        trace_window(
            &self.interpolant,
            now,
            dt,
            self.style.trace_samples,
            self.style.color,
        )
    }

    /// Trace window with the style's length.
    pub fn trace(&self, now: f64) -> Option<PathPolyline> {
        self.get_trace_window(now, self.style.trace_dt)
    }

    /// Trajectory time shown at simulation time `now`.
    ///
    /// Scales by `options.speed`; a non-animated trajectory stays at the start
    /// of its domain.
    pub fn playback_time(&self, now: f64) -> f64 {
        let options = self.spec.options();
        if options.animate {
            now * options.speed
        } else {
            self.interpolant.domain().map_or(0.0, |(t_min, _)| t_min)
        }
    }

    /// Position of the moving object at simulation time `now`.
    pub fn object_position(&self, now: f64) -> DVec3 {
        self.get_orbit_state(self.playback_time(now))
    }

    /// Refit with another interpolation mode. On error the current
    /// interpolant is kept.
    pub fn rebuild(&mut self, mode: SplineMode) -> Result<(), TrajectoryError> {
        let interpolant = Interpolant::build(&self.spec, mode)?;
        debug!(?mode, "rebuilt trajectory interpolant");
        self.interpolant = Arc::new(interpolant);
        self.mode = mode;
        Ok(())
    }

    /// Delta-v arrows `(start, end)` scaled by `scale`.
    pub fn delta_v_arrows(&self, scale: f64) -> Vec<(DVec3, DVec3)> {
        match self.spec.as_discrete() {
            Some(d) => d.delta_v().arrows(d.samples(), scale),
            None => Vec::new(),
        }
    }

    /// A position provider backed by this trajectory's interpolant.
    pub fn position_provider(&self) -> PositionProvider {
        match &self.spec {
            TrajectorySpec::Analytic(orbit) => PositionProvider::Analytic(*orbit),
            TrajectorySpec::Discrete(_) => {
                PositionProvider::Interpolated(Arc::clone(&self.interpolant))
            }
        }
    }

    /// Source data.
    pub fn spec(&self) -> &TrajectorySpec {
        &self.spec
    }

    /// Active interpolation mode.
    pub fn mode(&self) -> SplineMode {
        self.mode
    }

    /// Current interpolant.
    pub fn interpolant(&self) -> &Arc<Interpolant> {
        &self.interpolant
    }

    /// Display settings.
    pub fn style(&self) -> &TrajectoryStyle {
        &self.style
    }
}
