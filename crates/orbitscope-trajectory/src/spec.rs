//! Validated trajectory data: discrete time-stamped samples or analytic orbit parameters.

use glam::{DVec3, Vec4};

use crate::error::TrajectoryError;

/// RGBA color, components in `[0, 1]`.
pub type Rgba = Vec4;

/// One time-stamped position, optionally colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    /// Sample time.
    pub t: f64,
    /// Position at `t`.
    pub position: DVec3,
    /// Per-sample color, if the source carried one.
    pub color: Option<Rgba>,
}

impl TrajectorySample {
    /// An uncolored sample.
    pub fn new(t: f64, position: DVec3) -> Self {
        Self {
            t,
            position,
            color: None,
        }
    }

    /// Attach a color to this sample.
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }
}

/// Playback options carried by a discrete trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryOptions {
    /// The trajectory closes on itself; cubic fits use a periodic boundary.
    pub looping: bool,
    /// Playback rate multiplier applied to simulation time.
    pub speed: f64,
    /// Whether the moving object advances along the path.
    pub animate: bool,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            looping: false,
            speed: 1.0,
            animate: true,
        }
    }
}

/// Impulsive maneuver annotations attached to a discrete trajectory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeltaVAnnotations {
    /// One delta-v per sample (zero vectors mean "no burn").
    pub per_sample: Option<Vec<DVec3>>,
    /// Burn at the first sample.
    pub initial: Option<DVec3>,
    /// Burn at the last sample.
    pub final_: Option<DVec3>,
}

impl DeltaVAnnotations {
    /// Whether no annotation is present.
    pub fn is_empty(&self) -> bool {
        self.per_sample.is_none() && self.initial.is_none() && self.final_.is_none()
    }

    /// Arrow segments `(start, end)` for every nonzero delta-v, scaled by `scale`.
    ///
    /// Per-sample arrows start at their sample, `initial` at the first sample
    /// and `final_` at the last one. Arrows anchored at the origin are skipped.
    pub fn arrows(&self, samples: &[TrajectorySample], scale: f64) -> Vec<(DVec3, DVec3)> {
        let mut arrows = Vec::new();
        if scale == 0.0 || samples.is_empty() {
            return arrows;
        }
        let mut push = |anchor: DVec3, dv: DVec3| {
            if dv.length_squared() == 0.0 || anchor.length_squared() == 0.0 {
                return;
            }
            arrows.push((anchor, anchor + dv * scale));
        };
        if let Some(per_sample) = &self.per_sample {
            for (sample, dv) in samples.iter().zip(per_sample) {
                push(sample.position, *dv);
            }
        }
        if let Some(dv) = self.initial {
            push(samples[0].position, dv);
        }
        if let (Some(dv), Some(last)) = (self.final_, samples.last()) {
            push(last.position, dv);
        }
        arrows
    }
}

/// An ordered, validated set of samples. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteTrajectory {
    samples: Vec<TrajectorySample>,
    options: TrajectoryOptions,
    delta_v: DeltaVAnnotations,
}

impl DiscreteTrajectory {
    /// Validate and wrap a sample sequence.
    ///
    /// Requires at least two samples with finite, strictly increasing times,
    /// and colors on every sample or on none.
    pub fn new(
        samples: Vec<TrajectorySample>,
        options: TrajectoryOptions,
    ) -> Result<Self, TrajectoryError> {
        if samples.len() < 2 {
            return Err(TrajectoryError::TooFewSamples {
                required: 2,
                actual: samples.len(),
            });
        }
        for (index, sample) in samples.iter().enumerate() {
            if !sample.t.is_finite() || !sample.position.is_finite() {
                return Err(TrajectoryError::NonFinite { index });
            }
        }
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].t <= pair[0].t {
                return Err(TrajectoryError::NonIncreasingTime {
                    index: index + 1,
                    previous: pair[0].t,
                    current: pair[1].t,
                });
            }
        }
        let colored = samples.iter().filter(|s| s.color.is_some()).count();
        if colored != 0 && colored != samples.len() {
            return Err(TrajectoryError::PartialColors);
        }
        Ok(Self {
            samples,
            options,
            delta_v: DeltaVAnnotations::default(),
        })
    }

    /// A single fixed point, used as a "no motion yet" placeholder.
    pub fn placeholder(position: DVec3) -> Self {
        Self {
            samples: vec![TrajectorySample::new(0.0, position)],
            options: TrajectoryOptions::default(),
            delta_v: DeltaVAnnotations::default(),
        }
    }

    /// Attach delta-v annotations, checking per-sample length.
    pub fn with_delta_v(mut self, delta_v: DeltaVAnnotations) -> Result<Self, TrajectoryError> {
        if let Some(per_sample) = &delta_v.per_sample
            && per_sample.len() != self.samples.len()
        {
            return Err(TrajectoryError::LengthMismatch {
                field: "dvx",
                expected: self.samples.len(),
                actual: per_sample.len(),
            });
        }
        self.delta_v = delta_v;
        Ok(self)
    }

    /// Samples in time order.
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    /// Playback options.
    pub fn options(&self) -> TrajectoryOptions {
        self.options
    }

    /// Maneuver annotations.
    pub fn delta_v(&self) -> &DeltaVAnnotations {
        &self.delta_v
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a trajectory holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the first sample.
    pub fn t_min(&self) -> f64 {
        self.samples[0].t
    }

    /// Time of the last sample.
    pub fn t_max(&self) -> f64 {
        self.samples[self.samples.len() - 1].t
    }

    /// Sample times.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    /// Whether every sample carries a color.
    pub fn has_colors(&self) -> bool {
        self.samples.iter().all(|s| s.color.is_some())
    }
}

/// Closed circular orbit, optionally inclined about the x axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyticOrbit {
    /// Orbit radius.
    pub radius: f64,
    /// Inclination in radians.
    pub inclination: f64,
    /// Angular speed in radians per unit time.
    pub angular_speed: f64,
}

impl AnalyticOrbit {
    /// Build from an inclination in degrees.
    pub fn from_degrees(
        radius: f64,
        inclination_deg: f64,
        angular_speed: f64,
    ) -> Result<Self, TrajectoryError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(TrajectoryError::InvalidAnalytic("radius must be finite and >= 0"));
        }
        if !inclination_deg.is_finite() || !angular_speed.is_finite() {
            return Err(TrajectoryError::InvalidAnalytic(
                "inclination and speed must be finite",
            ));
        }
        Ok(Self {
            radius,
            inclination: inclination_deg.to_radians(),
            angular_speed,
        })
    }

    /// Position at time `t`. Defined for every `t`.
    pub fn position(&self, t: f64) -> DVec3 {
        let angle = self.angular_speed * t;
        let (sin_a, cos_a) = angle.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        self.radius * DVec3::new(cos_a, sin_a * cos_i, sin_a * sin_i)
    }

    /// Orbital period `2π / |speed|`, or `None` for a stationary orbit.
    pub fn period(&self) -> Option<f64> {
        if self.angular_speed.abs() < f64::EPSILON {
            None
        } else {
            Some(std::f64::consts::TAU / self.angular_speed.abs())
        }
    }
}

/// Source data for one trajectory. Exactly one representation is active.
#[derive(Clone, Debug, PartialEq)]
pub enum TrajectorySpec {
    /// Time-stamped samples.
    Discrete(DiscreteTrajectory),
    /// Closed-form circular orbit.
    Analytic(AnalyticOrbit),
}

impl TrajectorySpec {
    /// Options of a discrete spec; analytic orbits always loop.
    pub fn options(&self) -> TrajectoryOptions {
        match self {
            TrajectorySpec::Discrete(d) => d.options(),
            TrajectorySpec::Analytic(_) => TrajectoryOptions {
                looping: true,
                ..TrajectoryOptions::default()
            },
        }
    }

    /// The discrete samples, if any.
    pub fn as_discrete(&self) -> Option<&DiscreteTrajectory> {
        match self {
            TrajectorySpec::Discrete(d) => Some(d),
            TrajectorySpec::Analytic(_) => None,
        }
    }
}
