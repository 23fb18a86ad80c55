//! Simulation time, passed explicitly into every per-frame call.

use orbitscope_config::ClockConfig;
use tracing::debug;

/// Simulation clock with pause and scrubbing.
///
/// While running, time advances by the frame delta. Past `max_time` it is
/// reduced modulo `max_time` and then raised to at least `min_time`, so with
/// a non-zero `min_time` a wrapped time that lands below it holds at
/// `min_time` rather than wrapping into `[min_time, max_time)`. While
/// scrubbing, time is whatever the scrubber last set and frame deltas are
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationClock {
    now: f64,
    paused: bool,
    scrubbing: bool,
    min_time: f64,
    max_time: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::from(&ClockConfig::default())
    }
}

impl From<&ClockConfig> for SimulationClock {
    fn from(config: &ClockConfig) -> Self {
        let mut clock = Self::new(config.min_time, config.max_time);
        clock.paused = config.start_paused;
        clock
    }
}

impl SimulationClock {
    /// Running clock at `min_time`. Bounds are swapped if given reversed.
    pub fn new(min_time: f64, max_time: f64) -> Self {
        let (min_time, max_time) = if max_time < min_time {
            (max_time, min_time)
        } else {
            (min_time, max_time)
        };
        Self {
            now: min_time,
            paused: false,
            scrubbing: false,
            min_time,
            max_time,
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Lower time bound.
    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    /// Upper time bound.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Whether time is frozen by pause.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether time is being set externally.
    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Advance by a frame delta. Returns the new time.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.paused || self.scrubbing || !dt.is_finite() {
            return self.now;
        }
        let t = self.now + dt;
        self.now = if self.max_time > 0.0 {
            (t % self.max_time).max(self.min_time)
        } else {
            t.max(self.min_time)
        };
        self.now
    }

    /// Set the time directly and hold it there until [`end_scrub`](Self::end_scrub).
    pub fn scrub_to(&mut self, t: f64) {
        if !t.is_finite() {
            return;
        }
        self.scrubbing = true;
        self.now = t.clamp(self.min_time, self.max_time);
    }

    /// Stop scrubbing. The clock pauses at the scrubbed time.
    pub fn end_scrub(&mut self) {
        if self.scrubbing {
            self.scrubbing = false;
            self.paused = true;
        }
    }

    /// Freeze time.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Let time run.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip between paused and running. Returns the new paused state.
    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        debug!(paused = self.paused, "clock toggled");
        self.paused
    }

    /// Back to `min_time`, running, not scrubbing.
    pub fn reset(&mut self) {
        self.now = self.min_time;
        self.paused = false;
        self.scrubbing = false;
    }
}
