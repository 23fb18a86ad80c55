//! Command-line argument parsing for Orbitscope.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{Config, SplineKind};

/// Interpolation mode as accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplineModeArg {
    /// Piecewise-linear.
    Linear,
    /// Cubic spline per axis.
    Cubic,
}

impl From<SplineModeArg> for SplineKind {
    fn from(arg: SplineModeArg) -> Self {
        match arg {
            SplineModeArg::Linear => SplineKind::Linear,
            SplineModeArg::Cubic => SplineKind::Cubic,
        }
    }
}

/// Orbitscope command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbitscope", about = "Orbit trajectory and camera-frame driver")]
pub struct CliArgs {
    /// Trajectory JSON files to load.
    pub trajectories: Vec<PathBuf>,

    /// Interpolation mode for discrete trajectories.
    #[arg(long, value_enum)]
    pub spline_mode: Option<SplineModeArg>,

    /// Segment count for drawn paths.
    #[arg(long)]
    pub segments: Option<usize>,

    /// Fixed time step for drawn paths.
    #[arg(long)]
    pub time_step: Option<f64>,

    /// Trace window length in simulation seconds.
    #[arg(long)]
    pub trace_dt: Option<f64>,

    /// Inertia friction (0 = no inertia, 1 = no decay).
    #[arg(long)]
    pub friction: Option<f64>,

    /// Drag sensitivity in degrees per logical unit.
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 600)]
    pub ticks: u64,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub frame_dt: f64,

    /// Body the camera follows from the first frame instead of the scripted tour.
    #[arg(long)]
    pub focus: Option<String>,

    /// With `--focus`, attach to the body's spinning frame.
    #[arg(long, requires = "focus")]
    pub rotating: bool,

    /// Write sampled paths and camera transforms as JSON to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(mode) = args.spline_mode {
            self.trajectory.spline_mode = mode.into();
        }
        if let Some(n) = args.segments {
            self.trajectory.num_segments = n;
        }
        if let Some(step) = args.time_step {
            self.trajectory.time_step = Some(step);
        }
        if let Some(dt) = args.trace_dt {
            self.trajectory.trace_dt = dt;
        }
        if let Some(friction) = args.friction {
            self.camera.friction = friction;
        }
        if let Some(s) = args.sensitivity {
            self.camera.sensitivity = s;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            spline_mode: Some(SplineModeArg::Linear),
            segments: Some(400),
            friction: Some(0.95),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.trajectory.spline_mode, SplineKind::Linear);
        assert_eq!(config.trajectory.num_segments, 400);
        assert!((config.camera.friction - 0.95).abs() < 1e-12);
        // Non-overridden fields retain defaults
        assert!((config.camera.sensitivity - 30.0).abs() < 1e-12);
        assert_eq!(config.trajectory.time_step, None);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_positional_trajectories() {
        let args = CliArgs::parse_from([
            "orbitscope",
            "halo.json",
            "transfer.json",
            "--spline-mode",
            "cubic",
            "--ticks",
            "10",
        ]);
        assert_eq!(args.trajectories.len(), 2);
        assert_eq!(args.spline_mode, Some(SplineModeArg::Cubic));
        assert_eq!(args.ticks, 10);
        assert_eq!(args.focus, None);
    }

    #[test]
    fn test_cli_focus_mode() {
        let args = CliArgs::parse_from(["orbitscope", "--focus", "moon", "--rotating"]);
        assert_eq!(args.focus.as_deref(), Some("moon"));
        assert!(args.rotating);
        assert!(CliArgs::try_parse_from(["orbitscope", "--rotating"]).is_err());
    }
}
