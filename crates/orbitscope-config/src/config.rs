//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Trajectory interpolation, path sampling, and trace settings.
    pub trajectory: TrajectoryConfig,
    /// Drag-to-rotate and inertia settings.
    pub camera: CameraConfig,
    /// Simulation clock range and start state.
    pub clock: ClockConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Interpolation mode requested for discrete trajectories.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SplineKind {
    /// Piecewise-linear blending between samples.
    Linear,
    /// One cubic spline per axis.
    #[default]
    Cubic,
}

/// Boundary condition for non-looping cubic splines.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Third derivative continuous across the first and last interior knots.
    #[default]
    NotAKnot,
    /// Zero second derivative at both ends.
    Natural,
}

/// Trajectory configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Interpolation mode for discrete trajectories.
    pub spline_mode: SplineKind,
    /// Boundary condition used when a cubic trajectory does not loop.
    pub cubic_boundary: BoundaryKind,
    /// Segment count for drawn paths when no time step is set.
    pub num_segments: usize,
    /// Fixed time step for drawn paths. Takes precedence over `num_segments`.
    pub time_step: Option<f64>,
    /// Length of the fading trace window in simulation seconds.
    pub trace_dt: f64,
    /// Number of points in each trace window.
    pub trace_samples: usize,
    /// Nominal RGBA path color.
    pub color: [f32; 4],
    /// Number of positions kept in point-history traces.
    pub history_length: usize,
}

/// Camera drag and inertia configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees of rotation per logical pointer unit.
    pub sensitivity: f64,
    /// Per-tick inertia decay factor (1.0 = no decay, 0.0 = instant stop).
    pub friction: f64,
    /// Inertia ends once angular speed (deg/s) falls below this.
    pub inertia_stop_speed: f64,
    /// Release speed (deg/s) required to start inertia.
    pub inertia_min_start_speed: f64,
    /// Maximum seconds between the last pointer move and release for inertia to start.
    pub inertia_recency_s: f64,
    /// Pointer movement (logical units) that marks a drag as active.
    pub drag_threshold: f64,
    /// Frame deltas at or below this are too short to estimate speed from.
    pub min_frame_dt: f64,
    /// Camera distance used in the free inertial frame.
    pub default_view_distance: f64,
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Lower bound of simulation time.
    pub min_time: f64,
    /// Simulation time wraps back to `min_time` at this value.
    pub max_time: f64,
    /// Whether the clock starts paused.
    pub start_paused: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            spline_mode: SplineKind::Cubic,
            cubic_boundary: BoundaryKind::NotAKnot,
            num_segments: 100,
            time_step: None,
            trace_dt: 2.0,
            trace_samples: 50,
            color: [1.0, 1.0, 0.0, 1.0],
            history_length: 200,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 30.0,
            friction: 1.0,
            inertia_stop_speed: 1.0,
            inertia_min_start_speed: 0.5,
            inertia_recency_s: 0.12,
            drag_threshold: 0.002,
            min_frame_dt: 0.001,
            default_view_distance: 10.0,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_time: 0.0,
            max_time: 100.0,
            start_paused: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl CameraConfig {
    /// Friction folded into `[0, 1]` by absolute value.
    pub fn clamped_friction(&self) -> f64 {
        self.friction.abs().min(1.0)
    }
}

/// Platform config directory for Orbitscope (`<config_dir>/orbitscope`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|d| d.join("orbitscope"))
        .ok_or(ConfigError::NoConfigDir)
}

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first
    /// if it does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            let config = read_config(&path)?;
            log::info!("Loaded config from {}", path.display());
            return Ok(config);
        }
        let config = Config::default();
        config.save(config_dir)?;
        log::info!("Created default config at {}", path.display());
        Ok(config)
    }

    /// Write `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, serialized).map_err(write_err)
    }

    /// Re-read the file. `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE_NAME))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(fresh))
    }
}
