//! Configuration system for Orbitscope.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, SplineModeArg};
pub use config::{
    BoundaryKind, CONFIG_FILE_NAME, CameraConfig, ClockConfig, Config, DebugConfig, SplineKind,
    TrajectoryConfig, default_config_dir,
};
pub use error::ConfigError;
