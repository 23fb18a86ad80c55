//! Config values turned into trajectory-engine types, and trajectory loading.

use std::path::{Path, PathBuf};

use glam::Vec4;
use orbitscope_config::{BoundaryKind, SplineKind, TrajectoryConfig};
use orbitscope_trajectory::{
    Resolution, SplineBoundary, SplineMode, Trajectory, TrajectoryError, TrajectorySpec,
    TrajectoryStyle,
};
use tracing::{info, warn};

/// Interpolation mode selected by the config.
pub fn spline_mode(config: &TrajectoryConfig) -> SplineMode {
    match config.spline_mode {
        SplineKind::Linear => SplineMode::Linear,
        SplineKind::Cubic => SplineMode::Cubic(match config.cubic_boundary {
            BoundaryKind::NotAKnot => SplineBoundary::NotAKnot,
            BoundaryKind::Natural => SplineBoundary::Natural,
        }),
    }
}

/// A fixed time step, when set, wins over the segment count.
pub fn path_resolution(config: &TrajectoryConfig) -> Resolution {
    match config.time_step {
        Some(step) => Resolution::TimeStep(step),
        None => Resolution::Segments(config.num_segments),
    }
}

pub fn trajectory_style(config: &TrajectoryConfig) -> TrajectoryStyle {
    TrajectoryStyle {
        color: Vec4::from_array(config.color),
        resolution: path_resolution(config),
        trace_dt: config.trace_dt,
        trace_samples: config.trace_samples,
    }
}

/// A trajectory read from disk, named after its file stem.
#[derive(Clone, Debug)]
pub struct LoadedTrajectory {
    pub name: String,
    pub path: PathBuf,
    pub trajectory: Trajectory,
}

/// Load and fit one trajectory file.
pub fn load_trajectory(
    path: &Path,
    config: &TrajectoryConfig,
) -> Result<LoadedTrajectory, TrajectoryError> {
    let spec = TrajectorySpec::from_path(path)?;
    let trajectory = Trajectory::new(spec, spline_mode(config), trajectory_style(config))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(LoadedTrajectory {
        name,
        path: path.to_path_buf(),
        trajectory,
    })
}

/// Load every file independently. A file that fails is reported and skipped;
/// the rest still load.
pub fn load_trajectories(paths: &[PathBuf], config: &TrajectoryConfig) -> Vec<LoadedTrajectory> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        match load_trajectory(path, config) {
            Ok(t) => {
                let samples = t.trajectory.spec().as_discrete().map_or(0, |d| d.len());
                info!(name = %t.name, samples, "trajectory ready");
                loaded.push(t);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping trajectory"),
        }
    }
    loaded
}
