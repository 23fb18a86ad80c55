//! Trajectory engine: turns time-stamped orbit samples (or analytic orbit
//! parameters) into a continuous function of time, and samples it into
//! display polylines and fading trace windows. Also draws great-circle
//! paths over a body's surface.

pub mod error;
pub mod geodesic;
pub mod history;
pub mod interpolant;
pub mod loader;
pub mod provider;
pub mod rotation;
pub mod sampler;
pub mod spec;
pub mod spline;
pub mod trace;
pub mod trajectory;

pub use error::TrajectoryError;
pub use geodesic::{GeoPoint, GeodesicPath, great_circle_arc};
pub use history::{GroundTrack, TraceHistory};
pub use interpolant::{Interpolant, SplineMode};
pub use provider::{PositionProvider, SurfaceSite};
pub use rotation::BodyRotation;
pub use sampler::{PathPoint, PathPolyline, Resolution, sample_path};
pub use spec::{
    AnalyticOrbit, DeltaVAnnotations, DiscreteTrajectory, Rgba, TrajectoryOptions,
    TrajectorySample, TrajectorySpec,
};
pub use spline::{CubicSpline, SplineBoundary};
pub use trace::{DEFAULT_TRACE_SAMPLES, trace_window};
pub use trajectory::{Trajectory, TrajectoryStyle};
