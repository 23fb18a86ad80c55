//! Simulation clock, per-frame task scheduling, the body registry and the
//! overlays drawn between bodies.

pub mod clock;
pub mod overlay;
pub mod scene;
pub mod schedule;

pub use clock::SimulationClock;
pub use overlay::{BodyArrow, DEFAULT_ARROW_EXTENSION};
pub use scene::{Body, Scene, SceneError};
pub use schedule::{FrameScheduler, FrameTime, TaskStatus};
