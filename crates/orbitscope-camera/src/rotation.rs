//! Drag-to-rotate with post-release inertia.
//!
//! A drag move of `(dx, dy)` logical units turns into `heading = dx * S` and
//! `pitch = -dy * S` degrees about the camera's current up and right axes.
//! The combined rotation is left-multiplied onto the orientation. On
//! release, a fast and recent drag keeps spinning about the last axis, its
//! speed multiplied by the friction factor every frame until it drops below
//! the stop threshold.

use glam::{DQuat, DVec2, DVec3};
use orbitscope_config::CameraConfig;
use tracing::{debug, trace};

/// Tuning for drag and inertia. Angles in degrees, times in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationSettings {
    /// Degrees of rotation per logical pointer unit.
    pub sensitivity: f64,
    /// Per-frame speed multiplier in `[0, 1]`. `1` never decays.
    pub friction: f64,
    /// Inertia ends below this speed (deg/s).
    pub stop_speed: f64,
    /// Inertia starts only above this speed (deg/s).
    pub min_start_speed: f64,
    /// Inertia starts only if the last real move is this recent.
    pub recency: f64,
    /// Per-axis movement that counts as an actual drag.
    pub drag_threshold: f64,
    /// Frame times at or below this are too short to estimate a speed.
    pub min_frame_dt: f64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for RotationSettings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            friction: config.clamped_friction(),
            stop_speed: config.inertia_stop_speed,
            min_start_speed: config.inertia_min_start_speed,
            recency: config.inertia_recency_s,
            drag_threshold: config.drag_threshold,
            min_frame_dt: config.min_frame_dt,
        }
    }
}

/// An open drag, from press to release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    /// Orientation when the drag began.
    pub anchor_orientation: DQuat,
    /// Pointer position at the previous move.
    pub last_pointer_pos: DVec2,
    /// Whether any move exceeded the drag threshold.
    pub dragged: bool,
    /// Controller time of the last move past the threshold.
    pub last_move_time: f64,
    /// Orientation before the most recent move.
    pub previous_orientation: Option<DQuat>,
    /// Most recent rotation axis (unit).
    pub axis: DVec3,
    /// Most recent speed estimate (deg/s).
    pub angular_speed: f64,
}

/// Post-release spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaState {
    /// Unit rotation axis in world coordinates.
    pub axis: DVec3,
    /// Current speed (deg/s).
    pub angular_speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Idle,
    Dragging(DragSession),
    Coasting(InertiaState),
}

/// Owns the free orientation and at most one of a drag or an inertia spin.
#[derive(Clone, Debug)]
pub struct RotationController {
    settings: RotationSettings,
    orientation: DQuat,
    motion: Motion,
    elapsed: f64,
    last_dt: f64,
}

impl Default for RotationController {
    fn default() -> Self {
        Self::new(RotationSettings::default())
    }
}

/// Rotate `orientation` by `angle_deg` about a world `axis`. Zero angles and
/// degenerate axes leave it unchanged.
fn rotate(orientation: DQuat, axis: DVec3, angle_deg: f64) -> DQuat {
    if angle_deg == 0.0 {
        return orientation;
    }
    match axis.try_normalize() {
        Some(axis) => (DQuat::from_axis_angle(axis, angle_deg.to_radians()) * orientation).normalize(),
        None => orientation,
    }
}

impl RotationController {
    /// Identity orientation, idle.
    pub fn new(settings: RotationSettings) -> Self {
        Self {
            settings,
            orientation: DQuat::IDENTITY,
            motion: Motion::Idle,
            elapsed: 0.0,
            last_dt: 0.0,
        }
    }

    /// Current orientation.
    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// Tuning in use.
    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// Open drag, if any.
    pub fn drag(&self) -> Option<&DragSession> {
        match &self.motion {
            Motion::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Running inertia, if any.
    pub fn inertia(&self) -> Option<&InertiaState> {
        match &self.motion {
            Motion::Coasting(state) => Some(state),
            _ => None,
        }
    }

    /// Whether a drag is open.
    pub fn is_dragging(&self) -> bool {
        self.drag().is_some()
    }

    /// Drop any drag or inertia and return to identity.
    pub fn reset(&mut self) {
        self.orientation = DQuat::IDENTITY;
        self.motion = Motion::Idle;
    }

    /// Halt a running inertia spin. An open drag is left alone.
    pub fn stop_inertia(&mut self) {
        if let Motion::Coasting(_) = self.motion {
            debug!("inertia stopped");
            self.motion = Motion::Idle;
        }
    }

    /// Begin a drag. Cancels inertia.
    pub fn on_drag_start(&mut self, pointer_pos: DVec2) {
        self.motion = Motion::Dragging(DragSession {
            anchor_orientation: self.orientation,
            last_pointer_pos: pointer_pos,
            dragged: false,
            last_move_time: self.elapsed,
            previous_orientation: None,
            axis: DVec3::ZERO,
            angular_speed: 0.0,
        });
    }

    /// Rotate by the pointer movement since the previous sample. Ignored
    /// without an open drag.
    pub fn on_drag_move(&mut self, pointer_pos: DVec2) {
        let Motion::Dragging(session) = &mut self.motion else {
            return;
        };
        let delta = pointer_pos - session.last_pointer_pos;
        session.last_pointer_pos = pointer_pos;
        if delta.x.abs() > self.settings.drag_threshold || delta.y.abs() > self.settings.drag_threshold {
            session.dragged = true;
            session.last_move_time = self.elapsed;
        }

        let heading = delta.x * self.settings.sensitivity;
        let pitch = -delta.y * self.settings.sensitivity;
        let right = self.orientation * DVec3::X;
        let up = self.orientation * DVec3::Z;
        let axis = right * pitch + up * heading;
        let angle = axis.length();
        if angle == 0.0 {
            return;
        }

        session.previous_orientation = Some(self.orientation);
        self.orientation = rotate(self.orientation, axis, angle);
        if self.last_dt > self.settings.min_frame_dt {
            session.axis = axis / angle;
            session.angular_speed = angle / self.last_dt;
        }
        trace!(heading, pitch, "drag move");
    }

    /// Close the drag and start inertia if the release was fast and recent.
    pub fn on_drag_end(&mut self) {
        let Motion::Dragging(mut session) = self.motion else {
            return;
        };
        self.motion = Motion::Idle;

        if let Some(previous) = session.previous_orientation
            && self.last_dt > self.settings.min_frame_dt
        {
            let (axis, angle) = relative_axis_angle(previous, self.orientation);
            if angle > 0.0 {
                session.axis = axis;
                session.angular_speed = angle / self.last_dt;
            }
        }

        let since_move = self.elapsed - session.last_move_time;
        if session.dragged
            && since_move < self.settings.recency
            && session.angular_speed > self.settings.min_start_speed
        {
            debug!(speed = session.angular_speed, "inertia started");
            self.motion = Motion::Coasting(InertiaState {
                axis: session.axis,
                angular_speed: session.angular_speed,
            });
        }
    }

    /// Advance one frame of `dt` seconds, applying any inertia spin.
    pub fn update(&mut self, dt: f64) {
        self.elapsed += dt;
        self.last_dt = dt;

        let Motion::Coasting(state) = &mut self.motion else {
            return;
        };
        let angle = state.angular_speed * dt;
        if angle > 0.0 {
            self.orientation = rotate(self.orientation, state.axis, angle);
        }
        state.angular_speed *= self.settings.friction;
        if state.angular_speed < self.settings.stop_speed {
            debug!("inertia decayed");
            self.motion = Motion::Idle;
        }
    }
}

/// Axis and angle (degrees, in `[0, 180]`) of the rotation taking `from` to `to`.
fn relative_axis_angle(from: DQuat, to: DQuat) -> (DVec3, f64) {
    let relative = to * from.conjugate();
    // Shortest arc: q and -q are the same rotation.
    let relative = if relative.w < 0.0 { -relative } else { relative };
    let (axis, angle) = relative.to_axis_angle();
    (axis, angle.to_degrees())
}
