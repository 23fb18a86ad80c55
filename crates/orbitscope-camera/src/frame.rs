//! Reference-frame state machine placing the camera each frame.
//!
//! The camera sits `view_distance` behind its look point along its forward
//! axis. Every update recomputes the transform from live target poses, so
//! nothing drifts; only the drag orientation is integrated.

use glam::{DMat3, DQuat, DVec3};
use orbitscope_config::CameraConfig;
use orbitscope_input::PointerEvent;
use tracing::{debug, info, warn};

use crate::attachment::{AttachmentMap, ParentFrame};
use crate::rotation::{RotationController, RotationSettings};
use crate::target::{TargetId, TargetSource};

/// Object id the camera is registered under in the attachment map.
pub const CAMERA_ID: &str = "camera";

/// Which rule attaches the camera to the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Free orbit about the world origin.
    #[default]
    Inertial,
    /// Rigidly attached to a target's spinning frame.
    BodyFixedRotating,
    /// Moves with a target but keeps world axes.
    BodyFixedFollow,
    /// Follows a target while facing a second one.
    LookAt,
}

/// The active mode and its targets.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Active mode.
    pub mode: FrameMode,
    /// Target the camera is attached to. `None` only in inertial mode.
    pub attachment: Option<TargetId>,
    /// Target faced in look-at mode.
    pub look_at: Option<TargetId>,
    /// Distance from the look point.
    pub view_distance: f64,
}

/// Camera pose in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    /// World position.
    pub position: DVec3,
    /// World orientation; forward is `orientation * Y`.
    pub orientation: DQuat,
}

impl CameraTransform {
    /// Pose `distance` behind `center` along `orientation`'s forward axis.
    pub fn orbiting(center: DVec3, orientation: DQuat, distance: f64) -> Self {
        Self {
            position: center - (orientation * DVec3::Y) * distance,
            orientation,
        }
    }

    /// Forward direction.
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }

    /// Up direction.
    pub fn up(&self) -> DVec3 {
        self.orientation * DVec3::Z
    }
}

/// Orientation whose forward axis is `forward`, kept as upright as possible
/// against world Z. `None` for a zero direction.
pub fn look_rotation(forward: DVec3) -> Option<DQuat> {
    let forward = forward.try_normalize()?;
    let reference = if forward.cross(DVec3::Z).length_squared() < 1e-12 {
        DVec3::Y
    } else {
        DVec3::Z
    };
    let right = forward.cross(reference).normalize();
    let up = right.cross(forward);
    Some(DQuat::from_mat3(&DMat3::from_cols(right, forward, up)))
}

/// Owns the frame state, the drag/inertia rotation and the camera's
/// attachment.
#[derive(Clone, Debug)]
pub struct FrameController {
    state: FrameState,
    rotation: RotationController,
    attachments: AttachmentMap,
    default_view_distance: f64,
    transform: CameraTransform,
    target_missing: bool,
}

impl Default for FrameController {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl FrameController {
    /// Inertial mode at the configured default distance.
    pub fn new(config: &CameraConfig) -> Self {
        let view_distance = config.default_view_distance;
        Self {
            state: FrameState {
                mode: FrameMode::Inertial,
                attachment: None,
                look_at: None,
                view_distance,
            },
            rotation: RotationController::new(RotationSettings::from(config)),
            attachments: AttachmentMap::new(),
            default_view_distance: view_distance,
            transform: CameraTransform::orbiting(DVec3::ZERO, DQuat::IDENTITY, view_distance),
            target_missing: false,
        }
    }

    /// Active frame state.
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// Active mode.
    pub fn mode(&self) -> FrameMode {
        self.state.mode
    }

    /// Drag/inertia rotation.
    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    /// Free orientation accumulated from drags.
    pub fn orientation(&self) -> DQuat {
        self.rotation.orientation()
    }

    /// Camera parent frames.
    pub fn attachments(&self) -> &AttachmentMap {
        &self.attachments
    }

    /// Last computed camera pose.
    pub fn camera_transform(&self) -> CameraTransform {
        self.transform
    }

    /// Free orbit about the world origin.
    pub fn enter_inertial(&mut self, view_distance: Option<f64>) {
        self.transition(FrameMode::Inertial, None, None, view_distance);
    }

    /// Attach to `target`'s rotating frame.
    pub fn enter_body_fixed_rotating(&mut self, target: TargetId, view_distance: Option<f64>) {
        self.transition(FrameMode::BodyFixedRotating, Some(target), None, view_distance);
    }

    /// Follow `target` without its rotation, optionally facing `look_at`.
    pub fn enter_body_fixed_follow(
        &mut self,
        target: TargetId,
        view_distance: Option<f64>,
        look_at: Option<TargetId>,
    ) {
        let mode = if look_at.is_some() {
            FrameMode::LookAt
        } else {
            FrameMode::BodyFixedFollow
        };
        self.transition(mode, Some(target), look_at, view_distance);
    }

    /// Follow `target` while facing `look_at`.
    pub fn enter_look_at(&mut self, target: TargetId, look_at: TargetId, view_distance: Option<f64>) {
        self.transition(FrameMode::LookAt, Some(target), Some(look_at), view_distance);
    }

    fn transition(
        &mut self,
        mode: FrameMode,
        attachment: Option<TargetId>,
        look_at: Option<TargetId>,
        view_distance: Option<f64>,
    ) {
        // Stale drag state must not leak into the new frame.
        self.rotation.reset();

        let camera = TargetId::new(CAMERA_ID);
        self.attachments.detach(&camera);
        let parent = match (&attachment, mode) {
            (Some(target), FrameMode::BodyFixedRotating) => ParentFrame::Rotating(target.clone()),
            (Some(target), _) => ParentFrame::Translating(target.clone()),
            (None, _) => ParentFrame::World,
        };
        self.attachments.attach(camera, parent);

        let view_distance = view_distance
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.default_view_distance);
        info!(
            ?mode,
            attachment = attachment.as_ref().map(TargetId::as_str),
            look_at = look_at.as_ref().map(TargetId::as_str),
            view_distance,
            "camera frame changed"
        );
        self.state = FrameState {
            mode,
            attachment,
            look_at,
            view_distance,
        };
        self.target_missing = false;
    }

    /// Route a pointer event to the drag tracker.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::DragStart(pos) => self.rotation.on_drag_start(pos.as_dvec2()),
            PointerEvent::DragMove(pos) => self.rotation.on_drag_move(pos.as_dvec2()),
            PointerEvent::DragEnd => self.rotation.on_drag_end(),
            PointerEvent::StopInertia => self.rotation.stop_inertia(),
        }
    }

    /// Advance inertia by `dt` and recompute the camera pose from live
    /// target poses. If a target cannot be found the previous pose is kept.
    pub fn update(&mut self, dt: f64, targets: &dyn TargetSource) -> CameraTransform {
        self.rotation.update(dt);
        match self.compute(targets) {
            Some(transform) => {
                if self.target_missing {
                    debug!("camera target found again");
                }
                self.target_missing = false;
                self.transform = transform;
            }
            None => {
                if !self.target_missing {
                    warn!(
                        attachment = ?self.state.attachment,
                        look_at = ?self.state.look_at,
                        "camera target has no position, keeping previous transform"
                    );
                }
                self.target_missing = true;
            }
        }
        self.transform
    }

    fn compute(&self, targets: &dyn TargetSource) -> Option<CameraTransform> {
        let q = self.rotation.orientation();
        let d = self.state.view_distance;
        let attachment = self.state.attachment.as_ref();
        match self.state.mode {
            FrameMode::Inertial => Some(CameraTransform::orbiting(DVec3::ZERO, q, d)),
            FrameMode::BodyFixedFollow => {
                let center = targets.world_position(attachment?)?;
                Some(CameraTransform::orbiting(center, q, d))
            }
            FrameMode::BodyFixedRotating => {
                let id = attachment?;
                let center = targets.world_position(id)?;
                let frame = targets.world_orientation(id).unwrap_or(DQuat::IDENTITY);
                Some(CameraTransform::orbiting(center, (frame * q).normalize(), d))
            }
            FrameMode::LookAt => {
                let attach = targets.world_position(attachment?)?;
                let look_at = targets.world_position(self.state.look_at.as_ref()?)?;
                let direction = (attach - look_at).try_normalize().unwrap_or_else(|| {
                    debug!("look-at targets coincide, using default direction");
                    DVec3::NEG_Y
                });
                let orientation = look_rotation(-direction).unwrap_or(DQuat::IDENTITY);
                Some(CameraTransform {
                    position: look_at + direction * d,
                    orientation,
                })
            }
        }
    }
}
