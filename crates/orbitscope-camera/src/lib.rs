//! Camera reference frames and drag-to-rotate with inertia.
//!
//! Conventions: the world is Z-up. A camera orientation `q` has right
//! `q * X`, forward `q * Y` and up `q * Z`. Drag angles are degrees.

pub mod attachment;
pub mod frame;
pub mod rotation;
pub mod target;

pub use attachment::{AttachmentMap, ParentFrame};
pub use frame::{CameraTransform, FrameController, FrameMode, FrameState};
pub use rotation::{DragSession, InertiaState, RotationController, RotationSettings};
pub use target::{TargetId, TargetSource};
