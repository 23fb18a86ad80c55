//! Scene objects the camera can attach to, and where to find them.

use std::fmt;

use glam::{DQuat, DVec3};

/// Name of an attachment or look-at target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(String);

impl TargetId {
    /// Wrap a target name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Live world poses of scene objects, queried fresh every frame.
pub trait TargetSource {
    /// World position of `id`, or `None` if no such object exists.
    fn world_position(&self, id: &TargetId) -> Option<DVec3>;

    /// Orientation of `id`'s body-fixed frame. Objects without their own
    /// spin report identity.
    fn world_orientation(&self, id: &TargetId) -> Option<DQuat> {
        self.world_position(id).map(|_| DQuat::IDENTITY)
    }
}
