//! Explicit object-to-parent-frame mapping.
//!
//! Each object has at most one parent frame. Objects without an entry live
//! in the world frame. Only frame transitions mutate the map, so an object
//! can never end up attached twice or to a stale parent.

use rustc_hash::FxHashMap;

use crate::target::TargetId;

/// The frame an object's pose is expressed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParentFrame {
    /// Inertial world frame.
    World,
    /// Moves and spins with the target.
    Rotating(TargetId),
    /// Moves with the target without inheriting its spin.
    Translating(TargetId),
}

impl ParentFrame {
    /// The target the frame follows, if any.
    pub fn target(&self) -> Option<&TargetId> {
        match self {
            ParentFrame::World => None,
            ParentFrame::Rotating(id) | ParentFrame::Translating(id) => Some(id),
        }
    }
}

/// Object id to current parent frame.
#[derive(Clone, Debug, Default)]
pub struct AttachmentMap {
    parents: FxHashMap<TargetId, ParentFrame>,
}

impl AttachmentMap {
    /// Empty map: every object in the world frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `object` to `frame`, replacing any previous parent. Attaching
    /// to [`ParentFrame::World`] removes the entry. Returns the old parent.
    pub fn attach(&mut self, object: TargetId, frame: ParentFrame) -> ParentFrame {
        let previous = match frame {
            ParentFrame::World => self.parents.remove(&object),
            frame => self.parents.insert(object, frame),
        };
        previous.unwrap_or(ParentFrame::World)
    }

    /// Return `object` to the world frame. Returns the old parent.
    pub fn detach(&mut self, object: &TargetId) -> ParentFrame {
        self.parents.remove(object).unwrap_or(ParentFrame::World)
    }

    /// Current parent of `object`.
    pub fn parent_of(&self, object: &TargetId) -> ParentFrame {
        self.parents
            .get(object)
            .cloned()
            .unwrap_or(ParentFrame::World)
    }

    /// Objects whose frame follows `target`.
    pub fn children_of<'a>(&'a self, target: &'a TargetId) -> impl Iterator<Item = &'a TargetId> + 'a {
        self.parents
            .iter()
            .filter(move |(_, frame)| frame.target() == Some(target))
            .map(|(object, _)| object)
    }

    /// Number of objects outside the world frame.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether every object is in the world frame.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> TargetId {
        TargetId::new(name)
    }

    #[test]
    fn test_unknown_object_is_in_world() {
        let map = AttachmentMap::new();
        assert_eq!(map.parent_of(&id("camera")), ParentFrame::World);
        assert!(map.is_empty());
    }

    #[test]
    fn test_attach_replaces_parent() {
        let mut map = AttachmentMap::new();
        let old = map.attach(id("camera"), ParentFrame::Rotating(id("earth")));
        assert_eq!(old, ParentFrame::World);
        let old = map.attach(id("camera"), ParentFrame::Translating(id("moon")));
        assert_eq!(old, ParentFrame::Rotating(id("earth")));
        assert_eq!(map.len(), 1);
        assert_eq!(map.children_of(&id("earth")).count(), 0);
        assert_eq!(map.children_of(&id("moon")).count(), 1);
    }

    #[test]
    fn test_detach_and_world_attach() {
        let mut map = AttachmentMap::new();
        map.attach(id("camera"), ParentFrame::Rotating(id("earth")));
        assert_eq!(map.detach(&id("camera")), ParentFrame::Rotating(id("earth")));
        assert_eq!(map.detach(&id("camera")), ParentFrame::World);

        map.attach(id("camera"), ParentFrame::Rotating(id("earth")));
        map.attach(id("camera"), ParentFrame::World);
        assert!(map.is_empty());
    }
}
