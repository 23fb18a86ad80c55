//! Arrows between bodies, recomputed from where the bodies are each frame.

use glam::DVec3;
use orbitscope_camera::TargetId;

/// Default overshoot past the target, in target radii.
pub const DEFAULT_ARROW_EXTENSION: f64 = 1.5;

/// Arrow from `from` through `to`, ending `extension` radii of `to` beyond
/// its center. Pointed at a planet from its moon, the tip marks the
/// antipode of the sub-moon point.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyArrow {
    /// Label for the drawn arrow.
    pub name: String,
    /// Body the arrow starts at.
    pub from: TargetId,
    /// Body the arrow points through.
    pub to: TargetId,
    /// Overshoot past `to`'s center, in radii of `to`.
    pub extension: f64,
}

impl BodyArrow {
    /// Arrow with the default extension.
    pub fn new(name: impl Into<String>, from: impl Into<TargetId>, to: impl Into<TargetId>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            extension: DEFAULT_ARROW_EXTENSION,
        }
    }

    /// Override the overshoot.
    pub fn with_extension(mut self, extension: f64) -> Self {
        self.extension = extension;
        self
    }

    /// `(start, end)` for bodies at `from` and `to`, where the target has
    /// radius `to_radius`. `None` when the bodies coincide.
    pub fn endpoints(&self, from: DVec3, to: DVec3, to_radius: f64) -> Option<(DVec3, DVec3)> {
        let offset = to - from;
        let direction = offset.try_normalize()?;
        let length = offset.length() + to_radius * self.extension;
        Some((from, from + direction * length))
    }
}
