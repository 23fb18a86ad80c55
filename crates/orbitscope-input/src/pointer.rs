//! Pointer state tracker producing normalized drag events.
//!
//! [`PointerState`] consumes winit window events and turns an Alt+left-button
//! drag into [`PointerEvent`]s in a fixed logical range: `[-1, 1]` on both
//! axes, origin at the window center, y pointing up.

use glam::Vec2;
use tracing::trace;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Events handed to the camera's drag tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Alt+left press at a logical position.
    DragStart(Vec2),
    /// Pointer moved while dragging.
    DragMove(Vec2),
    /// Drag button released.
    DragEnd,
    /// Plain left press; halts any running inertia.
    StopInertia,
}

/// Window-relative pointer state.
///
/// # Usage
///
/// 1. Forward winit events via [`handle_window_event`](Self::handle_window_event)
///    or the `on_*` methods.
/// 2. Pass every returned [`PointerEvent`] to the camera controller.
#[derive(Debug, Clone)]
pub struct PointerState {
    window_size: Vec2,
    pixel_position: Vec2,
    position: Vec2,
    alt_held: bool,
    dragging: bool,
    left_pressed: bool,
    cursor_in_window: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl PointerState {
    /// Creates a tracker for a window of the given pixel size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            window_size: Vec2::new(width, height),
            pixel_position: Vec2::ZERO,
            position: Vec2::ZERO,
            alt_held: false,
            dragging: false,
            left_pressed: false,
            cursor_in_window: false,
        }
    }

    /// Map a pixel position (origin top-left, y down) into `[-1, 1]`, y up.
    ///
    /// Returns `None` while the window has no area.
    #[must_use]
    pub fn normalize(&self, pixel: Vec2) -> Option<Vec2> {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return None;
        }
        let x = 2.0 * pixel.x / self.window_size.x - 1.0;
        let y = 1.0 - 2.0 * pixel.y / self.window_size.y;
        Some(Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)))
    }

    /// Dispatch a winit window event. Events the tracker does not care
    /// about return `None`.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x, position.y)
            }
            WindowEvent::MouseInput { state, button, .. } => self.on_button(*button, *state),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.on_modifiers(modifiers.state().alt_key());
                None
            }
            WindowEvent::Resized(size) => {
                self.on_resized(size.width, size.height);
                None
            }
            WindowEvent::CursorEntered { .. } => {
                self.cursor_in_window = true;
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_in_window = false;
                None
            }
            WindowEvent::Focused(false) => self.on_focus_lost(),
            _ => None,
        }
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Process a `CursorMoved` event in physical pixels.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> Option<PointerEvent> {
        self.pixel_position = Vec2::new(x as f32, y as f32);
        self.position = self.normalize(self.pixel_position)?;
        self.dragging.then_some(PointerEvent::DragMove(self.position))
    }

    /// Process a `MouseInput` event. Only the left button is used.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.left_pressed = true;
                if self.alt_held {
                    self.dragging = true;
                    trace!(x = self.position.x, y = self.position.y, "drag start");
                    Some(PointerEvent::DragStart(self.position))
                } else {
                    Some(PointerEvent::StopInertia)
                }
            }
            ElementState::Released => {
                self.left_pressed = false;
                self.end_drag()
            }
        }
    }

    /// Process a `ModifiersChanged` event (Alt, or Option on macOS).
    pub fn on_modifiers(&mut self, alt: bool) {
        self.alt_held = alt;
    }

    /// Process a `Resized` event. The logical position is recomputed for the
    /// new size.
    pub fn on_resized(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width as f32, height as f32);
        if let Some(position) = self.normalize(self.pixel_position) {
            self.position = position;
        }
    }

    /// Losing focus mid-drag ends the drag; the release will never arrive.
    pub fn on_focus_lost(&mut self) -> Option<PointerEvent> {
        self.left_pressed = false;
        self.alt_held = false;
        self.end_drag()
    }

    fn end_drag(&mut self) -> Option<PointerEvent> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        trace!("drag end");
        Some(PointerEvent::DragEnd)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Current pointer position in logical coordinates.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the left button is held.
    #[must_use]
    pub fn is_left_pressed(&self) -> bool {
        self.left_pressed
    }

    /// Whether Alt is held.
    #[must_use]
    pub fn is_alt_held(&self) -> bool {
        self.alt_held
    }

    /// Whether the cursor is inside the window.
    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PointerState {
        PointerState::new(800.0, 600.0)
    }

    #[test]
    fn test_normalize_corners_and_center() {
        let ps = state();
        assert_eq!(ps.normalize(Vec2::new(400.0, 300.0)), Some(Vec2::ZERO));
        assert_eq!(ps.normalize(Vec2::ZERO), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(ps.normalize(Vec2::new(800.0, 600.0)), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn test_zero_size_window_ignored() {
        let mut ps = PointerState::new(0.0, 0.0);
        assert_eq!(ps.on_cursor_moved(10.0, 10.0), None);
        assert_eq!(ps.position(), Vec2::ZERO);
    }

    #[test]
    fn test_plain_press_stops_inertia() {
        let mut ps = state();
        assert_eq!(
            ps.on_button(MouseButton::Left, ElementState::Pressed),
            Some(PointerEvent::StopInertia)
        );
        assert!(!ps.is_dragging());
        assert_eq!(ps.on_button(MouseButton::Left, ElementState::Released), None);
    }

    #[test]
    fn test_alt_drag_sequence() {
        let mut ps = state();
        ps.on_cursor_moved(400.0, 300.0);
        ps.on_modifiers(true);
        assert_eq!(
            ps.on_button(MouseButton::Left, ElementState::Pressed),
            Some(PointerEvent::DragStart(Vec2::ZERO))
        );
        assert!(ps.is_dragging());

        let moved = ps.on_cursor_moved(440.0, 300.0);
        match moved {
            Some(PointerEvent::DragMove(p)) => {
                assert!((p.x - 0.1).abs() < 1e-6);
                assert!(p.y.abs() < 1e-6);
            }
            other => panic!("expected DragMove, got {other:?}"),
        }

        assert_eq!(
            ps.on_button(MouseButton::Left, ElementState::Released),
            Some(PointerEvent::DragEnd)
        );
        assert!(!ps.is_dragging());
    }

    #[test]
    fn test_moves_without_drag_are_silent() {
        let mut ps = state();
        assert_eq!(ps.on_cursor_moved(100.0, 100.0), None);
        assert!((ps.position().x - -0.75).abs() < 1e-6);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut ps = state();
        ps.on_modifiers(true);
        assert_eq!(ps.on_button(MouseButton::Right, ElementState::Pressed), None);
        assert!(!ps.is_dragging());
    }

    #[test]
    fn test_focus_loss_ends_drag() {
        let mut ps = state();
        ps.on_modifiers(true);
        ps.on_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(ps.on_focus_lost(), Some(PointerEvent::DragEnd));
        assert_eq!(ps.on_focus_lost(), None);
        assert!(!ps.is_alt_held());
    }

    #[test]
    fn test_resize_renormalizes_position() {
        let mut ps = state();
        ps.on_cursor_moved(400.0, 300.0);
        ps.on_resized(1600, 600);
        assert!((ps.position().x - -0.5).abs() < 1e-6);
    }
}
