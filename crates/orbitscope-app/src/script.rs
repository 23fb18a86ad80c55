//! Scripted input for headless runs: pointer gestures, camera frame switches
//! and clock commands keyed to frame numbers.

use bevy_ecs::prelude::*;
use glam::Vec2;
use orbitscope_camera::TargetId;
use winit::event::{ElementState, MouseButton};

use crate::demo::{EARTH, ISS, MARS, MOON, VENUS, VENUS_RADIUS};

/// Raw pointer input in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerAction {
    /// Alt held or released.
    Alt(bool),
    /// Cursor moved to a pixel position.
    MoveTo(Vec2),
    /// Left button down.
    Press,
    /// Left button up.
    Release,
}

impl PointerAction {
    /// The winit button state for press/release actions.
    pub fn button_state(self) -> Option<(MouseButton, ElementState)> {
        match self {
            PointerAction::Press => Some((MouseButton::Left, ElementState::Pressed)),
            PointerAction::Release => Some((MouseButton::Left, ElementState::Released)),
            _ => None,
        }
    }
}

/// Camera frame switch.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameCommand {
    /// Free orbit about the origin.
    Inertial,
    /// Ride a body's spinning frame.
    Rotating(TargetId),
    /// Follow a body without its spin.
    Follow(TargetId),
    /// Follow `from` while facing `at`. Without a distance, `from`'s default
    /// view distance is used.
    LookAt {
        from: TargetId,
        at: TargetId,
        view_distance: Option<f64>,
    },
}

/// Playback control, mirroring the clock's methods.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockCommand {
    Pause,
    Resume,
    Toggle,
    ScrubTo(f64),
    EndScrub,
    Reset,
}

/// One scripted step.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptAction {
    Pointer(PointerAction),
    Frame(FrameCommand),
    Clock(ClockCommand),
}

/// Actions ordered by the frame they fire on.
#[derive(Resource, Clone, Debug, Default)]
pub struct InputScript {
    steps: Vec<(u64, ScriptAction)>,
    cursor: usize,
}

impl InputScript {
    /// Steps are sorted by frame; steps on the same frame keep their order.
    pub fn new(mut steps: Vec<(u64, ScriptAction)>) -> Self {
        steps.sort_by_key(|(frame, _)| *frame);
        Self { steps, cursor: 0 }
    }

    /// Take every not-yet-fired action scheduled at or before `frame`.
    pub fn due(&mut self, frame: u64) -> Vec<ScriptAction> {
        let start = self.cursor;
        while self
            .steps
            .get(self.cursor)
            .is_some_and(|(at, _)| *at <= frame)
        {
            self.cursor += 1;
        }
        self.steps[start..self.cursor]
            .iter()
            .map(|(_, action)| action.clone())
            .collect()
    }

    /// Actions not yet fired.
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    /// Alt-drag from `from` to `to` (pixels) over `moves` frames starting at
    /// `frame`, released on the frame after the last move.
    pub fn drag(frame: u64, from: Vec2, to: Vec2, moves: u64) -> Vec<(u64, ScriptAction)> {
        let moves = moves.max(1);
        let mut steps = vec![
            (frame, ScriptAction::Pointer(PointerAction::MoveTo(from))),
            (frame, ScriptAction::Pointer(PointerAction::Alt(true))),
            (frame, ScriptAction::Pointer(PointerAction::Press)),
        ];
        for i in 1..=moves {
            let p = from.lerp(to, i as f32 / moves as f32);
            steps.push((frame + i, ScriptAction::Pointer(PointerAction::MoveTo(p))));
        }
        steps.push((frame + moves + 1, ScriptAction::Pointer(PointerAction::Release)));
        steps.push((frame + moves + 1, ScriptAction::Pointer(PointerAction::Alt(false))));
        steps
    }

    /// Run with the clock going and the camera attached to `target` from the
    /// first frame, plus one drag so the orbit around it is exercised.
    pub fn focus(target: TargetId, rotating: bool, window: Vec2) -> Self {
        let center = window * 0.5;
        let command = if rotating {
            FrameCommand::Rotating(target)
        } else {
            FrameCommand::Follow(target)
        };
        let mut steps = vec![
            (0, ScriptAction::Clock(ClockCommand::Resume)),
            (0, ScriptAction::Frame(command)),
        ];
        steps.extend(Self::drag(
            30,
            center,
            center + Vec2::new(window.x * 0.1, 0.0),
            12,
        ));
        Self::new(steps)
    }

    /// A tour through every frame mode with drags and inertia along the way.
    pub fn demo(window: Vec2) -> Self {
        let center = window * 0.5;
        let right = center + Vec2::new(window.x * 0.1, 0.0);
        let up = center - Vec2::new(0.0, window.y * 0.1);
        let frame = |at: u64, cmd: FrameCommand| (at, ScriptAction::Frame(cmd));

        let mut steps = vec![(0, ScriptAction::Clock(ClockCommand::Resume))];
        // Coasts after release, then a plain click stops it.
        steps.extend(Self::drag(30, center, right, 12));
        steps.push((90, ScriptAction::Pointer(PointerAction::Press)));
        steps.push((91, ScriptAction::Pointer(PointerAction::Release)));

        steps.push(frame(120, FrameCommand::Rotating(TargetId::new(EARTH))));
        steps.extend(Self::drag(150, center, up, 10));
        steps.push(frame(240, FrameCommand::Follow(TargetId::new(MOON))));
        steps.push(frame(300, FrameCommand::Follow(TargetId::new(ISS))));
        steps.push(frame(
            360,
            FrameCommand::LookAt {
                from: TargetId::new(VENUS),
                at: TargetId::new(MARS),
                view_distance: Some(VENUS_RADIUS),
            },
        ));
        steps.push((420, ScriptAction::Clock(ClockCommand::ScrubTo(50.0))));
        steps.push((450, ScriptAction::Clock(ClockCommand::EndScrub)));
        steps.push((480, ScriptAction::Clock(ClockCommand::Resume)));
        steps.push(frame(540, FrameCommand::Inertial));
        Self::new(steps)
    }
}
