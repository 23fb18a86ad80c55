//! Headless frame loop: the scene, camera, pointer and script live as
//! resources in one ECS world, and each frame runs the scheduler over it.
//!
//! Task order per frame is input, clock, camera, history. The camera runs
//! whether or not the clock is paused.

use bevy_ecs::prelude::*;
use orbitscope_camera::{CameraTransform, FrameController, FrameMode};
use orbitscope_config::Config;
use orbitscope_input::PointerState;
use orbitscope_scene::{FrameScheduler, FrameTime, Scene, TaskStatus};
use tracing::{debug, trace, warn};

use crate::script::{ClockCommand, FrameCommand, InputScript, PointerAction, ScriptAction};

/// Longest frame delta accepted. Longer frames are clamped.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Camera pose captured after the camera task ran.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSample {
    /// Frame the pose was computed on.
    pub frame: u64,
    /// Simulation time on that frame.
    pub time: f64,
    /// Frame mode the camera was in.
    pub mode: FrameMode,
    /// The computed pose.
    pub transform: CameraTransform,
}

/// The camera's frame controller.
#[derive(Resource, Debug)]
pub struct CameraRig(pub FrameController);

/// Window pointer state fed by the input script.
#[derive(Resource, Debug)]
pub struct Pointer(pub PointerState);

/// Every camera pose of the run, oldest first.
#[derive(Resource, Debug, Default)]
pub struct CameraLog(pub Vec<CameraSample>);

/// World plus the scheduler that steps it.
pub struct FrameLoop {
    world: World,
    scheduler: FrameScheduler,
}

impl FrameLoop {
    /// Insert the run's resources and register the standard tasks.
    pub fn new(scene: Scene, config: &Config, pointer: PointerState, script: InputScript) -> Self {
        let mut world = World::new();
        world.insert_resource(scene);
        world.insert_resource(CameraRig(FrameController::new(&config.camera)));
        world.insert_resource(Pointer(pointer));
        world.insert_resource(script);
        world.insert_resource(CameraLog::default());
        Self {
            world,
            scheduler: build_scheduler(),
        }
    }

    /// Run `frames` frames of `frame_dt` seconds each.
    pub fn run_frames(&mut self, frames: u64, frame_dt: f64) {
        let dt = if frame_dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_dt.max(0.0)
        };
        for _ in 0..frames {
            self.scheduler.run(&mut self.world, dt);
        }
    }

    /// The scene as of the last frame.
    pub fn scene(&self) -> &Scene {
        self.world.resource::<Scene>()
    }

    /// The camera controller.
    pub fn camera(&self) -> &FrameController {
        &self.world.resource::<CameraRig>().0
    }

    /// Poses recorded so far, one per frame.
    pub fn camera_log(&self) -> &[CameraSample] {
        &self.world.resource::<CameraLog>().0
    }

    /// Frames run so far.
    pub fn frame(&self) -> u64 {
        self.scheduler.frame()
    }

    /// The task list driving each frame.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}

/// Scheduler with the standard per-frame tasks.
pub fn build_scheduler() -> FrameScheduler {
    let mut scheduler = FrameScheduler::new();
    scheduler.add_task("input", input_system);
    scheduler.add_task("clock", clock_system);
    scheduler.add_task("camera", camera_system);
    scheduler.add_task("history", history_system);
    scheduler
}

fn input_system(
    time: Res<'_, FrameTime>,
    mut script: ResMut<'_, InputScript>,
    mut pointer: ResMut<'_, Pointer>,
    mut camera: ResMut<'_, CameraRig>,
    mut scene: ResMut<'_, Scene>,
) -> TaskStatus {
    for action in script.due(time.frame) {
        match action {
            ScriptAction::Pointer(action) => apply_pointer(&mut pointer.0, &mut camera.0, action),
            ScriptAction::Frame(command) => apply_frame(&mut camera.0, &scene, command),
            ScriptAction::Clock(command) => apply_clock(&mut scene, command),
        }
    }
    TaskStatus::Continue
}

fn clock_system(time: Res<'_, FrameTime>, mut scene: ResMut<'_, Scene>) -> TaskStatus {
    scene.clock_mut().advance(time.delta);
    TaskStatus::Continue
}

fn camera_system(
    time: Res<'_, FrameTime>,
    scene: Res<'_, Scene>,
    mut camera: ResMut<'_, CameraRig>,
    mut log: ResMut<'_, CameraLog>,
) -> TaskStatus {
    let transform = camera.0.update(time.delta, &*scene);
    log.0.push(CameraSample {
        frame: time.frame,
        time: scene.now(),
        mode: camera.0.mode(),
        transform,
    });
    TaskStatus::Continue
}

fn history_system(mut scene: ResMut<'_, Scene>) -> TaskStatus {
    scene.record_history();
    TaskStatus::Continue
}

fn apply_pointer(pointer: &mut PointerState, camera: &mut FrameController, action: PointerAction) {
    let event = match action {
        PointerAction::Alt(held) => {
            pointer.on_modifiers(held);
            None
        }
        PointerAction::MoveTo(p) => pointer.on_cursor_moved(p.x as f64, p.y as f64),
        PointerAction::Press | PointerAction::Release => action
            .button_state()
            .and_then(|(button, state)| pointer.on_button(button, state)),
    };
    if let Some(event) = event {
        trace!(?event, "pointer event");
        camera.handle_pointer(event);
    }
}

fn apply_frame(camera: &mut FrameController, scene: &Scene, command: FrameCommand) {
    match command {
        FrameCommand::Inertial => camera.enter_inertial(None),
        FrameCommand::Rotating(target) => {
            let distance = scene.view_distance_for(&target);
            camera.enter_body_fixed_rotating(target, distance);
        }
        FrameCommand::Follow(target) => {
            let distance = scene.view_distance_for(&target);
            camera.enter_body_fixed_follow(target, distance, None);
        }
        FrameCommand::LookAt {
            from,
            at,
            view_distance,
        } => {
            let distance = view_distance.or_else(|| scene.view_distance_for(&from));
            camera.enter_look_at(from, at, distance);
        }
    }
}

fn apply_clock(scene: &mut Scene, command: ClockCommand) {
    let clock = scene.clock_mut();
    match command {
        ClockCommand::Pause => clock.pause(),
        ClockCommand::Resume => clock.resume(),
        ClockCommand::Toggle => {
            clock.toggle();
        }
        ClockCommand::ScrubTo(t) => clock.scrub_to(t),
        ClockCommand::EndScrub => clock.end_scrub(),
        ClockCommand::Reset => clock.reset(),
    }
    debug!(?command, now = clock.now(), "clock command");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{EARTH, ISS, MOON, build_scene};
    use glam::{DQuat, DVec3, Vec2};
    use orbitscope_camera::{TargetId, TargetSource};

    const DT: f64 = 1.0 / 60.0;

    fn frame_loop(script: InputScript) -> FrameLoop {
        let config = Config::default();
        let scene = build_scene(&config, Vec::new()).unwrap();
        FrameLoop::new(scene, &config, PointerState::new(800.0, 600.0), script)
    }

    #[test]
    fn test_task_order() {
        let scheduler = build_scheduler();
        let names: Vec<&str> = scheduler.task_names().collect();
        assert_eq!(names, vec!["input", "clock", "camera", "history"]);
    }

    #[test]
    fn test_clock_starts_paused_by_default() {
        let mut run = frame_loop(InputScript::default());
        run.run_frames(10, DT);
        assert_eq!(run.scene().now(), 0.0);
        assert_eq!(run.camera_log().len(), 10);
        assert_eq!(run.frame(), 10);
        assert_eq!(run.camera_log()[9].frame, 9);
    }

    #[test]
    fn test_drag_rotates_while_paused() {
        let script = InputScript::new(InputScript::drag(
            2,
            Vec2::new(400.0, 300.0),
            Vec2::new(480.0, 300.0),
            8,
        ));
        let mut run = frame_loop(script);
        run.run_frames(12, DT);
        assert!(run.scene().clock().is_paused());
        let q = run.camera().orientation();
        assert!(!q.abs_diff_eq(DQuat::IDENTITY, 1e-6));
        // Released with recent motion, so it keeps turning.
        assert!(run.camera().rotation().inertia().is_some());
    }

    #[test]
    fn test_follow_tracks_moving_target() {
        let script = InputScript::new(vec![
            (0, ScriptAction::Clock(ClockCommand::Resume)),
            (0, ScriptAction::Frame(FrameCommand::Follow(TargetId::new(MOON)))),
        ]);
        let mut run = frame_loop(script);
        run.run_frames(30, DT);

        let moon = run.scene().world_position(&TargetId::new(MOON)).unwrap();
        let camera = run.camera().camera_transform();
        let d = run.camera().state().view_distance;
        assert!((camera.position.distance(moon) - d).abs() < 1e-9);
        assert!(run.scene().now() > 0.0);
    }

    #[test]
    fn test_rotating_frame_spins_with_earth() {
        let script = InputScript::new(vec![
            (0, ScriptAction::Clock(ClockCommand::Resume)),
            (0, ScriptAction::Frame(FrameCommand::Rotating(TargetId::new(EARTH)))),
        ]);
        let mut run = frame_loop(script);
        run.run_frames(60, DT);
        let spin = run
            .scene()
            .world_orientation(&TargetId::new(EARTH))
            .unwrap();
        let camera = run.camera().camera_transform();
        assert!(camera.orientation.abs_diff_eq(spin, 1e-9));
        assert!((camera.position.length() - run.camera().state().view_distance).abs() < 1e-9);
    }

    #[test]
    fn test_missing_target_keeps_pose() {
        let script = InputScript::new(vec![(
            3,
            ScriptAction::Frame(FrameCommand::Follow(TargetId::new("pluto"))),
        )]);
        let mut run = frame_loop(script);
        run.run_frames(6, DT);
        let before = run.camera_log()[2].transform;
        let after = run.camera_log()[5].transform;
        assert_eq!(before.position, after.position);
    }

    #[test]
    fn test_histories_fill() {
        let script = InputScript::new(vec![(0, ScriptAction::Clock(ClockCommand::Resume))]);
        let mut run = frame_loop(script);
        run.run_frames(20, DT);
        let iss = run.scene().body(&TargetId::new(ISS)).unwrap();
        assert_eq!(iss.trail().unwrap().len(), 20);
        assert!(!run.scene().ground_track_polylines(glam::Vec4::ONE).is_empty());
        assert_ne!(iss.trail().unwrap().latest(), Some(DVec3::ZERO));
    }

    #[test]
    fn test_long_frame_clamped() {
        let script = InputScript::new(vec![(0, ScriptAction::Clock(ClockCommand::Resume))]);
        let mut run = frame_loop(script);
        run.run_frames(2, 5.0);
        assert!((run.scene().now() - 2.0 * MAX_FRAME_TIME).abs() < 1e-9);
    }
}
