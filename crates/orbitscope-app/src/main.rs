//! `orbitscope`: loads trajectories into the demo scene and drives the camera
//! through a scripted run, optionally exporting what would be drawn.

use std::process::ExitCode;

use clap::Parser;
use glam::{Vec2, Vec4};
use orbitscope_app::demo::build_scene;
use orbitscope_app::export::ExportDocument;
use orbitscope_app::frame_loop::FrameLoop;
use orbitscope_app::script::InputScript;
use orbitscope_app::settings::load_trajectories;
use orbitscope_camera::TargetId;
use orbitscope_config::{CliArgs, Config, default_config_dir};
use orbitscope_input::PointerState;
use tracing::{error, info};

const WINDOW_SIZE: Vec2 = Vec2::new(1280.0, 720.0);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config.debug.log_dir.clone().unwrap_or_else(|| config_dir.join("logs"));
    orbitscope_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let loaded = load_trajectories(&args.trajectories, &config.trajectory);
    info!(
        requested = args.trajectories.len(),
        loaded = loaded.len(),
        "trajectories loaded"
    );

    let scene = match build_scene(&config, loaded) {
        Ok(scene) => scene,
        Err(e) => {
            error!(error = %e, "failed to build scene");
            return ExitCode::FAILURE;
        }
    };

    let pointer = PointerState::new(WINDOW_SIZE.x, WINDOW_SIZE.y);
    let script = match &args.focus {
        Some(target) => {
            if scene.body(&TargetId::new(target.as_str())).is_none() {
                error!(target = %target, "unknown focus body");
                return ExitCode::FAILURE;
            }
            InputScript::focus(TargetId::new(target.as_str()), args.rotating, WINDOW_SIZE)
        }
        None => InputScript::demo(WINDOW_SIZE),
    };
    let mut run = FrameLoop::new(scene, &config, pointer, script);
    run.run_frames(args.ticks, args.frame_dt);

    let final_pose = run.camera().camera_transform();
    info!(
        frames = run.frame(),
        time = run.scene().now(),
        mode = ?run.camera().mode(),
        position = ?final_pose.position,
        "run finished"
    );

    if let Some(path) = &args.export {
        let color = Vec4::from_array(config.trajectory.color);
        let doc = ExportDocument::capture(run.scene(), run.camera_log(), color);
        if let Err(e) = doc.write(path) {
            error!(error = %e, "export failed");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
