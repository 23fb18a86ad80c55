//! JSON snapshot of what a renderer would draw: full paths, trace windows,
//! trails, ground tracks, surface geodesics, delta-v and body-to-body arrows,
//! and the camera poses of the run.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use glam::Vec4;
use orbitscope_camera::FrameMode;
use orbitscope_scene::Scene;
use orbitscope_trajectory::PathPolyline;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::frame_loop::CameraSample;

/// Length of exported delta-v arrows per unit of delta-v.
const DELTA_V_ARROW_SCALE: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// One polyline vertex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportPoint {
    pub t: f64,
    pub position: [f64; 3],
    pub color: [f32; 4],
}

/// A named polyline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportPolyline {
    pub name: String,
    pub points: Vec<ExportPoint>,
}

impl ExportPolyline {
    fn new(name: impl Into<String>, line: &PathPolyline) -> Self {
        Self {
            name: name.into(),
            points: line
                .points()
                .iter()
                .map(|p| ExportPoint {
                    t: p.t,
                    position: p.position.to_array(),
                    color: p.color.to_array(),
                })
                .collect(),
        }
    }
}

/// A named arrow from `start` to `end`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportArrow {
    pub name: String,
    pub start: [f64; 3],
    pub end: [f64; 3],
}

/// One camera pose of the run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportCamera {
    pub frame: u64,
    pub time: f64,
    pub mode: &'static str,
    pub position: [f64; 3],
    /// `[x, y, z, w]`.
    pub orientation: [f64; 4],
}

impl From<&CameraSample> for ExportCamera {
    fn from(sample: &CameraSample) -> Self {
        Self {
            frame: sample.frame,
            time: sample.time,
            mode: mode_name(sample.mode),
            position: sample.transform.position.to_array(),
            orientation: sample.transform.orientation.to_array(),
        }
    }
}

fn mode_name(mode: FrameMode) -> &'static str {
    match mode {
        FrameMode::Inertial => "inertial",
        FrameMode::BodyFixedRotating => "body_fixed_rotating",
        FrameMode::BodyFixedFollow => "body_fixed_follow",
        FrameMode::LookAt => "look_at",
    }
}

/// Everything written to the export file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExportDocument {
    pub time: f64,
    pub paths: Vec<ExportPolyline>,
    pub traces: Vec<ExportPolyline>,
    pub trails: Vec<ExportPolyline>,
    pub ground_tracks: Vec<ExportPolyline>,
    pub geodesics: Vec<ExportPolyline>,
    pub delta_v: Vec<ExportArrow>,
    pub body_arrows: Vec<ExportArrow>,
    pub camera: Vec<ExportCamera>,
}

impl ExportDocument {
    /// Snapshot the scene at its current time.
    pub fn capture(scene: &Scene, camera: &[CameraSample], track_color: Vec4) -> Self {
        let now = scene.now();
        let mut doc = Self {
            time: now,
            camera: camera.iter().map(ExportCamera::from).collect(),
            ..Self::default()
        };

        for body in scene.bodies() {
            let Some(trajectory) = body.trajectory() else {
                continue;
            };
            let name = body.id().as_str();
            if let Some(path) = trajectory.path() {
                doc.paths.push(ExportPolyline::new(name, &path));
            }
            if let Some(trace) = trajectory.trace(trajectory.playback_time(now)) {
                doc.traces.push(ExportPolyline::new(name, &trace));
            }
            doc.delta_v.extend(
                trajectory
                    .delta_v_arrows(DELTA_V_ARROW_SCALE)
                    .into_iter()
                    .map(|(start, end)| ExportArrow {
                        name: name.to_string(),
                        start: start.to_array(),
                        end: end.to_array(),
                    }),
            );
        }

        doc.trails = scene
            .trail_polylines(track_color)
            .iter()
            .map(|(id, line)| ExportPolyline::new(id.as_str(), line))
            .collect();
        doc.ground_tracks = scene
            .ground_track_polylines(track_color)
            .iter()
            .map(|(id, line)| ExportPolyline::new(id.as_str(), line))
            .collect();
        doc.geodesics = scene
            .geodesic_polylines()
            .iter()
            .map(|(name, line)| ExportPolyline::new(name.as_str(), line))
            .collect();
        doc.body_arrows = scene
            .body_arrows()
            .into_iter()
            .map(|(name, start, end)| ExportArrow {
                name,
                start: start.to_array(),
                end: end.to_array(),
            })
            .collect();
        doc
    }

    /// Write as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!(
            path = %path.display(),
            paths = self.paths.len(),
            camera_samples = self.camera.len(),
            "export written"
        );
        Ok(())
    }
}
