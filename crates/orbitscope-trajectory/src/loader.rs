//! JSON trajectory documents.
//!
//! Two layouts are accepted. The canonical one carries equal-length `x`, `y`,
//! `z`, `t` arrays with optional `colors`, delta-v annotations and `options`.
//! The legacy one carries a `segs` list of `{et, x_inertial, y_inertial,
//! z_inertial}` segments which are stitched into a single trajectory.

use std::path::Path;

use glam::{DVec3, Vec4};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::TrajectoryError;
use crate::spec::{
    DeltaVAnnotations, DiscreteTrajectory, TrajectoryOptions, TrajectorySample, TrajectorySpec,
};

/// Time range legacy segment data is rescaled into.
pub const LEGACY_TIME_SPAN: f64 = 100.0;

/// Divisor applied to legacy positions.
pub const LEGACY_POSITION_SCALE: f64 = 1000.0;

/// Samples dropped from the end of each legacy segment, where it overlaps
/// the start of the next one.
const LEGACY_SEGMENT_OVERLAP: usize = 2;

#[derive(Debug, Default, Deserialize)]
struct RawTrajectory {
    x: Option<Vec<f64>>,
    y: Option<Vec<f64>>,
    z: Option<Vec<f64>>,
    t: Option<Vec<f64>>,
    colors: Option<Vec<Vec<f32>>>,
    dvx: Option<Vec<f64>>,
    dvy: Option<Vec<f64>>,
    dvz: Option<Vec<f64>>,
    dv0: Option<Vec<f64>>,
    dvf: Option<Vec<f64>>,
    segs: Option<Vec<RawSegment>>,
    #[serde(default)]
    options: RawOptions,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    et: Vec<f64>,
    x_inertial: Vec<f64>,
    y_inertial: Vec<f64>,
    z_inertial: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawOptions {
    #[serde(rename = "loop")]
    looping: bool,
    speed: f64,
    animate: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        let defaults = TrajectoryOptions::default();
        Self {
            looping: defaults.looping,
            speed: defaults.speed,
            animate: defaults.animate,
        }
    }
}

impl From<RawOptions> for TrajectoryOptions {
    fn from(raw: RawOptions) -> Self {
        Self {
            looping: raw.looping,
            speed: raw.speed,
            animate: raw.animate,
        }
    }
}

/// Flat per-axis arrays before validation.
struct Columns {
    t: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl Columns {
    fn check_lengths(&self) -> Result<(), TrajectoryError> {
        let expected = self.t.len();
        for (field, len) in [("x", self.x.len()), ("y", self.y.len()), ("z", self.z.len())] {
            if len != expected {
                return Err(TrajectoryError::LengthMismatch {
                    field,
                    expected,
                    actual: len,
                });
            }
        }
        Ok(())
    }

    fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| DVec3::new(x, y, z))
    }
}

impl TrajectorySpec {
    /// Parse a trajectory document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, TrajectoryError> {
        let raw: RawTrajectory = serde_json::from_str(json)?;
        build(raw)
    }

    /// Build from an already parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, TrajectoryError> {
        let raw: RawTrajectory = serde_json::from_value(value)?;
        build(raw)
    }

    /// Read and parse a trajectory file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrajectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TrajectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = Self::from_json_str(&json)?;
        if let Some(d) = spec.as_discrete() {
            info!(path = %path.display(), samples = d.len(), "loaded trajectory");
        }
        Ok(spec)
    }
}

fn build(mut raw: RawTrajectory) -> Result<TrajectorySpec, TrajectoryError> {
    let columns = match (raw.x.take(), raw.y.take(), raw.z.take(), raw.t.take()) {
        (Some(x), Some(y), Some(z), Some(t)) => Columns { t, x, y, z },
        _ => match raw.segs.take() {
            Some(segs) => stitch_segments(segs)?,
            None => return Err(TrajectoryError::MissingArrays),
        },
    };
    columns.check_lengths()?;
    let count = columns.t.len();

    let colors = parse_colors(raw.colors.take(), count)?;
    let samples = columns
        .t
        .iter()
        .zip(columns.positions())
        .enumerate()
        .map(|(i, (&t, position))| {
            let sample = TrajectorySample::new(t, position);
            match &colors {
                Some(colors) => sample.with_color(colors[i]),
                None => sample,
            }
        })
        .collect();

    let delta_v = parse_delta_v(&raw, count)?;
    let trajectory = DiscreteTrajectory::new(samples, raw.options.into())?.with_delta_v(delta_v)?;
    Ok(TrajectorySpec::Discrete(trajectory))
}

/// Concatenate legacy segments into one normalized column set.
///
/// Each segment is sorted by time and loses its last two samples. Times are
/// then mapped as `100 * (t - t0) / t_last` and positions divided by 1000.
fn stitch_segments(segs: Vec<RawSegment>) -> Result<Columns, TrajectoryError> {
    debug!(segments = segs.len(), "stitching legacy segment trajectory");
    let mut rows: Vec<(f64, f64, f64, f64)> = Vec::new();
    for seg in segs {
        let len = seg.et.len();
        for (field, actual) in [
            ("x_inertial", seg.x_inertial.len()),
            ("y_inertial", seg.y_inertial.len()),
            ("z_inertial", seg.z_inertial.len()),
        ] {
            if actual != len {
                return Err(TrajectoryError::LengthMismatch {
                    field,
                    expected: len,
                    actual,
                });
            }
        }
        let mut seg_rows: Vec<(f64, f64, f64, f64)> = (0..len)
            .map(|i| (seg.et[i], seg.x_inertial[i], seg.y_inertial[i], seg.z_inertial[i]))
            .collect();
        seg_rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        seg_rows.truncate(len.saturating_sub(LEGACY_SEGMENT_OVERLAP));
        rows.extend(seg_rows);
    }

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(TrajectoryError::TooFewSamples {
            required: 2,
            actual: 0,
        });
    };
    let (t0, t_last) = (first.0, last.0);
    let rescale = |t: f64| {
        if t_last == 0.0 {
            t - t0
        } else {
            LEGACY_TIME_SPAN * (t - t0) / t_last
        }
    };

    Ok(Columns {
        t: rows.iter().map(|r| rescale(r.0)).collect(),
        x: rows.iter().map(|r| r.1 / LEGACY_POSITION_SCALE).collect(),
        y: rows.iter().map(|r| r.2 / LEGACY_POSITION_SCALE).collect(),
        z: rows.iter().map(|r| r.3 / LEGACY_POSITION_SCALE).collect(),
    })
}

/// Colors are used only when there is one per sample.
fn parse_colors(
    colors: Option<Vec<Vec<f32>>>,
    count: usize,
) -> Result<Option<Vec<Vec4>>, TrajectoryError> {
    let Some(colors) = colors else {
        return Ok(None);
    };
    if colors.len() != count {
        debug!(
            colors = colors.len(),
            samples = count,
            "ignoring colors with mismatched count"
        );
        return Ok(None);
    }
    colors
        .into_iter()
        .enumerate()
        .map(|(index, c)| match c.as_slice() {
            &[r, g, b, a] => Ok(Vec4::new(r, g, b, a)),
            _ => Err(TrajectoryError::InvalidColor {
                index,
                len: c.len(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_delta_v(raw: &RawTrajectory, count: usize) -> Result<DeltaVAnnotations, TrajectoryError> {
    let per_sample = match (&raw.dvx, &raw.dvy, &raw.dvz) {
        (None, None, None) => None,
        (Some(dvx), Some(dvy), Some(dvz)) => {
            for (field, len) in [("dvx", dvx.len()), ("dvy", dvy.len()), ("dvz", dvz.len())] {
                if len != count {
                    return Err(TrajectoryError::LengthMismatch {
                        field,
                        expected: count,
                        actual: len,
                    });
                }
            }
            Some(
                dvx.iter()
                    .zip(dvy)
                    .zip(dvz)
                    .map(|((&x, &y), &z)| DVec3::new(x, y, z))
                    .collect(),
            )
        }
        _ => return Err(TrajectoryError::PartialDeltaV),
    };
    Ok(DeltaVAnnotations {
        per_sample,
        initial: parse_vec3(raw.dv0.as_deref(), "dv0")?,
        final_: parse_vec3(raw.dvf.as_deref(), "dvf")?,
    })
}

fn parse_vec3(values: Option<&[f64]>, field: &'static str) -> Result<Option<DVec3>, TrajectoryError> {
    match values {
        None => Ok(None),
        Some(&[x, y, z]) => Ok(Some(DVec3::new(x, y, z))),
        Some(_) => Err(TrajectoryError::InvalidDeltaV(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn discrete(spec: &TrajectorySpec) -> &DiscreteTrajectory {
        spec.as_discrete().unwrap()
    }

    #[test]
    fn test_canonical_form() {
        let spec = TrajectorySpec::from_json_value(json!({
            "x": [1.0, 0.0, -1.0],
            "y": [0.0, 1.0, 0.0],
            "z": [0.0, 0.0, 0.5],
            "t": [0.0, 1.0, 2.0],
        }))
        .unwrap();
        let d = discrete(&spec);
        assert_eq!(d.len(), 3);
        assert_eq!(d.samples()[2].position, DVec3::new(-1.0, 0.0, 0.5));
        assert_eq!(d.options(), TrajectoryOptions::default());
        assert!(!d.has_colors());
        assert!(d.delta_v().is_empty());
    }

    #[test]
    fn test_options_parsed() {
        let spec = TrajectorySpec::from_json_str(
            r#"{"x":[0,1],"y":[0,0],"z":[0,0],"t":[0,1],
                "options":{"loop":true,"speed":2.5,"animate":false}}"#,
        )
        .unwrap();
        let options = discrete(&spec).options();
        assert!(options.looping);
        assert!((options.speed - 2.5).abs() < 1e-12);
        assert!(!options.animate);
    }

    #[test]
    fn test_partial_options_keep_defaults() {
        let spec = TrajectorySpec::from_json_value(json!({
            "x": [0, 1], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "options": {"loop": true},
        }))
        .unwrap();
        let options = discrete(&spec).options();
        assert!(options.looping);
        assert_eq!(options.speed, 1.0);
        assert!(options.animate);
    }

    #[test]
    fn test_missing_arrays() {
        let err = TrajectorySpec::from_json_value(json!({"x": [0, 1], "y": [0, 1], "t": [0, 1]}))
            .unwrap_err();
        assert!(matches!(err, TrajectoryError::MissingArrays));
    }

    #[test]
    fn test_length_mismatch() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [0, 1, 2], "y": [0, 1], "z": [0, 1, 2], "t": [0, 1, 2],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::LengthMismatch {
                field: "y",
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_single_sample_rejected() {
        let err = TrajectorySpec::from_json_value(json!({"x": [0], "y": [0], "z": [0], "t": [0]}))
            .unwrap_err();
        assert!(matches!(err, TrajectoryError::TooFewSamples { required: 2, actual: 1 }));
    }

    #[test]
    fn test_non_increasing_time_rejected() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [0, 1, 2], "y": [0, 0, 0], "z": [0, 0, 0], "t": [0, 2, 2],
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::NonIncreasingTime { index: 2, .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = TrajectorySpec::from_json_str("{\"x\": [0, 1").unwrap_err();
        assert!(matches!(err, TrajectoryError::Json(_)));
    }

    #[test]
    fn test_colors_attached() {
        let spec = TrajectorySpec::from_json_value(json!({
            "x": [0, 1], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "colors": [[1, 0, 0, 1], [0, 0, 1, 0.5]],
        }))
        .unwrap();
        let d = discrete(&spec);
        assert!(d.has_colors());
        assert_eq!(d.samples()[1].color, Some(Vec4::new(0.0, 0.0, 1.0, 0.5)));
    }

    #[test]
    fn test_mismatched_color_count_ignored() {
        let spec = TrajectorySpec::from_json_value(json!({
            "x": [0, 1, 2], "y": [0, 0, 0], "z": [0, 0, 0], "t": [0, 1, 2],
            "colors": [[1, 0, 0, 1]],
        }))
        .unwrap();
        assert!(!discrete(&spec).has_colors());
    }

    #[test]
    fn test_short_color_rejected() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [0, 1], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "colors": [[1, 0, 0, 1], [1, 0, 0]],
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::InvalidColor { index: 1, len: 3 }));
    }

    #[test]
    fn test_delta_v_annotations() {
        let spec = TrajectorySpec::from_json_value(json!({
            "x": [1, 2], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "dvx": [0, 0.1], "dvy": [0, 0], "dvz": [0, 0],
            "dv0": [0, 1, 0],
            "dvf": [0, 0, 2],
        }))
        .unwrap();
        let dv = discrete(&spec).delta_v();
        assert_eq!(dv.initial, Some(DVec3::Y));
        assert_eq!(dv.final_, Some(DVec3::new(0.0, 0.0, 2.0)));
        let per_sample = dv.per_sample.as_ref().unwrap();
        assert_eq!(per_sample[1], DVec3::new(0.1, 0.0, 0.0));

        let arrows = dv.arrows(discrete(&spec).samples(), 1.0);
        // Zero per-sample entry skipped; dv0 at first sample; dvf at last.
        assert_eq!(arrows.len(), 3);
    }

    #[test]
    fn test_partial_delta_v_rejected() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [1, 2], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "dvx": [0, 0.1], "dvy": [0, 0],
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::PartialDeltaV));
    }

    #[test]
    fn test_delta_v_length_checked() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [1, 2], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "dvx": [0], "dvy": [0], "dvz": [0],
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::LengthMismatch { field: "dvx", .. }));
    }

    #[test]
    fn test_bad_endpoint_delta_v() {
        let err = TrajectorySpec::from_json_value(json!({
            "x": [1, 2], "y": [0, 0], "z": [0, 0], "t": [0, 1],
            "dv0": [1, 2],
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::InvalidDeltaV("dv0")));
    }

    #[test]
    fn test_legacy_segments_stitched() {
        // Second segment is stored backwards and must be sorted first.
        let spec = TrajectorySpec::from_json_value(json!({
            "segs": [
                {
                    "et": [10.0, 20.0, 30.0, 40.0],
                    "x_inertial": [1000.0, 2000.0, 3000.0, 4000.0],
                    "y_inertial": [0.0, 0.0, 0.0, 0.0],
                    "z_inertial": [0.0, 0.0, 0.0, 0.0],
                },
                {
                    "et": [80.0, 70.0, 60.0, 50.0, 40.0],
                    "x_inertial": [8000.0, 7000.0, 6000.0, 5000.0, 4000.0],
                    "y_inertial": [1000.0, 1000.0, 1000.0, 1000.0, 1000.0],
                    "z_inertial": [0.0, 0.0, 0.0, 0.0, 0.0],
                },
            ]
        }))
        .unwrap();
        let d = discrete(&spec);
        // 2 kept from the first segment, 3 from the second.
        assert_eq!(d.len(), 5);
        let raw_times = [10.0, 20.0, 40.0, 50.0, 60.0];
        for (sample, raw) in d.samples().iter().zip(raw_times) {
            let expected = 100.0 * (raw - 10.0) / 60.0;
            assert!((sample.t - expected).abs() < 1e-12);
        }
        assert_eq!(d.samples()[0].position, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(d.samples()[4].position, DVec3::new(6.0, 1.0, 0.0));
    }

    #[test]
    fn test_legacy_segment_length_mismatch() {
        let err = TrajectorySpec::from_json_value(json!({
            "segs": [{"et": [0, 1, 2], "x_inertial": [0, 1], "y_inertial": [0, 1, 2], "z_inertial": [0, 1, 2]}]
        }))
        .unwrap_err();
        assert!(matches!(err, TrajectoryError::LengthMismatch { field: "x_inertial", .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orbit.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"x":[0,1,2],"y":[0,1,0],"z":[0,0,0],"t":[0,5,10]}}"#).unwrap();
        drop(file);

        let spec = TrajectorySpec::from_path(&path).unwrap();
        assert!((discrete(&spec).t_max() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrajectorySpec::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TrajectoryError::Io { .. }));
    }
}
