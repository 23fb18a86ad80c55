//! Fixed-resolution polylines for drawing a whole path.

use glam::DVec3;
use tracing::warn;

use crate::interpolant::Interpolant;
use crate::spec::Rgba;

/// Upper bound on points produced for one polyline.
pub const MAX_POLYLINE_POINTS: usize = 1_000_000;

/// How densely to sample the domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution {
    /// `N` equal segments, `N + 1` points including both ends.
    Segments(usize),
    /// Fixed time step from `t_min`; `t_max` is always the final point.
    TimeStep(f64),
}

/// One vertex of a drawn path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    /// Sample time this vertex came from.
    pub t: f64,
    /// World-space position.
    pub position: DVec3,
    /// Vertex color.
    pub color: Rgba,
}

/// An ordered polyline. Replaced wholesale, never edited in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathPolyline {
    points: Vec<PathPoint>,
}

impl PathPolyline {
    /// Wrap a point list. Returns `None` for fewer than two points.
    pub fn from_points(points: Vec<PathPoint>) -> Option<Self> {
        (points.len() >= 2).then_some(Self { points })
    }

    /// Vertices in order.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Vertex count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true for a constructed polyline.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions only.
    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.points.iter().map(|p| p.position)
    }

    /// Time span covered, `t_last - t_first`.
    pub fn duration(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        }
    }
}

/// The time range a full path covers: the sample domain for discrete data,
/// one full loop for looping fits, one period for analytic orbits.
pub fn path_domain(interpolant: &Interpolant) -> Option<(f64, f64)> {
    if let Some(span) = interpolant.loop_span() {
        return Some(span);
    }
    match interpolant.domain() {
        Some(domain) => Some(domain),
        None => interpolant.period().map(|period| (0.0, period)),
    }
}

/// Evenly spaced sample times over `[t0, t1]` for the given resolution.
pub fn sample_times(t0: f64, t1: f64, resolution: Resolution) -> Vec<f64> {
    if t1 <= t0 {
        return Vec::new();
    }
    match resolution {
        Resolution::Segments(n) => {
            if n == 0 {
                return Vec::new();
            }
            let n = n.min(MAX_POLYLINE_POINTS - 1);
            let span = t1 - t0;
            let mut ts: Vec<f64> = (0..n).map(|i| t0 + span * i as f64 / n as f64).collect();
            ts.push(t1);
            ts
        }
        Resolution::TimeStep(dt) => {
            if !(dt.is_finite() && dt > 0.0) {
                warn!(dt, "ignoring non-positive path time step");
                return Vec::new();
            }
            let steps = ((t1 - t0) / dt).ceil();
            if steps >= MAX_POLYLINE_POINTS as f64 {
                warn!(dt, "path time step too fine, truncating");
            }
            let steps = (steps as usize).min(MAX_POLYLINE_POINTS - 1);
            let mut ts: Vec<f64> = (0..steps)
                .map(|k| t0 + dt * k as f64)
                .take_while(|&t| t < t1)
                .collect();
            ts.push(t1);
            ts
        }
    }
}

/// Sample the interpolant into a polyline.
///
/// Per-sample colors, when present, are interpolated against the original
/// sample times so color changes stay tied to their physical events;
/// otherwise every vertex gets `nominal`. Returns `None` when fewer than two
/// points result, e.g. for a single-sample placeholder.
pub fn sample_path(
    interpolant: &Interpolant,
    resolution: Resolution,
    nominal: Rgba,
) -> Option<PathPolyline> {
    let (t0, t1) = path_domain(interpolant)?;
    let points = sample_times(t0, t1, resolution)
        .into_iter()
        .map(|t| PathPoint {
            t,
            position: interpolant.evaluate(t),
            color: interpolant.color_at(t).unwrap_or(nominal),
        })
        .collect();
    PathPolyline::from_points(points)
}
