//! Point histories recorded frame by frame: body trails and ground tracks.

use std::collections::VecDeque;

use glam::DVec3;
use tracing::trace;

use crate::rotation::BodyRotation;
use crate::sampler::{PathPoint, PathPolyline};
use crate::spec::Rgba;

/// Height of ground track points above the surface.
pub const GROUND_TRACK_LIFT: f64 = 0.001;

/// Bounded history of recent positions; the oldest point is dropped first.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceHistory {
    capacity: usize,
    points: VecDeque<(f64, DVec3)>,
}

impl TraceHistory {
    /// Empty history holding at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Record the position at time `t`.
    pub fn push(&mut self, t: f64, position: DVec3) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back((t, position));
    }

    /// Forget every point, e.g. after the clock jumps backwards.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points held.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of points kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent position.
    pub fn latest(&self) -> Option<DVec3> {
        self.points.back().map(|&(_, p)| p)
    }

    /// Trail fading from alpha 0 at the oldest point to 1 at the newest.
    pub fn polyline(&self, color: Rgba) -> Option<PathPolyline> {
        let last = self.points.len().saturating_sub(1).max(1) as f32;
        self.faded(color, last, |p| p)
    }

    fn faded(
        &self,
        color: Rgba,
        denominator: f32,
        map: impl Fn(DVec3) -> DVec3,
    ) -> Option<PathPolyline> {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, &(t, position))| PathPoint {
                t,
                position: map(position),
                color: Rgba::new(color.x, color.y, color.z, i as f32 / denominator),
            })
            .collect();
        PathPolyline::from_points(points)
    }
}

/// Sub-satellite points on a central body, kept in body-fixed coordinates so
/// the track turns with the body.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundTrack {
    body_radius: f64,
    history: TraceHistory,
}

impl GroundTrack {
    /// Track over a body of `body_radius`, holding `capacity` points.
    pub fn new(body_radius: f64, capacity: usize) -> Self {
        Self {
            body_radius,
            history: TraceHistory::new(capacity),
        }
    }

    /// Project the satellite onto the surface and record it.
    ///
    /// A satellite at the body center has no direction and is skipped.
    pub fn record(
        &mut self,
        t: f64,
        satellite: DVec3,
        center: DVec3,
        rotation: &BodyRotation,
    ) -> Option<DVec3> {
        let world_dir = (satellite - center).try_normalize()?;
        let Some(local_dir) = rotation.to_local(t, world_dir).try_normalize() else {
            trace!("skipping degenerate ground track point");
            return None;
        };
        let point = local_dir * (self.body_radius + GROUND_TRACK_LIFT);
        self.history.push(t, point);
        Some(point)
    }

    /// Points held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget the track.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Track in body-fixed coordinates. Alpha is `i / capacity`, so a track
    /// that has not filled up yet never reaches full opacity.
    pub fn local_polyline(&self, color: Rgba) -> Option<PathPolyline> {
        let capacity = self.history.capacity().max(1) as f32;
        self.history.faded(color, capacity, |p| p)
    }

    /// Track in world coordinates for the body's pose at time `t`.
    pub fn world_polyline(
        &self,
        t: f64,
        center: DVec3,
        rotation: &BodyRotation,
        color: Rgba,
    ) -> Option<PathPolyline> {
        let orientation = rotation.orientation(t);
        let capacity = self.history.capacity().max(1) as f32;
        self.history
            .faded(color, capacity, |p| center + orientation * p)
    }
}
