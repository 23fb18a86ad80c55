//! Great-circle paths over a body's surface, built in body-fixed axes.

use glam::{DQuat, DVec3, Vec4};

use crate::provider::lat_lon_to_body_fixed;
use crate::rotation::BodyRotation;
use crate::sampler::{PathPoint, PathPolyline};
use crate::spec::Rgba;

/// Points per great-circle segment, not counting the start.
pub const GEODESIC_SUBDIVISIONS: usize = 64;

/// Height added on top of every waypoint so the path clears the surface.
pub const DEFAULT_ALTITUDE_PAD: f64 = 0.01;

/// A waypoint above a body's surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    /// Height above the surface, in scene units.
    pub altitude: f64,
    /// Latitude in degrees.
    pub lat_deg: f64,
    /// Longitude in degrees.
    pub lon_deg: f64,
}

impl GeoPoint {
    /// Waypoint at `altitude` over latitude/longitude in degrees.
    pub fn new(altitude: f64, lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            altitude,
            lat_deg,
            lon_deg,
        }
    }
}

/// Waypoints joined by great-circle arcs.
///
/// Each arc runs at the mean radius of its two ends. A closed path also
/// joins the last waypoint back to the first.
#[derive(Clone, Debug, PartialEq)]
pub struct GeodesicPath {
    body_radius: f64,
    points: Vec<GeoPoint>,
    closed: bool,
    altitude_pad: f64,
    lon_rotation: f64,
    color: Rgba,
}

impl GeodesicPath {
    /// Open path over a body of `body_radius`.
    pub fn new(body_radius: f64, points: Vec<GeoPoint>) -> Self {
        Self {
            body_radius,
            points,
            closed: false,
            altitude_pad: DEFAULT_ALTITUDE_PAD,
            lon_rotation: 0.0,
            color: Vec4::new(1.0, 1.0, 0.0, 1.0),
        }
    }

    /// Join the last waypoint back to the first.
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Extra height over every waypoint.
    pub fn with_altitude_pad(mut self, pad: f64) -> Self {
        self.altitude_pad = pad;
        self
    }

    /// Degrees added to every waypoint's longitude, for texture alignment.
    pub fn with_lon_rotation(mut self, degrees: f64) -> Self {
        self.lon_rotation = degrees;
        self
    }

    /// Line color.
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Waypoints as given.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Whether the last waypoint joins back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Waypoints in body-fixed axes.
    pub fn waypoints(&self) -> Vec<DVec3> {
        self.points
            .iter()
            .map(|p| {
                lat_lon_to_body_fixed(
                    p.lat_deg,
                    p.lon_deg + self.lon_rotation,
                    self.body_radius + p.altitude + self.altitude_pad,
                )
            })
            .collect()
    }

    /// Path vertices in body-fixed axes. Shared arc ends appear once.
    pub fn vertices(&self) -> Vec<DVec3> {
        let waypoints = self.waypoints();
        let n = waypoints.len();
        if n < 2 {
            return Vec::new();
        }
        let arcs = if self.closed { n } else { n - 1 };
        let mut vertices = Vec::with_capacity(arcs * GEODESIC_SUBDIVISIONS + 1);
        for i in 0..arcs {
            let (from, to) = (waypoints[i], waypoints[(i + 1) % n]);
            let arc = great_circle_arc(from, to, GEODESIC_SUBDIVISIONS);
            let skip = usize::from(i > 0);
            vertices.extend(arc.into_iter().skip(skip));
        }
        vertices
    }

    /// Polyline in body-fixed axes. Vertex `t` counts arcs: arc `k` spans
    /// `[k, k + 1]`. `None` with fewer than two waypoints.
    pub fn local_polyline(&self) -> Option<PathPolyline> {
        self.polyline(|p| p)
    }

    /// Polyline in world axes for a body at `center` spinning with `rotation`
    /// at time `t`.
    pub fn world_polyline(
        &self,
        t: f64,
        center: DVec3,
        rotation: &BodyRotation,
    ) -> Option<PathPolyline> {
        let orientation = rotation.orientation(t);
        self.polyline(|p| center + orientation * p)
    }

    fn polyline(&self, place: impl Fn(DVec3) -> DVec3) -> Option<PathPolyline> {
        let step = 1.0 / GEODESIC_SUBDIVISIONS as f64;
        let points = self
            .vertices()
            .into_iter()
            .enumerate()
            .map(|(i, p)| PathPoint {
                t: i as f64 * step,
                position: place(p),
                color: self.color,
            })
            .collect();
        PathPolyline::from_points(points)
    }
}

/// `subdivisions + 1` points from `a` to `b` along the great circle through
/// both, at the mean of their radii.
///
/// Antipodal ends have no unique great circle; the arc then bends around
/// an arbitrary axis perpendicular to `a`.
pub fn great_circle_arc(a: DVec3, b: DVec3, subdivisions: usize) -> Vec<DVec3> {
    let subdivisions = subdivisions.max(1);
    let (ra, rb) = (a.length(), b.length());
    let radius = 0.5 * (ra + rb);
    let (Some(ua), Some(ub)) = (a.try_normalize(), b.try_normalize()) else {
        return vec![a; subdivisions + 1];
    };

    let angle = ua.dot(ub).clamp(-1.0, 1.0).acos();
    let axis = ua
        .cross(ub)
        .try_normalize()
        .unwrap_or_else(|| ua.any_orthonormal_vector());
    (0..=subdivisions)
        .map(|i| {
            let f = i as f64 / subdivisions as f64;
            DQuat::from_axis_angle(axis, f * angle) * ua * radius
        })
        .collect()
}
