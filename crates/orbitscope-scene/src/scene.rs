//! Body registry evaluated at the clock's current time.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::{DQuat, DVec3};
use orbitscope_camera::{TargetId, TargetSource};
use orbitscope_trajectory::{
    BodyRotation, GeodesicPath, GroundTrack, PathPolyline, PositionProvider, Rgba, SplineMode,
    SurfaceSite, TraceHistory, Trajectory, TrajectoryError,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::SimulationClock;
use crate::overlay::BodyArrow;

/// View distance per unit body radius.
const VIEW_DISTANCE_PER_RADIUS: f64 = 10.0;
/// View distance per unit radius when the target is a surface site.
const SITE_VIEW_DISTANCE_PER_RADIUS: f64 = 1.5;

/// Errors from building or editing a [`Scene`].
#[derive(Debug, Error)]
pub enum SceneError {
    /// A body with this name already exists.
    #[error("body `{0}` is already registered")]
    DuplicateBody(TargetId),

    /// The named body is not in the scene.
    #[error("no body named `{0}`")]
    UnknownBody(TargetId),
}

/// One object in the scene.
///
/// For a surface site, `radius` is the site's distance from the center of the
/// body it sits on.
#[derive(Clone, Debug)]
pub struct Body {
    id: TargetId,
    radius: f64,
    provider: Arc<PositionProvider>,
    rotation: BodyRotation,
    trajectory: Option<Trajectory>,
    trail: Option<TraceHistory>,
    /// Body a surface site sits on.
    central: Option<TargetId>,
}

impl Body {
    /// Non-spinning body of `radius` moved by `provider`.
    pub fn new(id: impl Into<TargetId>, radius: f64, provider: PositionProvider) -> Self {
        Self {
            id: id.into(),
            radius,
            provider: Arc::new(provider),
            rotation: BodyRotation::NONE,
            trajectory: None,
            trail: None,
            central: None,
        }
    }

    /// Body moving along `trajectory`.
    pub fn from_trajectory(id: impl Into<TargetId>, radius: f64, trajectory: Trajectory) -> Self {
        let mut body = Self::new(id, radius, trajectory.position_provider());
        body.trajectory = Some(trajectory);
        body
    }

    /// Spin about the body's own axis.
    pub fn with_rotation(mut self, rotation: BodyRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Attach a drawn trajectory without changing how the body moves.
    pub fn with_trajectory(mut self, trajectory: Trajectory) -> Self {
        self.trajectory = Some(trajectory);
        self
    }

    /// Keep a trail of the last `capacity` positions.
    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = Some(TraceHistory::new(capacity));
        self
    }

    /// Name the body is registered under.
    pub fn id(&self) -> &TargetId {
        &self.id
    }

    /// Drawn radius, which also sets the default view distance.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// What moves the body. Shared with the trajectory that built it.
    pub fn provider(&self) -> &Arc<PositionProvider> {
        &self.provider
    }

    /// Spin about the body's own axis.
    pub fn rotation(&self) -> BodyRotation {
        self.rotation
    }

    /// Drawn trajectory, if any.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Recent positions, if the body keeps a trail.
    pub fn trail(&self) -> Option<&TraceHistory> {
        self.trail.as_ref()
    }

    /// Body this site sits on, for surface sites.
    pub fn central(&self) -> Option<&TargetId> {
        self.central.as_ref()
    }

    /// Refit the trajectory with `mode`. A body moved by that trajectory
    /// moves along the new fit from then on. Returns `false` when the body
    /// has no trajectory.
    pub fn rebuild_trajectory(&mut self, mode: SplineMode) -> Result<bool, TrajectoryError> {
        let Some(trajectory) = self.trajectory.as_mut() else {
            return Ok(false);
        };
        trajectory.rebuild(mode)?;
        if matches!(*self.provider, PositionProvider::Interpolated(_)) {
            self.provider = Arc::new(trajectory.position_provider());
        }
        Ok(true)
    }

    /// Whether the body is pinned to another body's surface.
    pub fn is_site(&self) -> bool {
        matches!(*self.provider, PositionProvider::SurfaceFixed(_))
    }

    /// World position at simulation time `now`. A body driven by its own
    /// trajectory follows the trajectory's playback speed.
    ///
    /// A surface site on its own only sees its central body's raw motion;
    /// [`Scene`] places sites against the central body as it is shown.
    pub fn position(&self, now: f64) -> DVec3 {
        match (&self.trajectory, self.provider.as_ref()) {
            (Some(trajectory), PositionProvider::Interpolated(_)) => {
                trajectory.object_position(now)
            }
            _ => self.provider.position(now),
        }
    }

    /// Body-fixed frame at `now`. A surface site turns with its body.
    pub fn orientation(&self, now: f64) -> DQuat {
        match self.provider.as_ref() {
            PositionProvider::SurfaceFixed(site) => site.rotation().orientation(now),
            _ => self.rotation.orientation(now),
        }
    }

    /// Camera distance that frames the whole body.
    pub fn view_distance(&self) -> f64 {
        let factor = if self.is_site() {
            SITE_VIEW_DISTANCE_PER_RADIUS
        } else {
            VIEW_DISTANCE_PER_RADIUS
        };
        factor * self.radius
    }
}

#[derive(Clone, Debug)]
struct GroundTrackBinding {
    satellite: TargetId,
    central: TargetId,
    track: GroundTrack,
}

#[derive(Clone, Debug)]
struct GeodesicBinding {
    name: String,
    central: TargetId,
    path: GeodesicPath,
}

/// Every body in the scene plus the clock they are evaluated against.
///
/// Lives in the frame loop's world as a resource.
#[derive(Resource, Clone, Debug, Default)]
pub struct Scene {
    bodies: Vec<Body>,
    index: FxHashMap<TargetId, usize>,
    ground_tracks: Vec<GroundTrackBinding>,
    geodesics: Vec<GeodesicBinding>,
    arrows: Vec<BodyArrow>,
    clock: SimulationClock,
}

impl Scene {
    /// Empty scene driven by `clock`.
    pub fn new(clock: SimulationClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    /// Register a body. Names are unique.
    pub fn add_body(&mut self, body: Body) -> Result<(), SceneError> {
        if self.index.contains_key(body.id()) {
            return Err(SceneError::DuplicateBody(body.id().clone()));
        }
        debug!(body = %body.id(), radius = body.radius(), "body added");
        self.index.insert(body.id().clone(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Pin a site to `central`'s surface at `height` above its radius.
    pub fn add_surface_site(
        &mut self,
        id: impl Into<TargetId>,
        central: &TargetId,
        lat_deg: f64,
        lon_deg: f64,
        height: f64,
    ) -> Result<(), SceneError> {
        let body = self.require(central)?;
        let radius = body.radius() + height;
        let site = SurfaceSite::new(
            Arc::clone(body.provider()),
            body.rotation(),
            lat_deg,
            lon_deg,
            radius,
        );
        let mut site = Body::new(id, radius, PositionProvider::SurfaceFixed(site));
        site.central = Some(central.clone());
        self.add_body(site)
    }

    /// Track `satellite`'s sub-satellite point on `central`.
    pub fn add_ground_track(
        &mut self,
        satellite: &TargetId,
        central: &TargetId,
        capacity: usize,
    ) -> Result<(), SceneError> {
        self.require(satellite)?;
        let radius = self.require(central)?.radius();
        info!(%satellite, %central, capacity, "ground track added");
        self.ground_tracks.push(GroundTrackBinding {
            satellite: satellite.clone(),
            central: central.clone(),
            track: GroundTrack::new(radius, capacity),
        });
        Ok(())
    }

    /// Draw `path` on `central`'s surface, turning with it.
    pub fn add_geodesic(
        &mut self,
        name: impl Into<String>,
        central: &TargetId,
        path: GeodesicPath,
    ) -> Result<(), SceneError> {
        self.require(central)?;
        let name = name.into();
        debug!(geodesic = %name, %central, waypoints = path.points().len(), "geodesic added");
        self.geodesics.push(GeodesicBinding {
            name,
            central: central.clone(),
            path,
        });
        Ok(())
    }

    /// Keep an arrow between two bodies.
    pub fn add_body_arrow(&mut self, arrow: BodyArrow) -> Result<(), SceneError> {
        self.require(&arrow.from)?;
        self.require(&arrow.to)?;
        debug!(arrow = %arrow.name, from = %arrow.from, to = %arrow.to, "body arrow added");
        self.arrows.push(arrow);
        Ok(())
    }

    /// Body named `id`.
    pub fn body(&self, id: &TargetId) -> Option<&Body> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    /// Mutable body named `id`.
    pub fn body_mut(&mut self, id: &TargetId) -> Option<&mut Body> {
        self.index.get(id).map(|&i| &mut self.bodies[i])
    }

    fn require(&self, id: &TargetId) -> Result<&Body, SceneError> {
        self.body(id)
            .ok_or_else(|| SceneError::UnknownBody(id.clone()))
    }

    /// Bodies in registration order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the scene has no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Mutable simulation clock, for playback commands.
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Current simulation time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Where `body` is at `now`. A surface site is placed against its
    /// central body's shown position, so it stays on that body even when the
    /// body plays its trajectory back at another speed.
    pub fn position_of(&self, body: &Body, now: f64) -> DVec3 {
        let central = body.central.as_ref().and_then(|id| self.body(id));
        match (central, body.provider.as_ref()) {
            (Some(central), PositionProvider::SurfaceFixed(site)) => {
                self.position_of(central, now)
                    + site.rotation().to_world(now, site.body_fixed_offset())
            }
            _ => body.position(now),
        }
    }

    /// Default camera distance for `id`.
    pub fn view_distance_for(&self, id: &TargetId) -> Option<f64> {
        self.body(id).map(Body::view_distance)
    }

    /// Append the current positions to every trail and ground track.
    pub fn record_history(&mut self) {
        let now = self.clock.now();
        let positions: Vec<DVec3> = self
            .bodies
            .iter()
            .map(|body| self.position_of(body, now))
            .collect();
        for (body, &position) in self.bodies.iter_mut().zip(&positions) {
            if let Some(trail) = body.trail.as_mut() {
                trail.push(now, position);
            }
        }

        for binding in &mut self.ground_tracks {
            let (Some(&sat), Some(&central)) = (
                self.index.get(&binding.satellite),
                self.index.get(&binding.central),
            ) else {
                continue;
            };
            binding.track.record(
                now,
                positions[sat],
                positions[central],
                &self.bodies[central].rotation(),
            );
        }
    }

    /// Trail polylines as `(body, polyline)`.
    pub fn trail_polylines(&self, color: Rgba) -> Vec<(TargetId, PathPolyline)> {
        self.bodies
            .iter()
            .filter_map(|body| {
                let line = body.trail.as_ref()?.polyline(color)?;
                Some((body.id.clone(), line))
            })
            .collect()
    }

    /// Ground tracks in world coordinates as `(satellite, polyline)`.
    pub fn ground_track_polylines(&self, color: Rgba) -> Vec<(TargetId, PathPolyline)> {
        let now = self.clock.now();
        self.ground_tracks
            .iter()
            .filter_map(|binding| {
                let central = self.body(&binding.central)?;
                let line = binding.track.world_polyline(
                    now,
                    self.position_of(central, now),
                    &central.rotation(),
                    color,
                )?;
                Some((binding.satellite.clone(), line))
            })
            .collect()
    }
}

impl Scene {
    /// Geodesic paths in world coordinates as `(name, polyline)`.
    pub fn geodesic_polylines(&self) -> Vec<(String, PathPolyline)> {
        let now = self.clock.now();
        self.geodesics
            .iter()
            .filter_map(|binding| {
                let central = self.body(&binding.central)?;
                let line = binding.path.world_polyline(
                    now,
                    self.position_of(central, now),
                    &central.rotation(),
                )?;
                Some((binding.name.clone(), line))
            })
            .collect()
    }

    /// Body arrows at the current time as `(name, start, end)`.
    pub fn body_arrows(&self) -> Vec<(String, DVec3, DVec3)> {
        let now = self.clock.now();
        self.arrows
            .iter()
            .filter_map(|arrow| {
                let from = self.body(&arrow.from)?;
                let to = self.body(&arrow.to)?;
                let (start, end) = arrow.endpoints(
                    self.position_of(from, now),
                    self.position_of(to, now),
                    to.radius(),
                )?;
                Some((arrow.name.clone(), start, end))
            })
            .collect()
    }
}

impl TargetSource for Scene {
    fn world_position(&self, id: &TargetId) -> Option<DVec3> {
        self.body(id).map(|body| self.position_of(body, self.clock.now()))
    }

    fn world_orientation(&self, id: &TargetId) -> Option<DQuat> {
        self.body(id).map(|body| body.orientation(self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use orbitscope_trajectory::{
        AnalyticOrbit, DiscreteTrajectory, GeoPoint, SplineBoundary, TrajectoryOptions,
        TrajectorySample, TrajectorySpec, TrajectoryStyle,
    };
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn earth() -> Body {
        Body::new("earth", 1.0, PositionProvider::Fixed(DVec3::ZERO))
            .with_rotation(BodyRotation::from_period(4.0, 0.0))
    }

    fn moon() -> Body {
        let orbit = AnalyticOrbit::from_degrees(5.0, 0.0, FRAC_PI_2).unwrap();
        Body::new("moon", 0.27, orbit.into()).with_trail(4)
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(SimulationClock::new(0.0, 100.0));
        scene.add_body(earth()).unwrap();
        scene.add_body(moon()).unwrap();
        scene
    }

    #[test]
    fn test_duplicate_body_rejected() {
        let mut scene = scene();
        let err = scene.add_body(earth()).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateBody(id) if id.as_str() == "earth"));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_positions_follow_clock() {
        let mut scene = scene();
        let moon = TargetId::new("moon");
        let p0 = scene.world_position(&moon).unwrap();
        assert!((p0 - DVec3::new(5.0, 0.0, 0.0)).length() < EPS);

        scene.clock_mut().advance(1.0);
        let p1 = scene.world_position(&moon).unwrap();
        assert!((p1 - DVec3::new(0.0, 5.0, 0.0)).length() < EPS);
        assert!(scene.world_position(&TargetId::new("mars")).is_none());
    }

    #[test]
    fn test_orientation_is_body_spin() {
        let mut scene = scene();
        scene.clock_mut().advance(1.0);
        let q = scene.world_orientation(&TargetId::new("earth")).unwrap();
        assert!((q * DVec3::X - DVec3::Y).length() < EPS);
        // No spin set.
        let q = scene.world_orientation(&TargetId::new("moon")).unwrap();
        assert!(q.abs_diff_eq(DQuat::IDENTITY, EPS));
    }

    #[test]
    fn test_surface_site_turns_with_body() {
        let mut scene = scene();
        let earth = TargetId::new("earth");
        scene.add_surface_site("site", &earth, 0.0, 0.0, 0.0).unwrap();
        let site = TargetId::new("site");
        assert!(scene.body(&site).unwrap().is_site());

        let p0 = scene.world_position(&site).unwrap();
        assert!((p0 - DVec3::X).length() < EPS);
        scene.clock_mut().advance(1.0);
        let p1 = scene.world_position(&site).unwrap();
        assert!((p1 - DVec3::Y).length() < EPS);

        let q_site = scene.world_orientation(&site).unwrap();
        let q_earth = scene.world_orientation(&earth).unwrap();
        assert!(q_site.abs_diff_eq(q_earth, EPS));
    }

    #[test]
    fn test_site_on_unknown_body() {
        let mut scene = scene();
        let err = scene
            .add_surface_site("site", &TargetId::new("pluto"), 0.0, 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownBody(_)));
    }

    #[test]
    fn test_view_distance() {
        let mut scene = scene();
        let earth = TargetId::new("earth");
        scene.add_surface_site("site", &earth, 10.0, 20.0, 0.0).unwrap();
        assert!((scene.view_distance_for(&earth).unwrap() - 10.0).abs() < EPS);
        let site = scene.view_distance_for(&TargetId::new("site")).unwrap();
        assert!((site - 1.5).abs() < EPS);
        assert!(scene.view_distance_for(&TargetId::new("pluto")).is_none());
    }

    #[test]
    fn test_trail_records_each_frame() {
        let mut scene = scene();
        for _ in 0..6 {
            scene.record_history();
            scene.clock_mut().advance(0.5);
        }
        let moon = scene.body(&TargetId::new("moon")).unwrap();
        assert_eq!(moon.trail().unwrap().len(), 4);
        let lines = scene.trail_polylines(Vec4::ONE);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0.as_str(), "moon");
    }

    #[test]
    fn test_ground_track_under_satellite() {
        let mut scene = scene();
        let moon = TargetId::new("moon");
        let earth = TargetId::new("earth");
        scene.add_ground_track(&moon, &earth, 10).unwrap();
        scene.record_history();
        scene.clock_mut().advance(0.5);
        scene.record_history();

        let lines = scene.ground_track_polylines(Vec4::ONE);
        assert_eq!(lines.len(), 1);
        let newest = lines[0].1.points().last().unwrap().position;
        let expected = scene.world_position(&moon).unwrap().normalize() * 1.001;
        assert!((newest - expected).length() < 1e-9);
    }

    #[test]
    fn test_geodesic_turns_with_body() {
        let mut scene = scene();
        let earth = TargetId::new("earth");
        let path = GeodesicPath::new(
            1.0,
            vec![GeoPoint::new(0.0, 0.0, 0.0), GeoPoint::new(0.0, 0.0, 90.0)],
        )
        .with_altitude_pad(0.0);
        scene.add_geodesic("equator", &earth, path.clone()).unwrap();
        let err = scene
            .add_geodesic("lost", &TargetId::new("pluto"), path)
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownBody(_)));

        let lines = scene.geodesic_polylines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "equator");
        assert!(lines[0].1.points()[0].position.abs_diff_eq(DVec3::X, EPS));

        // A quarter turn of the earth later the path starts over +Y.
        scene.clock_mut().advance(1.0);
        let lines = scene.geodesic_polylines();
        assert!(lines[0].1.points()[0].position.abs_diff_eq(DVec3::Y, EPS));
    }

    #[test]
    fn test_body_arrow_follows_bodies() {
        let mut scene = scene();
        scene
            .add_body_arrow(BodyArrow::new("antipode", "moon", "earth"))
            .unwrap();
        assert!(matches!(
            scene.add_body_arrow(BodyArrow::new("x", "moon", "pluto")),
            Err(SceneError::UnknownBody(_))
        ));

        let arrows = scene.body_arrows();
        assert_eq!(arrows.len(), 1);
        let (name, start, end) = &arrows[0];
        assert_eq!(name, "antipode");
        assert!(start.abs_diff_eq(DVec3::new(5.0, 0.0, 0.0), EPS));
        assert!(end.abs_diff_eq(DVec3::new(-1.5, 0.0, 0.0), EPS));

        scene.clock_mut().advance(1.0);
        let (_, start, end) = scene.body_arrows().remove(0);
        assert!(start.abs_diff_eq(DVec3::new(0.0, 5.0, 0.0), EPS));
        assert!(end.abs_diff_eq(DVec3::new(0.0, -1.5, 0.0), EPS));
    }

    fn fast_body() -> Body {
        let samples = [0.0, 10.0, 20.0]
            .iter()
            .map(|&t| TrajectorySample::new(t, DVec3::new(t, 0.0, 0.0)))
            .collect();
        let options = TrajectoryOptions {
            speed: 2.0,
            ..TrajectoryOptions::default()
        };
        let spec = TrajectorySpec::Discrete(DiscreteTrajectory::new(samples, options).unwrap());
        let trajectory =
            Trajectory::new(spec, SplineMode::Linear, TrajectoryStyle::default()).unwrap();
        Body::from_trajectory("craft", 1.0, trajectory)
    }

    #[test]
    fn test_site_stays_on_fast_trajectory_body() {
        let mut scene = Scene::new(SimulationClock::new(0.0, 100.0));
        scene.add_body(fast_body()).unwrap();
        let craft = TargetId::new("craft");
        scene.add_surface_site("hatch", &craft, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(scene.body(&TargetId::new("hatch")).unwrap().central(), Some(&craft));

        scene.clock_mut().advance(4.0);
        let body = scene.world_position(&craft).unwrap();
        let site = scene.world_position(&TargetId::new("hatch")).unwrap();
        assert!((body - DVec3::new(8.0, 0.0, 0.0)).length() < EPS);
        assert!((site - body - DVec3::X).length() < EPS);
    }

    #[test]
    fn test_rebuild_refreshes_provider() {
        let mut scene = Scene::new(SimulationClock::new(0.0, 100.0));
        scene.add_body(fast_body()).unwrap();
        let craft = TargetId::new("craft");
        scene.add_surface_site("hatch", &craft, 0.0, 0.0, 0.0).unwrap();

        let body = scene.body_mut(&craft).unwrap();
        assert!(body.rebuild_trajectory(SplineMode::Cubic(SplineBoundary::Natural)).unwrap());
        let body = scene.body(&craft).unwrap();
        let PositionProvider::Interpolated(interp) = body.provider().as_ref() else {
            panic!("expected an interpolated provider");
        };
        assert!(Arc::ptr_eq(interp, body.trajectory().unwrap().interpolant()));

        scene.clock_mut().advance(3.0);
        let body = scene.world_position(&craft).unwrap();
        let site = scene.world_position(&TargetId::new("hatch")).unwrap();
        assert!(((site - body).length() - 1.0).abs() < 1e-9);

        let hatch = scene.body_mut(&TargetId::new("hatch")).unwrap();
        assert!(!hatch.rebuild_trajectory(SplineMode::Linear).unwrap());
    }

    #[test]
    fn test_trajectory_body_uses_playback_speed() {
        let orbit = AnalyticOrbit::from_degrees(3.0, 0.0, 1.0).unwrap();
        let provider = PositionProvider::Analytic(orbit);
        let trajectory =
            Trajectory::tabulate(&provider, 0.0, 10.0, 0.1, SplineMode::Linear).unwrap();
        let body = Body::from_trajectory("probe", 0.1, trajectory);
        let p = body.position(2.0);
        assert!((p - orbit.position(2.0)).length() < 1e-2);
    }
}
