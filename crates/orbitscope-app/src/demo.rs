//! The demo solar neighborhood: Earth at the origin, a few bodies on
//! circular orbits around it, satellites with ground tracks and surface sites.

use glam::{DVec3, Vec4};
use orbitscope_camera::TargetId;
use orbitscope_config::Config;
use orbitscope_scene::{Body, BodyArrow, Scene, SceneError, SimulationClock};
use orbitscope_trajectory::{
    AnalyticOrbit, BodyRotation, GeoPoint, GeodesicPath, PositionProvider, Trajectory,
    TrajectoryError, TrajectorySpec, TrajectoryStyle,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::{LoadedTrajectory, spline_mode, trajectory_style};

pub const EARTH_RADIUS: f64 = 2.0;
pub const MOON_RADIUS: f64 = EARTH_RADIUS / 4.0;
pub const MARS_RADIUS: f64 = EARTH_RADIUS / 3.0;
pub const VENUS_RADIUS: f64 = EARTH_RADIUS * 0.2;
pub const SUN_RADIUS: f64 = EARTH_RADIUS * 2.0;
/// Marker size for satellites and loaded trajectories.
pub const SATELLITE_RADIUS: f64 = 0.1;

pub const EARTH: &str = "earth";
pub const MOON: &str = "moon";
pub const MARS: &str = "mars";
pub const VENUS: &str = "venus";
pub const SUN: &str = "sun";
pub const ISS: &str = "iss";
pub const EARTH_SITE: &str = "site";

/// Bodies on circular orbits around Earth:
/// `(name, radius, orbit radius, inclination deg, speed rad/s, spin rate rad/s, tilt deg)`.
const PLANETS: [(&str, f64, f64, f64, f64, f64, f64); 4] = [
    (SUN, SUN_RADIUS, EARTH_RADIUS * 10.0, 10.0, 0.7, 0.0, 0.0),
    (MOON, MOON_RADIUS, EARTH_RADIUS * 5.0, 5.0, 0.7, 0.7, 6.68),
    (MARS, MARS_RADIUS, EARTH_RADIUS * 6.0, 2.0, 0.5, 0.5, 25.19),
    (VENUS, VENUS_RADIUS, EARTH_RADIUS * 7.0, 1.0, 0.3, -0.1, 177.4),
];

/// Earth satellites: `(name, orbit radius, inclination deg, speed rad/s, ground track)`.
const SATELLITES: [(&str, f64, f64, f64, bool); 3] = [
    (ISS, EARTH_RADIUS * 1.3, 51.6, 3.0, true),
    ("equatorial", EARTH_RADIUS * 5.0, 1.0, 1.0, true),
    ("polar", EARTH_RADIUS * 5.0, 90.0, 1.0, false),
];

/// Lunar landing sites, latitude and longitude in degrees.
const APOLLO_SITES: [(&str, f64, f64); 6] = [
    ("apollo-11", 0.67408, 23.47297),
    ("apollo-12", -3.01239, -23.42157),
    ("apollo-14", -3.64530, -17.47136),
    ("apollo-15", 26.13222, 3.63386),
    ("apollo-16", -8.97301, 15.50019),
    ("apollo-17", 20.19080, 30.77168),
];

/// Closed loop over Earth: `(lat deg, lon deg)`.
const EARTH_ROUTE: [(f64, f64); 4] = [
    (51.5, -0.1),
    (40.7, -74.0),
    (-33.9, 151.2),
    (35.7, 139.7),
];

/// Name of the closed great-circle loop over Earth.
pub const EARTH_ROUTE_NAME: &str = "route";

/// Name of the moon-through-Earth arrow.
pub const ANTIPODE: &str = "antipode";

const VENUS_TRAIL_LENGTH: usize = 50;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn analytic_trajectory(
    orbit: AnalyticOrbit,
    config: &Config,
    color: Vec4,
) -> Result<Trajectory, TrajectoryError> {
    let style = TrajectoryStyle {
        color,
        ..trajectory_style(&config.trajectory)
    };
    Trajectory::new(
        TrajectorySpec::Analytic(orbit),
        spline_mode(&config.trajectory),
        style,
    )
}

/// Build the demo scene and add every loaded trajectory as a moving body.
pub fn build_scene(config: &Config, loaded: Vec<LoadedTrajectory>) -> Result<Scene, DemoError> {
    let mut scene = Scene::new(SimulationClock::from(&config.clock));
    let history = config.trajectory.history_length;
    let earth = TargetId::new(EARTH);

    scene.add_body(
        Body::new(EARTH, EARTH_RADIUS, PositionProvider::Fixed(DVec3::ZERO))
            .with_rotation(BodyRotation::from_period(24.0, 23.44)),
    )?;

    for (name, radius, orbit_radius, inclination, speed, spin, tilt) in PLANETS {
        let orbit = AnalyticOrbit::from_degrees(orbit_radius, inclination, speed)?;
        let mut body = Body::new(name, radius, orbit.into()).with_rotation(BodyRotation {
            rate: spin,
            tilt: tilt.to_radians(),
        });
        if name == VENUS {
            body = body.with_trail(VENUS_TRAIL_LENGTH);
        }
        scene.add_body(body)?;
    }

    for (name, orbit_radius, inclination, speed, ground_track) in SATELLITES {
        let orbit = AnalyticOrbit::from_degrees(orbit_radius, inclination, speed)?;
        let trajectory = analytic_trajectory(orbit, config, Vec4::new(0.0, 1.0, 0.0, 1.0))?;
        scene.add_body(
            Body::from_trajectory(name, SATELLITE_RADIUS, trajectory).with_trail(history),
        )?;
        if ground_track {
            scene.add_ground_track(&TargetId::new(name), &earth, history)?;
        }
    }

    scene.add_surface_site(
        EARTH_SITE,
        &earth,
        0.519_f64.to_degrees(),
        1.665_f64.to_degrees(),
        0.001,
    )?;
    let moon = TargetId::new(MOON);
    scene.add_surface_site("copernicus", &moon, 40.0, -105.0, 0.0)?;
    for (name, lat, lon) in APOLLO_SITES {
        scene.add_surface_site(name, &moon, lat, lon, 0.0)?;
    }
    scene.add_surface_site("p1", &TargetId::new(VENUS), 40.0, -105.0, 0.02)?;

    let route = EARTH_ROUTE
        .iter()
        .map(|&(lat, lon)| GeoPoint::new(0.0, lat, lon))
        .collect();
    scene.add_geodesic(
        EARTH_ROUTE_NAME,
        &earth,
        GeodesicPath::new(EARTH_RADIUS, route).closed(true),
    )?;
    scene.add_body_arrow(BodyArrow::new(ANTIPODE, MOON, EARTH))?;

    for LoadedTrajectory {
        name,
        path,
        trajectory,
    } in loaded
    {
        let body = Body::from_trajectory(name.as_str(), SATELLITE_RADIUS, trajectory)
            .with_trail(history);
        if let Err(e) = scene.add_body(body) {
            warn!(path = %path.display(), error = %e, "trajectory not added to scene");
        }
    }

    info!(bodies = scene.len(), "demo scene built");
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscope_camera::TargetSource;

    #[test]
    fn test_demo_scene_contents() {
        let scene = build_scene(&Config::default(), Vec::new()).unwrap();
        for name in [EARTH, MOON, MARS, VENUS, SUN, ISS, EARTH_SITE, "apollo-11"] {
            assert!(scene.body(&TargetId::new(name)).is_some(), "missing {name}");
        }
        assert_eq!(scene.world_position(&TargetId::new(EARTH)), Some(DVec3::ZERO));
    }

    #[test]
    fn test_site_on_earth_surface() {
        let scene = build_scene(&Config::default(), Vec::new()).unwrap();
        let p = scene.world_position(&TargetId::new(EARTH_SITE)).unwrap();
        assert!((p.length() - (EARTH_RADIUS + 0.001)).abs() < 1e-9);
    }

    #[test]
    fn test_moon_orbit_radius() {
        let scene = build_scene(&Config::default(), Vec::new()).unwrap();
        let p = scene.world_position(&TargetId::new(MOON)).unwrap();
        assert!((p.length() - EARTH_RADIUS * 5.0).abs() < 1e-9);
        let d = scene.view_distance_for(&TargetId::new(MOON)).unwrap();
        assert!((d - MOON_RADIUS * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_route_and_antipode_arrow() {
        let scene = build_scene(&Config::default(), Vec::new()).unwrap();
        let routes = scene.geodesic_polylines();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].0, EARTH_ROUTE_NAME);
        let points = routes[0].1.points();
        let (first, last) = (points[0].position, points[points.len() - 1].position);
        assert!(first.abs_diff_eq(last, 1e-9));

        let arrows = scene.body_arrows();
        assert_eq!(arrows.len(), 1);
        let (name, start, end) = &arrows[0];
        assert_eq!(name, ANTIPODE);
        let moon = scene.world_position(&TargetId::new(MOON)).unwrap();
        assert!(start.abs_diff_eq(moon, 1e-9));
        // Tip lands beyond Earth, opposite the moon.
        assert!((end.length() - EARTH_RADIUS * 1.5).abs() < 1e-9);
        assert!(end.dot(moon) < 0.0);
    }
}
