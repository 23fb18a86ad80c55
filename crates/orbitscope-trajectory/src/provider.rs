//! How a body computes its world position, selected once at construction.

use std::sync::Arc;

use glam::DVec3;

use crate::interpolant::Interpolant;
use crate::rotation::BodyRotation;
use crate::spec::AnalyticOrbit;

/// Body-fixed point at latitude/longitude (degrees) and radius `r`:
/// `r * (cos φ cos λ, cos φ sin λ, sin φ)`.
pub fn lat_lon_to_body_fixed(lat_deg: f64, lon_deg: f64, radius: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();
    radius * DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// A point fixed on the surface of a central body, carried by its spin.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSite {
    central: Arc<PositionProvider>,
    rotation: BodyRotation,
    offset: DVec3,
    lat_deg: f64,
    lon_deg: f64,
}

impl SurfaceSite {
    /// Site at `radius` from the central body's center.
    pub fn new(
        central: Arc<PositionProvider>,
        rotation: BodyRotation,
        lat_deg: f64,
        lon_deg: f64,
        radius: f64,
    ) -> Self {
        Self {
            central,
            rotation,
            offset: lat_lon_to_body_fixed(lat_deg, lon_deg, radius),
            lat_deg,
            lon_deg,
        }
    }

    /// Offset from the central body's center, in body-fixed axes.
    pub fn body_fixed_offset(&self) -> DVec3 {
        self.offset
    }

    /// `(latitude, longitude)` in degrees.
    pub fn lat_lon(&self) -> (f64, f64) {
        (self.lat_deg, self.lon_deg)
    }

    /// Spin of the body the site sits on.
    pub fn rotation(&self) -> BodyRotation {
        self.rotation
    }

    /// World position at `t`.
    pub fn position(&self, t: f64) -> DVec3 {
        self.central.position(t) + self.rotation.to_world(t, self.offset)
    }
}

/// Position source for one body.
#[derive(Clone, Debug, PartialEq)]
pub enum PositionProvider {
    /// Closed-form circular orbit.
    Analytic(AnalyticOrbit),
    /// Interpolated from loaded samples. Shared with the drawn trajectory.
    Interpolated(Arc<Interpolant>),
    /// Attached to another body's surface.
    SurfaceFixed(SurfaceSite),
    /// Never moves.
    Fixed(DVec3),
}

impl PositionProvider {
    /// World position at `t`. Defined for every `t`.
    pub fn position(&self, t: f64) -> DVec3 {
        match self {
            PositionProvider::Analytic(orbit) => orbit.position(t),
            PositionProvider::Interpolated(interp) => interp.evaluate(t),
            PositionProvider::SurfaceFixed(site) => site.position(t),
            PositionProvider::Fixed(position) => *position,
        }
    }

    /// Natural repeat period, if the motion is periodic.
    pub fn period(&self) -> Option<f64> {
        match self {
            PositionProvider::Analytic(orbit) => orbit.period(),
            PositionProvider::Interpolated(interp) => interp.period(),
            PositionProvider::SurfaceFixed(_) | PositionProvider::Fixed(_) => None,
        }
    }

    /// Time span the provider is backed by data for, if bounded.
    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            PositionProvider::Interpolated(interp) => interp.domain(),
            _ => None,
        }
    }
}

impl From<AnalyticOrbit> for PositionProvider {
    fn from(orbit: AnalyticOrbit) -> Self {
        PositionProvider::Analytic(orbit)
    }
}

impl From<Interpolant> for PositionProvider {
    fn from(interp: Interpolant) -> Self {
        PositionProvider::Interpolated(Arc::new(interp))
    }
}
