//! Spin of a body about its tilted polar axis.

use glam::{DQuat, DVec3};

/// Uniform spin: orientation at `t` is `Rz(rate * t) * Rx(tilt)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRotation {
    /// Spin rate in radians per unit time.
    pub rate: f64,
    /// Axial tilt in radians.
    pub tilt: f64,
}

impl Default for BodyRotation {
    fn default() -> Self {
        Self::NONE
    }
}

impl BodyRotation {
    /// No spin, no tilt.
    pub const NONE: Self = Self {
        rate: 0.0,
        tilt: 0.0,
    };

    /// One revolution per `period` time units with a tilt in degrees.
    pub fn from_period(period: f64, tilt_deg: f64) -> Self {
        let rate = if period.abs() > f64::EPSILON {
            std::f64::consts::TAU / period
        } else {
            0.0
        };
        Self {
            rate,
            tilt: tilt_deg.to_radians(),
        }
    }

    /// Body-to-world orientation at time `t`.
    pub fn orientation(&self, t: f64) -> DQuat {
        DQuat::from_rotation_z(self.rate * t) * DQuat::from_rotation_x(self.tilt)
    }

    /// Rotate a body-fixed vector into world axes at time `t`.
    pub fn to_world(&self, t: f64, local: DVec3) -> DVec3 {
        self.orientation(t) * local
    }

    /// Rotate a world-axes vector into the body frame at time `t`.
    pub fn to_local(&self, t: f64, world: DVec3) -> DVec3 {
        self.orientation(t).inverse() * world
    }
}
