//! Ring Tunnel - endless procedural tube corridor for an on-rails runner
//!
//! Core modules:
//! - `sim`: Deterministic generation (ring pool, pattern runs, pickups, color)
//! - `settings`: Data-driven generator tuning
//! - `error`: Startup and configuration diagnostics

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{GeneratorError, GeneratorResult};
pub use settings::Settings;
pub use sim::{TunnelEvent, TunnelGenerator};

use glam::Vec2;

/// Generator default constants
pub mod consts {
    /// Fixed frame timestep used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Pool defaults
    pub const POOL_SIZE: usize = 10;
    pub const RING_INTERVAL: f32 = 18.0;
    pub const RECYCLE_BEHIND_DISTANCE: f32 = 24.0;
    pub const SIDE_COUNT: u32 = 6;

    /// Tube cross-section
    pub const TUBE_RADIUS: f32 = 6.0;

    /// Difficulty ramp: difficulty01 reaches 1.0 after this many minutes
    pub const RAMP_MINUTES: f32 = 5.0;

    /// Pickup placement
    pub const PICKUP_SLOTS: u32 = 8;
    pub const PLACEMENT_ATTEMPTS: u32 = 4;
    pub const PICKUP_CLEARANCE: f32 = 0.9;
    pub const PICKUP_FLOAT_HEIGHT: f32 = 1.2;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle (radians) of a discrete rotation slot around the tube axis
#[inline]
pub fn slot_angle(slot: u32, side_count: u32) -> f32 {
    if side_count == 0 {
        return 0.0;
    }
    slot as f32 * std::f32::consts::TAU / side_count as f32
}

/// Step a rotation slot, wrapping with a positive modulo
#[inline]
pub fn wrap_slot(slot: u32, delta: i64, side_count: u32) -> u32 {
    if side_count == 0 {
        return 0;
    }
    (slot as i64 + delta).rem_euclid(side_count as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_slot_negative() {
        assert_eq!(wrap_slot(0, -1, 6), 5);
        assert_eq!(wrap_slot(1, -8, 6), 5);
        assert_eq!(wrap_slot(5, 3, 6), 2);
        assert_eq!(wrap_slot(3, 0, 6), 3);
    }

    #[test]
    fn test_slot_angle() {
        assert!((slot_angle(3, 6) - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(slot_angle(0, 8), 0.0);
        assert_eq!(slot_angle(4, 0), 0.0);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f32::consts::PI;
        assert!((normalize_angle(3.0 * PI) - -PI).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0) - -PI / 2.0).abs() < 1e-6);
    }
}
