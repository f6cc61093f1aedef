//! Arc segment geometry for wedge obstacles
//!
//! In the tube's cross-section plane an arc segment is defined by:
//! - radius: distance from the tube axis to the band's centerline
//! - thickness: radial extent (inner = radius - thickness/2, outer = radius + thickness/2)
//! - theta_start, theta_end: angular extent

use serde::{Deserialize, Serialize};

use crate::normalize_angle;

/// A thickened arc segment in the cross-section plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    /// Centerline radius from the tube axis
    pub radius: f32,
    /// Radial thickness (extends radius ± thickness/2)
    pub thickness: f32,
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl ArcSegment {
    pub fn new(radius: f32, thickness: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            radius,
            thickness,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Band hugging the tube wall, centered on `center_theta`
    pub fn against_wall(tube_radius: f32, depth: f32, center_theta: f32, span: f32) -> Self {
        let depth = depth.clamp(0.0, tube_radius);
        Self::new(
            tube_radius - depth / 2.0,
            depth,
            center_theta - span / 2.0,
            center_theta + span / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar_to_cartesian;
    use crate::sim::sdf::sd_arc;
    use std::f32::consts::PI;

    fn distance(arc: &ArcSegment, r: f32, theta: f32) -> f32 {
        sd_arc(
            polar_to_cartesian(r, theta),
            arc.theta_start,
            arc.theta_end,
            arc.radius,
            arc.thickness,
        )
    }

    #[test]
    fn test_against_wall_hugs_tube() {
        let arc = ArcSegment::against_wall(6.0, 2.0, PI / 2.0, PI / 3.0);
        assert!((arc.radius - 5.0).abs() < 1e-5);
        assert!((arc.thickness - 2.0).abs() < 1e-5);
        assert!((arc.theta_start - PI / 3.0).abs() < 1e-5);
        assert!((arc.theta_end - 2.0 * PI / 3.0).abs() < 1e-5);
        assert!(distance(&arc, 5.0, PI / 2.0) < 0.0);
        assert!(distance(&arc, 5.0, -PI / 2.0) > 0.0);
    }

    #[test]
    fn test_against_wall_clamps_depth() {
        let arc = ArcSegment::against_wall(6.0, 9.0, 0.0, 0.5);
        assert!((arc.thickness - 6.0).abs() < 1e-5);
        assert!((arc.radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_wraparound_angles_normalized() {
        // Centered on the seam at +/- pi
        let arc = ArcSegment::against_wall(6.0, 1.0, PI, PI / 6.0);
        assert!(arc.theta_start >= -PI && arc.theta_start < PI);
        assert!(arc.theta_end >= -PI && arc.theta_end < PI);
        assert!(arc.theta_start > arc.theta_end);
        assert!(distance(&arc, 5.5, PI) < 0.0);
        assert!(distance(&arc, 5.5, 0.0) > 0.0);
    }
}
