//! Signed distance functions for obstacle cross-sections
//!
//! Negative inside, positive outside. Distances are in the tube's
//! cross-section plane, centered on the tube axis.

use glam::Vec2;
use std::f32::consts::TAU;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an arc band (inner to outer radius, theta_start to theta_end)
pub fn sd_arc(p: Vec2, theta_start: f32, theta_end: f32, radius: f32, thickness: f32) -> f32 {
    let r = p.length();
    let angle = p.y.atan2(p.x);

    let mut angle_diff = angle - theta_start;
    angle_diff -= (angle_diff / TAU).round() * TAU;

    let mut span = theta_end - theta_start;
    span -= (span / TAU).round() * TAU;
    if span <= 0.0 {
        span += TAU;
    }

    if angle_diff < 0.0 {
        angle_diff += TAU;
    }

    let in_arc = angle_diff <= span;
    let half_thick = thickness * 0.5;

    if in_arc {
        (r - radius).abs() - half_thick
    } else {
        // Distance to the end caps
        let p1 = Vec2::new(theta_start.cos(), theta_start.sin()) * radius;
        let p2 = Vec2::new(theta_end.cos(), theta_end.sin()) * radius;
        let d1 = (p - p1).length() - half_thick;
        let d2 = (p - p2).length() - half_thick;
        d1.min(d2)
    }
}

/// Signed distance to a box rotated by `angle` around its center
pub fn sd_oriented_box(p: Vec2, center: Vec2, half_extents: Vec2, angle: f32) -> f32 {
    // Into the box's local frame
    let local = Vec2::from_angle(-angle).rotate(p - center);
    let d = local.abs() - half_extents;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

/// Signed distance to a capsule around segment a-b
pub fn sd_capsule(p: Vec2, a: Vec2, b: Vec2, radius: f32) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let len_sq = ba.length_squared();
    let h = if len_sq < 1e-8 {
        0.0
    } else {
        (pa.dot(ba) / len_sq).clamp(0.0, 1.0)
    };
    (pa - ba * h).length() - radius
}

/// Union of two shapes
#[inline]
pub fn op_union(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// Shape `a` with shape `b` cut out of it
#[inline]
pub fn op_subtract(a: f32, b: f32) -> f32 {
    a.max(-b)
}

/// Compute SDF gradient (outward normal) using central differences
pub fn sdf_gradient<F>(p: Vec2, sdf: F) -> Vec2
where
    F: Fn(Vec2) -> f32,
{
    let eps = 0.01;
    let dx = sdf(p + Vec2::new(eps, 0.0)) - sdf(p - Vec2::new(eps, 0.0));
    let dy = sdf(p + Vec2::new(0.0, eps)) - sdf(p - Vec2::new(0.0, eps));
    Vec2::new(dx, dy).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_sd_circle() {
        assert!((sd_circle(Vec2::new(3.0, 0.0), Vec2::ZERO, 1.0) - 2.0).abs() < 1e-5);
        assert!(sd_circle(Vec2::ZERO, Vec2::ZERO, 1.0) < 0.0);
    }

    #[test]
    fn test_sd_arc_inside_and_outside() {
        let inside = Vec2::new(5.0, 0.1);
        assert!(sd_arc(inside, -0.5, 0.5, 5.0, 1.0) < 0.0);
        let behind = Vec2::new(-5.0, 0.0);
        assert!(sd_arc(behind, -0.5, 0.5, 5.0, 1.0) > 5.0);
    }

    #[test]
    fn test_oriented_box_rotation() {
        // Long thin box along +y after rotating by 90°
        let half = Vec2::new(4.0, 0.25);
        let on_y = Vec2::new(0.0, 3.0);
        assert!(sd_oriented_box(on_y, Vec2::ZERO, half, PI / 2.0) < 0.0);
        assert!(sd_oriented_box(on_y, Vec2::ZERO, half, 0.0) > 2.0);
    }

    #[test]
    fn test_capsule_distance() {
        let d = sd_capsule(Vec2::new(1.0, 2.0), Vec2::ZERO, Vec2::new(2.0, 0.0), 0.5);
        assert!((d - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_subtract_opens_hole() {
        let p = Vec2::ZERO;
        let disc = sd_circle(p, Vec2::ZERO, 5.0);
        let hole = sd_circle(p, Vec2::ZERO, 1.0);
        assert!(op_subtract(disc, hole) > 0.0);
        assert!(op_union(disc, hole) < 0.0);
    }

    #[test]
    fn test_gradient_points_outward() {
        let n = sdf_gradient(Vec2::new(2.0, 0.0), |p| sd_circle(p, Vec2::ZERO, 1.0));
        assert!((n - Vec2::X).length() < 1e-3);
    }
}
