//! Clearance probes against obstacle geometry
//!
//! Pickups must not be placed inside (or brushing) an obstacle. Each obstacle
//! describes its cross-section as a [`Footprint`], and placement probes a
//! circle of the clearance radius against it.

use glam::Vec2;

use super::arc::ArcSegment;
use super::sdf::{
    op_subtract, op_union, sd_arc, sd_capsule, sd_circle, sd_oriented_box, sdf_gradient,
};

/// One primitive of an obstacle cross-section
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
    },
    Arc(ArcSegment),
    Box {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
    },
    Capsule {
        a: Vec2,
        b: Vec2,
        radius: f32,
    },
    /// Solid disc with a box-shaped opening cut out of it
    Aperture {
        radius: f32,
        opening_center: Vec2,
        opening_half_extents: Vec2,
        angle: f32,
    },
}

impl Shape {
    pub fn distance(&self, p: Vec2) -> f32 {
        match self {
            Shape::Circle { center, radius } => sd_circle(p, *center, *radius),
            Shape::Arc(arc) => sd_arc(p, arc.theta_start, arc.theta_end, arc.radius, arc.thickness),
            Shape::Box {
                center,
                half_extents,
                angle,
            } => sd_oriented_box(p, *center, *half_extents, *angle),
            Shape::Capsule { a, b, radius } => sd_capsule(p, *a, *b, *radius),
            Shape::Aperture {
                radius,
                opening_center,
                opening_half_extents,
                angle,
            } => op_subtract(
                sd_circle(p, Vec2::ZERO, *radius),
                sd_oriented_box(p, *opening_center, *opening_half_extents, *angle),
            ),
        }
    }
}

/// Union of shapes making up one obstacle's cross-section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footprint {
    pub shapes: Vec<Shape>,
}

impl Footprint {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Signed distance to the nearest shape (`f32::MAX` when empty)
    pub fn distance(&self, p: Vec2) -> f32 {
        self.shapes
            .iter()
            .map(|s| s.distance(p))
            .fold(f32::MAX, op_union)
    }
}

/// Result of a clearance probe
#[derive(Debug, Clone)]
pub struct ClearanceResult {
    /// Whether a circle of the probe radius fits without touching geometry
    pub clear: bool,
    /// Signed distance from the probe center to the footprint
    pub distance: f32,
    /// Direction away from the nearest geometry (zero when empty)
    pub normal: Vec2,
}

impl ClearanceResult {
    pub fn open() -> Self {
        Self {
            clear: true,
            distance: f32::MAX,
            normal: Vec2::ZERO,
        }
    }
}

/// Probe a circle of `clearance` radius at `point` against `footprint`
pub fn probe_clearance(footprint: &Footprint, point: Vec2, clearance: f32) -> ClearanceResult {
    if footprint.is_empty() {
        return ClearanceResult::open();
    }
    let distance = footprint.distance(point);
    ClearanceResult {
        clear: distance > clearance,
        distance,
        normal: sdf_gradient(point, |p| footprint.distance(p)),
    }
}
