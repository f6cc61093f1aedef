//! Obstacle content and behaviors
//!
//! A content template is the authored "prefab" for an archetype. Instantiating
//! it yields an [`ObstacleContent`] owned by exactly one ring slot. The
//! behavior variant is chosen once at instantiation; per-frame work is a plain
//! `tick` on that variant.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arc::ArcSegment;
use super::collision::{Footprint, Shape};
use crate::polar_to_cartesian;

/// Obstacle families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Fan,
    Laser,
    Door,
    Wedge,
}

/// Authored shape parameters per obstacle family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateShape {
    Fan {
        blades: u32,
        /// Blade length as a fraction of the tube radius
        blade_length: f32,
        blade_width: f32,
        /// Spin speed (radians/sec) at difficulty 0 and 1
        spin_min: f32,
        spin_max: f32,
    },
    Laser {
        beam_width: f32,
        /// Pulse cycles per second at difficulty 0 and 1
        pulse_min: f32,
        pulse_max: f32,
    },
    Door {
        opening_width: f32,
        /// Opening depth as a fraction of the tube radius
        opening_depth: f32,
        /// Sway amplitude (radians) and base sway speed (radians/sec)
        sway_amplitude: f32,
        sway_speed: f32,
    },
    Wedge {
        /// Angular span (radians)
        span: f32,
        /// Radial depth as a fraction of the tube radius
        depth: f32,
    },
}

impl TemplateShape {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            TemplateShape::Fan { .. } => ObstacleKind::Fan,
            TemplateShape::Laser { .. } => ObstacleKind::Laser,
            TemplateShape::Door { .. } => ObstacleKind::Door,
            TemplateShape::Wedge { .. } => ObstacleKind::Wedge,
        }
    }
}

/// Authored content template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub id: String,
    pub shape: TemplateShape,
}

/// All templates the catalog may reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentLibrary {
    pub templates: Vec<ObstacleTemplate>,
}

impl ContentLibrary {
    pub fn new(templates: Vec<ObstacleTemplate>) -> Self {
        Self { templates }
    }

    /// Templates for the four stock archetypes
    pub fn standard() -> Self {
        Self::new(vec![
            ObstacleTemplate {
                id: "fan".into(),
                shape: TemplateShape::Fan {
                    blades: 3,
                    blade_length: 0.85,
                    blade_width: 0.6,
                    spin_min: 0.8,
                    spin_max: 2.6,
                },
            },
            ObstacleTemplate {
                id: "laser".into(),
                shape: TemplateShape::Laser {
                    beam_width: 0.3,
                    pulse_min: 0.5,
                    pulse_max: 1.6,
                },
            },
            ObstacleTemplate {
                id: "door".into(),
                shape: TemplateShape::Door {
                    opening_width: 3.0,
                    opening_depth: 0.6,
                    sway_amplitude: 0.35,
                    sway_speed: 1.2,
                },
            },
            ObstacleTemplate {
                id: "wedge".into(),
                shape: TemplateShape::Wedge {
                    span: PI * 2.0 / 3.0,
                    depth: 0.45,
                },
            },
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ObstacleTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Spinning blades radiating from the tube axis
#[derive(Debug, Clone, PartialEq)]
pub struct FanBehavior {
    blades: u32,
    blade_length: f32,
    blade_width: f32,
    spin_min: f32,
    spin_max: f32,
    tube_radius: f32,
    base_rotation: f32,
    /// Accumulated spin on top of the placement rotation
    pub spin: f32,
}

impl FanBehavior {
    pub fn spin_speed(&self, difficulty01: f32) -> f32 {
        lerp(self.spin_min, self.spin_max, difficulty01)
    }

    fn footprint(&self) -> Footprint {
        let length = self.blade_length * self.tube_radius;
        let shapes = (0..self.blades.max(1))
            .map(|i| {
                let theta = self.base_rotation + self.spin + i as f32 * TAU / self.blades.max(1) as f32;
                Shape::Capsule {
                    a: Vec2::ZERO,
                    b: polar_to_cartesian(length, theta),
                    radius: self.blade_width / 2.0,
                }
            })
            .collect();
        Footprint::new(shapes)
    }
}

/// A pulsing beam spanning the tube diameter
#[derive(Debug, Clone, PartialEq)]
pub struct LaserBehavior {
    beam_width: f32,
    pulse_min: f32,
    pulse_max: f32,
    tube_radius: f32,
    rotation: f32,
    /// Pulse phase in radians
    pub phase: f32,
}

impl LaserBehavior {
    pub fn pulse_rate(&self, difficulty01: f32) -> f32 {
        lerp(self.pulse_min, self.pulse_max, difficulty01)
    }

    /// Beam is live on the positive half of the pulse
    pub fn is_firing(&self) -> bool {
        self.phase.sin() >= 0.0
    }

    fn footprint(&self) -> Footprint {
        // Geometry is probed whether or not the beam is live
        Footprint::new(vec![Shape::Box {
            center: Vec2::ZERO,
            half_extents: Vec2::new(self.tube_radius, self.beam_width / 2.0),
            angle: self.rotation,
        }])
    }
}

/// A wall filling the tube except for one opening near the wall
#[derive(Debug, Clone, PartialEq)]
pub struct DoorBehavior {
    opening_width: f32,
    opening_depth: f32,
    sway_amplitude: f32,
    sway_speed: f32,
    tube_radius: f32,
    rotation: f32,
    pub sway_phase: f32,
}

impl DoorBehavior {
    /// Current angle of the opening's center
    pub fn opening_angle(&self) -> f32 {
        self.rotation + self.sway_phase.sin() * self.sway_amplitude
    }

    fn footprint(&self) -> Footprint {
        let depth = self.opening_depth * self.tube_radius;
        let angle = self.opening_angle();
        Footprint::new(vec![Shape::Aperture {
            radius: self.tube_radius,
            // Extends past the wall so the opening reaches it
            opening_center: polar_to_cartesian(self.tube_radius - depth / 2.0 + 0.5, angle),
            opening_half_extents: Vec2::new(depth / 2.0 + 0.5, self.opening_width / 2.0),
            angle,
        }])
    }
}

/// A static band against the tube wall
#[derive(Debug, Clone, PartialEq)]
pub struct WedgeBehavior {
    span: f32,
    depth: f32,
    pub arc: ArcSegment,
}

/// Behavior variant, selected once when content is instantiated
#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleBehavior {
    Fan(FanBehavior),
    Laser(LaserBehavior),
    Door(DoorBehavior),
    Wedge(WedgeBehavior),
}

impl ObstacleBehavior {
    fn from_template(shape: &TemplateShape) -> Self {
        match *shape {
            TemplateShape::Fan {
                blades,
                blade_length,
                blade_width,
                spin_min,
                spin_max,
            } => ObstacleBehavior::Fan(FanBehavior {
                blades,
                blade_length,
                blade_width,
                spin_min,
                spin_max,
                tube_radius: 0.0,
                base_rotation: 0.0,
                spin: 0.0,
            }),
            TemplateShape::Laser {
                beam_width,
                pulse_min,
                pulse_max,
            } => ObstacleBehavior::Laser(LaserBehavior {
                beam_width,
                pulse_min,
                pulse_max,
                tube_radius: 0.0,
                rotation: 0.0,
                phase: 0.0,
            }),
            TemplateShape::Door {
                opening_width,
                opening_depth,
                sway_amplitude,
                sway_speed,
            } => ObstacleBehavior::Door(DoorBehavior {
                opening_width,
                opening_depth,
                sway_amplitude,
                sway_speed,
                tube_radius: 0.0,
                rotation: 0.0,
                sway_phase: 0.0,
            }),
            TemplateShape::Wedge { span, depth } => ObstacleBehavior::Wedge(WedgeBehavior {
                span,
                depth,
                arc: ArcSegment::new(0.0, 0.0, 0.0, 0.0),
            }),
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self {
            ObstacleBehavior::Fan(_) => ObstacleKind::Fan,
            ObstacleBehavior::Laser(_) => ObstacleKind::Laser,
            ObstacleBehavior::Door(_) => ObstacleKind::Door,
            ObstacleBehavior::Wedge(_) => ObstacleKind::Wedge,
        }
    }

    /// Place at `rotation` inside a tube of `tube_radius`, resetting animation
    pub fn configure(&mut self, rotation: f32, tube_radius: f32) {
        match self {
            ObstacleBehavior::Fan(fan) => {
                fan.tube_radius = tube_radius;
                fan.base_rotation = rotation;
                fan.spin = 0.0;
            }
            ObstacleBehavior::Laser(laser) => {
                laser.tube_radius = tube_radius;
                laser.rotation = rotation;
                laser.phase = 0.0;
            }
            ObstacleBehavior::Door(door) => {
                door.tube_radius = tube_radius;
                door.rotation = rotation;
                door.sway_phase = 0.0;
            }
            ObstacleBehavior::Wedge(wedge) => {
                wedge.arc = ArcSegment::against_wall(
                    tube_radius,
                    wedge.depth * tube_radius,
                    rotation,
                    wedge.span,
                );
            }
        }
    }

    pub fn tick(&mut self, dt: f32, difficulty01: f32) {
        match self {
            ObstacleBehavior::Fan(fan) => {
                fan.spin = (fan.spin + fan.spin_speed(difficulty01) * dt) % TAU;
            }
            ObstacleBehavior::Laser(laser) => {
                laser.phase = (laser.phase + laser.pulse_rate(difficulty01) * TAU * dt) % TAU;
            }
            ObstacleBehavior::Door(door) => {
                let speed = door.sway_speed * (1.0 + difficulty01);
                door.sway_phase = (door.sway_phase + speed * dt) % TAU;
            }
            ObstacleBehavior::Wedge(_) => {}
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            ObstacleBehavior::Fan(fan) => fan.footprint(),
            ObstacleBehavior::Laser(laser) => laser.footprint(),
            ObstacleBehavior::Door(door) => door.footprint(),
            ObstacleBehavior::Wedge(wedge) => Footprint::new(vec![Shape::Arc(wedge.arc.clone())]),
        }
    }

    /// Renderable surfaces this content contributes to its ring
    pub fn surface_count(&self) -> u8 {
        match self {
            // Hub plus one surface per blade
            ObstacleBehavior::Fan(fan) => 1 + fan.blades.min(254) as u8,
            // Two emitters and the beam
            ObstacleBehavior::Laser(_) => 3,
            // Two panels
            ObstacleBehavior::Door(_) => 2,
            ObstacleBehavior::Wedge(_) => 1,
        }
    }
}

/// Obstacle instance owned by one ring slot
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleContent {
    /// Template this instance was built from
    pub template: String,
    /// Archetype that last configured it
    pub archetype: String,
    pub behavior: ObstacleBehavior,
    /// Placement rotation (radians)
    pub rotation: f32,
    /// Inactive content stays in the slot for reuse but has no geometry
    pub active: bool,
}

impl ObstacleContent {
    pub fn instantiate(template: &ObstacleTemplate, archetype: &str) -> Self {
        Self {
            template: template.id.clone(),
            archetype: archetype.to_string(),
            behavior: ObstacleBehavior::from_template(&template.shape),
            rotation: 0.0,
            active: false,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        self.behavior.kind()
    }

    pub fn configure(&mut self, archetype: &str, rotation: f32, tube_radius: f32) {
        archetype.clone_into(&mut self.archetype);
        self.rotation = rotation;
        self.behavior.configure(rotation, tube_radius);
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn tick(&mut self, dt: f32, difficulty01: f32) {
        if self.active {
            self.behavior.tick(dt, difficulty01);
        }
    }

    pub fn footprint(&self) -> Footprint {
        if self.active {
            self.behavior.footprint()
        } else {
            Footprint::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::probe_clearance;

    fn content(id: &str) -> ObstacleContent {
        let library = ContentLibrary::standard();
        ObstacleContent::instantiate(library.get(id).unwrap(), id)
    }

    #[test]
    fn test_standard_library_covers_kinds() {
        let library = ContentLibrary::standard();
        for (id, kind) in [
            ("fan", ObstacleKind::Fan),
            ("laser", ObstacleKind::Laser),
            ("door", ObstacleKind::Door),
            ("wedge", ObstacleKind::Wedge),
        ] {
            assert_eq!(library.get(id).unwrap().shape.kind(), kind);
        }
        assert!(library.get("saw").is_none());
    }

    #[test]
    fn test_inactive_content_has_no_geometry() {
        let mut wedge = content("wedge");
        assert!(wedge.footprint().is_empty());
        wedge.configure("wedge", 0.0, 6.0);
        assert!(!wedge.footprint().is_empty());
        wedge.deactivate();
        assert!(wedge.footprint().is_empty());
    }

    #[test]
    fn test_fan_spin_scales_with_difficulty() {
        let mut easy = content("fan");
        let mut hard = content("fan");
        easy.configure("fan", 0.0, 6.0);
        hard.configure("fan", 0.0, 6.0);
        easy.tick(0.1, 0.0);
        hard.tick(0.1, 1.0);
        let (ObstacleBehavior::Fan(e), ObstacleBehavior::Fan(h)) = (&easy.behavior, &hard.behavior)
        else {
            panic!("expected fans");
        };
        assert!(h.spin > e.spin);
        assert!((e.spin - 0.08).abs() < 1e-5);
    }

    #[test]
    fn test_laser_pulse_rate_interpolates() {
        let mut laser = content("laser");
        laser.configure("laser", 0.0, 6.0);
        let ObstacleBehavior::Laser(beam) = &laser.behavior else {
            panic!("expected laser");
        };
        assert!((beam.pulse_rate(0.5) - 1.05).abs() < 1e-5);
        assert!(beam.is_firing());
    }

    #[test]
    fn test_configure_resets_animation() {
        let mut door = content("door");
        door.configure("door", 1.0, 6.0);
        door.tick(0.5, 0.0);
        door.configure("door", 2.0, 6.0);
        let ObstacleBehavior::Door(d) = &door.behavior else {
            panic!("expected door");
        };
        assert_eq!(d.sway_phase, 0.0);
        assert!((d.opening_angle() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reconfigure_takes_new_archetype() {
        let mut wedge = content("wedge");
        wedge.configure("wedge", 0.0, 6.0);
        assert_eq!(wedge.archetype, "wedge");
        wedge.configure("narrow_wedge", 1.0, 6.0);
        assert_eq!(wedge.archetype, "narrow_wedge");
        assert_eq!(wedge.template, "wedge");
        assert!(wedge.active);
    }

    #[test]
    fn test_wedge_blocks_its_slot_only() {
        let mut wedge = content("wedge");
        wedge.configure("wedge", 0.0, 6.0);
        let footprint = wedge.footprint();
        assert!(!probe_clearance(&footprint, polar_to_cartesian(5.0, 0.0), 0.5).clear);
        assert!(probe_clearance(&footprint, polar_to_cartesian(5.0, PI), 0.5).clear);
    }

    #[test]
    fn test_door_opening_follows_rotation() {
        let mut door = content("door");
        door.configure("door", PI / 2.0, 6.0);
        let footprint = door.footprint();
        assert!(probe_clearance(&footprint, polar_to_cartesian(5.0, PI / 2.0), 0.5).clear);
        assert!(!probe_clearance(&footprint, polar_to_cartesian(3.0, -PI / 2.0), 0.5).clear);
    }

    #[test]
    fn test_surface_counts() {
        assert_eq!(content("fan").behavior.surface_count(), 4);
        assert_eq!(content("laser").behavior.surface_count(), 3);
        assert_eq!(content("wedge").behavior.surface_count(), 1);
    }
}
