//! Ring slots, pickups and generator events
//!
//! A [`Ring`] is created once per pool slot and then repositioned and
//! reconfigured in place for the rest of the session.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::catalog::PowerupKind;
use super::color::{RingPalette, TintBlock};
use super::obstacle::ObstacleContent;

/// Index of a ring slot in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RingHandle(pub usize);

/// The traveler as seen by the generator (read each frame, never written)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traveler {
    /// Position along the travel axis
    pub z: f32,
    pub tube_radius: f32,
}

impl Traveler {
    pub fn new(z: f32, tube_radius: f32) -> Self {
        Self { z, tube_radius }
    }

    pub fn advance(&mut self, distance: f32) {
        self.z += distance;
    }
}

/// What a pickup is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    Powerup(PowerupKind),
}

/// A pickup attached to a ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    /// Angular slot on the ring
    pub slot: u32,
    pub position: Vec3,
    /// Accent color, written by the color pass
    pub tint: TintBlock,
}

/// Which part of a ring a surface belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfacePart {
    Wall,
    Obstacle(u8),
}

/// Cached renderable surface with its color override
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOverride {
    pub part: SurfacePart,
    pub tint: TintBlock,
}

/// Outbound notifications, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TunnelEvent {
    /// An obstacle ring fell behind the traveler and was recycled
    RingPassed { ring: RingHandle, archetype: String },
    /// A new obstacle run was selected
    RunStarted {
        archetype: String,
        length: u32,
        level: u32,
    },
    PickupSpawned { ring: RingHandle, kind: PickupKind },
    /// The whole pool was rebuilt for a new side count
    Rebuilt { side_count: u32 },
}

/// One cross-sectional slice of the tube
#[derive(Debug, Clone)]
pub struct Ring {
    pub handle: RingHandle,
    z: f32,
    /// Spawn ordinal; drives light/dark alternation
    sequence: u64,
    is_obstacle: bool,
    /// Catalog index of the archetype on this ring
    archetype: Option<usize>,
    dissolve_started: f32,
    dissolving_until: Option<f32>,
    content: Option<ObstacleContent>,
    surfaces: Vec<SurfaceOverride>,
    pickups: Vec<Pickup>,
}

impl Ring {
    pub fn new(handle: RingHandle) -> Self {
        let mut ring = Self {
            handle,
            z: 0.0,
            sequence: 0,
            is_obstacle: false,
            archetype: None,
            dissolve_started: 0.0,
            dissolving_until: None,
            content: None,
            surfaces: Vec::new(),
            pickups: Vec::new(),
        };
        ring.refresh_surfaces();
        ring
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_obstacle(&self) -> bool {
        self.is_obstacle
    }

    pub fn archetype(&self) -> Option<usize> {
        self.archetype
    }

    pub fn is_dissolving(&self) -> bool {
        self.dissolving_until.is_some()
    }

    pub fn dissolving_until(&self) -> Option<f32> {
        self.dissolving_until
    }

    /// Fade progress in [0, 1] at time `now`; zero when not dissolving
    pub fn dissolve_progress(&self, now: f32) -> f32 {
        match self.dissolving_until {
            Some(until) => {
                let duration = until - self.dissolve_started;
                if duration <= 0.0 {
                    1.0
                } else {
                    ((now - self.dissolve_started) / duration).clamp(0.0, 1.0)
                }
            }
            None => 0.0,
        }
    }

    pub fn content(&self) -> Option<&ObstacleContent> {
        self.content.as_ref()
    }

    /// Active obstacle content, if any
    pub fn active_content(&self) -> Option<&ObstacleContent> {
        self.content.as_ref().filter(|c| c.active)
    }

    pub fn surfaces(&self) -> &[SurfaceOverride] {
        &self.surfaces
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn slot_used(&self, slot: u32) -> bool {
        self.pickups.iter().any(|p| p.slot == slot)
    }

    pub(crate) fn place(&mut self, z: f32, sequence: u64) {
        self.z = z;
        self.sequence = sequence;
    }

    pub(crate) fn clear_pickups(&mut self) {
        self.pickups.clear();
    }

    pub(crate) fn attach_pickup(&mut self, pickup: Pickup) {
        self.pickups.push(pickup);
    }

    /// Content slot for in-place reuse or replacement
    pub(crate) fn content_mut(&mut self) -> &mut Option<ObstacleContent> {
        &mut self.content
    }

    pub(crate) fn mark_obstacle(&mut self, archetype: usize) {
        self.is_obstacle = true;
        self.archetype = Some(archetype);
        self.refresh_surfaces();
    }

    /// Plain ring: content stays in the slot but is inactive
    pub(crate) fn mark_plain(&mut self) {
        self.is_obstacle = false;
        self.archetype = None;
        if let Some(content) = self.content.as_mut() {
            content.deactivate();
        }
        self.refresh_surfaces();
    }

    pub(crate) fn begin_dissolve(&mut self, now: f32, duration: f32) {
        self.dissolve_started = now;
        self.dissolving_until = Some(now + duration.max(0.0));
    }

    /// Clear the dissolve if its fade has elapsed; returns true when it did
    pub(crate) fn finish_dissolve(&mut self, now: f32) -> bool {
        match self.dissolving_until {
            Some(until) if now >= until => {
                self.dissolving_until = None;
                self.mark_plain();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel_dissolve(&mut self) {
        self.dissolving_until = None;
    }

    pub(crate) fn tick_content(&mut self, dt: f32, difficulty01: f32) {
        if let Some(content) = self.content.as_mut() {
            content.tick(dt, difficulty01);
        }
    }

    /// Rebuild the cached surface list from the current content
    fn refresh_surfaces(&mut self) {
        let wall_tint = self
            .surfaces
            .first()
            .map(|s| s.tint)
            .unwrap_or(TintBlock::WHITE);
        self.surfaces.clear();
        self.surfaces.push(SurfaceOverride {
            part: SurfacePart::Wall,
            tint: wall_tint,
        });
        if let Some(content) = self.content.as_ref().filter(|c| c.active) {
            for i in 0..content.behavior.surface_count() {
                self.surfaces.push(SurfaceOverride {
                    part: SurfacePart::Obstacle(i),
                    tint: wall_tint,
                });
            }
        }
    }

    pub(crate) fn apply_palette(&mut self, palette: &RingPalette) {
        let wall: TintBlock = palette.wall(self.sequence).into();
        let accent: TintBlock = palette.accent.into();
        for surface in self.surfaces.iter_mut() {
            surface.tint = match surface.part {
                SurfacePart::Wall => wall,
                SurfacePart::Obstacle(_) => accent,
            };
        }
        for pickup in self.pickups.iter_mut() {
            pickup.tint = accent;
        }
    }

    /// Current wall color
    pub fn wall_color(&self) -> Vec4 {
        self.surfaces
            .first()
            .map(|s| Vec4::from_array(s.tint.color))
            .unwrap_or(Vec4::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ContentLibrary;

    fn fan_content() -> ObstacleContent {
        let library = ContentLibrary::standard();
        ObstacleContent::instantiate(library.get("fan").unwrap(), "fan")
    }

    #[test]
    fn test_new_ring_has_wall_surface() {
        let ring = Ring::new(RingHandle(0));
        assert_eq!(ring.surfaces().len(), 1);
        assert_eq!(ring.surfaces()[0].part, SurfacePart::Wall);
        assert!(!ring.is_obstacle());
    }

    #[test]
    fn test_surface_cache_follows_content() {
        let mut ring = Ring::new(RingHandle(3));
        let mut content = fan_content();
        content.configure("fan", 0.0, 6.0);
        *ring.content_mut() = Some(content);
        ring.mark_obstacle(0);
        assert_eq!(ring.surfaces().len(), 5);

        ring.mark_plain();
        assert_eq!(ring.surfaces().len(), 1);
        assert!(ring.content().is_some());
        assert!(ring.active_content().is_none());
    }

    #[test]
    fn test_dissolve_lifecycle() {
        let mut ring = Ring::new(RingHandle(1));
        ring.begin_dissolve(2.0, 0.4);
        assert!(ring.is_dissolving());
        assert!((ring.dissolve_progress(2.2) - 0.5).abs() < 1e-5);
        assert!(!ring.finish_dissolve(2.3));
        assert!(ring.finish_dissolve(2.4));
        assert!(!ring.is_dissolving());
        assert_eq!(ring.dissolve_progress(3.0), 0.0);
    }

    #[test]
    fn test_apply_palette_by_parity() {
        let palette = RingPalette {
            base: Vec4::new(1.0, 0.0, 0.0, 1.0),
            dark: Vec4::new(0.5, 0.0, 0.0, 1.0),
            accent: Vec4::new(0.0, 1.0, 0.0, 1.0),
        };
        let mut even = Ring::new(RingHandle(0));
        let mut odd = Ring::new(RingHandle(1));
        even.place(18.0, 4);
        odd.place(36.0, 5);
        even.apply_palette(&palette);
        odd.apply_palette(&palette);
        assert_eq!(even.wall_color(), palette.base);
        assert_eq!(odd.wall_color(), palette.dark);
    }

    #[test]
    fn test_pickups_take_accent() {
        let palette = RingPalette {
            base: Vec4::new(1.0, 0.0, 0.0, 1.0),
            dark: Vec4::new(0.5, 0.0, 0.0, 1.0),
            accent: Vec4::new(0.0, 0.0, 1.0, 1.0),
        };
        let mut ring = Ring::new(RingHandle(2));
        ring.attach_pickup(Pickup {
            id: 1,
            kind: PickupKind::Coin,
            slot: 3,
            position: Vec3::new(0.0, 4.8, 18.0),
            tint: TintBlock::WHITE,
        });
        ring.apply_palette(&palette);
        assert_eq!(ring.pickups()[0].tint, TintBlock::from(palette.accent));
        assert_eq!(ring.wall_color(), palette.base);
    }
}
