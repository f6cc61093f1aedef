//! Pickup placement engine
//!
//! Pickup-only rings are grouped into chains separated by gaps. Obstacle rings
//! skip the chain bookkeeping and roll a flat chance for a single pickup.
//! Within a chain only the first, middle and last rings may carry a powerup,
//! so the valuable rings of a chain always sit at predictable points.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::catalog::PowerupTable;
use super::collision::probe_clearance;
use super::color::TintBlock;
use super::rng::RandomSource;
use super::state::{Pickup, PickupKind, Ring};
use crate::polar_to_cartesian;
use crate::settings::PickupSettings;

/// Chain/gap bookkeeping. Never in a chain and in a gap at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PickupChainState {
    /// Rings left in the current chain
    pub remaining: u32,
    /// Planned length of the current (or last) chain
    pub length: u32,
    /// Pickup-free rings left before a new chain may start
    pub gap_remaining: u32,
}

impl PickupChainState {
    pub fn in_chain(&self) -> bool {
        self.remaining > 0
    }

    pub fn in_gap(&self) -> bool {
        self.gap_remaining > 0
    }

    /// Chain-relative index of the ring about to be filled
    pub fn chain_index(&self) -> u32 {
        self.length.saturating_sub(self.remaining)
    }

    /// First, middle (length / 2) or last ring of the chain
    pub fn is_signpost(&self) -> bool {
        if !self.in_chain() {
            return false;
        }
        let index = self.chain_index();
        index == 0 || index == self.length / 2 || self.remaining == 1
    }
}

#[derive(Debug, Clone)]
pub struct PickupEngine {
    settings: PickupSettings,
    chain: PickupChainState,
    chance_multiplier: f32,
    float_height: f32,
    next_id: u32,
}

impl PickupEngine {
    pub fn new(settings: &PickupSettings) -> Self {
        Self {
            settings: settings.clone(),
            chain: PickupChainState::default(),
            chance_multiplier: 1.0,
            float_height: settings.float_height,
            next_id: 1,
        }
    }

    /// Drop any chain or gap in progress and restart pickup ids
    pub fn reset(&mut self) {
        self.chain = PickupChainState::default();
        self.next_id = 1;
    }

    pub fn chain(&self) -> PickupChainState {
        self.chain
    }

    pub fn set_chance_multiplier(&mut self, multiplier: f32) {
        self.chance_multiplier = multiplier.max(0.0);
    }

    pub fn chance_multiplier(&self) -> f32 {
        self.chance_multiplier
    }

    pub fn set_float_height(&mut self, height: f32) {
        self.float_height = height;
    }

    pub fn float_height(&self) -> f32 {
        self.float_height
    }

    /// Whether a pickup-only ring may carry pickups, starting a chain if allowed
    pub fn ensure_pickup_chain(&mut self, rng: &mut RandomSource) -> bool {
        if self.chain.in_chain() {
            return true;
        }
        if self.chain.in_gap() {
            self.chain.gap_remaining -= 1;
            return false;
        }
        let chance = self.settings.chain_start_chance * self.chance_multiplier;
        if !rng.chance(chance) {
            return false;
        }
        let length = rng
            .range_inclusive(self.settings.chain_min, self.settings.chain_max)
            .max(1);
        log::debug!("Pickup chain of {} rings", length);
        self.chain = PickupChainState {
            remaining: length,
            length,
            gap_remaining: 0,
        };
        true
    }

    /// Count one chain ring; roll the following gap when the chain ends
    pub fn advance_pickup_chain(&mut self, rng: &mut RandomSource) {
        if !self.chain.in_chain() {
            return;
        }
        self.chain.remaining -= 1;
        if self.chain.remaining == 0 {
            self.chain.gap_remaining =
                rng.range_inclusive(self.settings.gap_min, self.settings.gap_max);
            log::debug!("Pickup chain done, gap of {}", self.chain.gap_remaining);
        }
    }

    /// Fill a pickup-only ring. Returns the kinds actually spawned.
    pub fn populate_pickup_ring(
        &mut self,
        ring: &mut Ring,
        tube_radius: f32,
        powerups: &PowerupTable,
        rng: &mut RandomSource,
    ) -> Vec<PickupKind> {
        if !self.ensure_pickup_chain(rng) {
            return Vec::new();
        }

        let signpost = self.chain.is_signpost();
        let mut spawned = Vec::new();
        for i in 0..self.settings.pickups_per_ring {
            let kind = if i == 0 && signpost && rng.chance(self.settings.powerup_spawn_chance) {
                powerups
                    .pick(rng)
                    .map(PickupKind::Powerup)
                    .unwrap_or(PickupKind::Coin)
            } else {
                PickupKind::Coin
            };
            if self.try_spawn_pickup(ring, kind, tube_radius, rng).is_some() {
                spawned.push(kind);
            }
        }

        self.advance_pickup_chain(rng);
        spawned
    }

    /// Maybe place one coin on an obstacle ring
    pub fn populate_obstacle_ring(
        &mut self,
        ring: &mut Ring,
        tube_radius: f32,
        rng: &mut RandomSource,
    ) -> Option<PickupKind> {
        let chance = self.settings.obstacle_ring_pickup_chance * self.chance_multiplier;
        if !rng.chance(chance) {
            return None;
        }
        self.try_spawn_pickup(ring, PickupKind::Coin, tube_radius, rng)
            .map(|p| p.kind)
    }

    /// Cross-section position of a slot
    pub fn slot_position(&self, slot: u32, tube_radius: f32) -> Vec2 {
        let angle = slot as f32 * TAU / self.settings.slots_per_ring.max(1) as f32;
        let radius = self.settings.radius_override.unwrap_or(tube_radius);
        // Float inward from the placement radius
        polar_to_cartesian((radius - self.float_height).max(0.0), angle)
    }

    /// Try up to `placement_attempts` random slots; gives up silently
    pub fn try_spawn_pickup(
        &mut self,
        ring: &mut Ring,
        kind: PickupKind,
        tube_radius: f32,
        rng: &mut RandomSource,
    ) -> Option<Pickup> {
        let footprint = ring
            .active_content()
            .map(|c| c.footprint())
            .unwrap_or_default();

        for _ in 0..self.settings.placement_attempts {
            let slot = rng.below(self.settings.slots_per_ring);
            if ring.slot_used(slot) {
                continue;
            }
            let point = self.slot_position(slot, tube_radius);
            if !probe_clearance(&footprint, point, self.settings.clearance_radius).clear {
                continue;
            }

            let pickup = Pickup {
                id: self.next_id,
                kind,
                slot,
                position: Vec3::new(point.x, point.y, ring.z()),
                tint: TintBlock::WHITE,
            };
            self.next_id += 1;
            ring.attach_pickup(pickup.clone());
            return Some(pickup);
        }
        None
    }
}
