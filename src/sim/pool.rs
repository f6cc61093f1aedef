//! Ring pool and recycler
//!
//! A fixed arena of ring slots addressed by [`RingHandle`]. Slots are never
//! created or destroyed after construction; recycling moves a slot that fell
//! behind the traveler to the front of the tube.

use super::state::{Ring, RingHandle};
use crate::settings::PoolSettings;

/// Result of moving one ring to the front
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recycled {
    pub handle: RingHandle,
    pub old_z: f32,
    pub new_z: f32,
    pub was_obstacle: bool,
}

#[derive(Debug, Clone)]
pub struct RingPool {
    rings: Vec<Ring>,
    ring_interval: f32,
    recycle_behind_distance: f32,
    /// Position of the ring spawned furthest ahead
    furthest_z: f32,
    next_sequence: u64,
}

impl RingPool {
    pub fn new(settings: &PoolSettings) -> Self {
        let rings = (0..settings.size.max(1))
            .map(|i| Ring::new(RingHandle(i)))
            .collect();
        Self {
            rings,
            ring_interval: settings.ring_interval,
            recycle_behind_distance: settings.recycle_behind_distance,
            furthest_z: 0.0,
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn ring_interval(&self) -> f32 {
        self.ring_interval
    }

    pub fn furthest_z(&self) -> f32 {
        self.furthest_z
    }

    pub fn get(&self, handle: RingHandle) -> Option<&Ring> {
        self.rings.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: RingHandle) -> Option<&mut Ring> {
        self.rings.get_mut(handle.0)
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn rings_mut(&mut self) -> &mut [Ring] {
        &mut self.rings
    }

    /// Restart spawn ordinals; the next layout begins at zero
    pub fn reset_sequence(&mut self) {
        self.next_sequence = 0;
    }

    /// Place every slot ahead of `origin`, one interval apart.
    ///
    /// Returns handles in ascending z order. Pickups and dissolves are dropped.
    pub fn layout(&mut self, origin: f32) -> Vec<RingHandle> {
        for (i, ring) in self.rings.iter_mut().enumerate() {
            let z = origin + self.ring_interval * (i as f32 + 1.0);
            ring.place(z, self.next_sequence);
            ring.clear_pickups();
            ring.cancel_dissolve();
            self.next_sequence += 1;
        }
        self.furthest_z = origin + self.ring_interval * self.rings.len() as f32;
        log::info!(
            "Laid out {} rings from z={} to z={}",
            self.rings.len(),
            origin + self.ring_interval,
            self.furthest_z
        );
        self.rings.iter().map(|r| r.handle).collect()
    }

    /// Rings behind the recycle threshold that are not dissolving, nearest first
    pub fn due_for_recycle(&self, traveler_z: f32) -> Vec<RingHandle> {
        let threshold = traveler_z - self.recycle_behind_distance;
        let mut due: Vec<&Ring> = self
            .rings
            .iter()
            .filter(|r| r.z() < threshold && !r.is_dissolving())
            .collect();
        due.sort_by(|a, b| a.z().total_cmp(&b.z()));
        due.into_iter().map(|r| r.handle).collect()
    }

    /// Clear a ring's pickups and move it one interval past the furthest ring
    pub fn advance(&mut self, handle: RingHandle) -> Option<Recycled> {
        let new_z = self.furthest_z + self.ring_interval;
        let sequence = self.next_sequence;
        let ring = self.rings.get_mut(handle.0)?;
        let old_z = ring.z();
        let was_obstacle = ring.is_obstacle();
        ring.clear_pickups();
        ring.place(new_z, sequence);
        self.furthest_z = new_z;
        self.next_sequence += 1;
        Some(Recycled {
            handle,
            old_z,
            new_z,
            was_obstacle,
        })
    }

    /// The `count` nearest rings at or ahead of `z`, nearest first
    pub fn nearest_ahead(&self, z: f32, count: usize) -> Vec<RingHandle> {
        let mut ahead: Vec<&Ring> = self.rings.iter().filter(|r| r.z() >= z).collect();
        ahead.sort_by(|a, b| a.z().total_cmp(&b.z()));
        ahead.into_iter().take(count).map(|r| r.handle).collect()
    }

    /// Handles in ascending z order
    pub fn ordered(&self) -> Vec<RingHandle> {
        self.nearest_ahead(f32::NEG_INFINITY, self.rings.len())
    }
}
