//! Pattern/run selection and rotation continuity
//!
//! A run is a contiguous sequence of obstacle rings sharing one archetype.
//! Between consecutive rings of a run the obstacle's rotation slot steps by a
//! small discrete amount so the pattern reads as a spiral or zig-zag.

use serde::Serialize;

use super::catalog::{Catalog, RotationEntry};
use super::rng::RandomSource;
use crate::{slot_angle, wrap_slot};

/// The generator's in-progress pattern
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    /// Index into the catalog
    pub archetype: usize,
    /// Rotation entry resolved at run start
    pub rotation: RotationEntry,
    /// Difficulty level captured at run start
    pub level: u32,
    /// Planned run length
    pub length: u32,
    /// Rings still to configure
    pub remaining: u32,
    /// Current rotation slot, always in [0, side_count)
    pub slot: u32,
    /// Fixed direction for runs that disallow bidirectional stepping
    pub committed_sign: Option<i32>,
    /// Last step drawn by `advance_rotation` (diagnostic)
    pub last_step: u32,
    /// Last direction applied (diagnostic)
    pub last_direction: i32,
}

impl RunState {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Chooses archetypes and drives rotation stepping within a run
#[derive(Debug, Clone, Default)]
pub struct PatternSelector {
    run: Option<RunState>,
    runs_started: u64,
}

impl PatternSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the in-progress run
    pub fn clear(&mut self) {
        self.run = None;
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn run_active(&self) -> bool {
        self.run.as_ref().is_some_and(|r| !r.is_exhausted())
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Make sure a run with rings left exists, selecting a new one if needed.
    ///
    /// Returns `None` only for an empty catalog. Returns `Some((run, true))`
    /// when a new run was selected by this call.
    pub fn ensure_run_state(
        &mut self,
        catalog: &Catalog,
        level: u32,
        side_count: u32,
        rng: &mut RandomSource,
    ) -> Option<(&RunState, bool)> {
        if self.run_active() {
            return self.run.as_ref().map(|r| (r, false));
        }
        if catalog.is_empty() {
            log::warn!("Archetype catalog is empty, no run selected");
            self.run = None;
            return None;
        }

        let mut candidates = catalog.eligible_indices(level);
        if candidates.is_empty() {
            log::warn!("No archetype eligible at level {}, using full catalog", level);
            candidates = (0..catalog.len()).collect();
        }

        let weights: Vec<f32> = candidates
            .iter()
            .map(|&i| catalog.archetypes[i].weight)
            .collect();
        if weights.iter().all(|w| *w <= 0.0) {
            log::warn!("All candidate archetype weights are zero, using first entry");
        }
        let archetype = rng
            .weighted_index(&weights)
            .map(|pick| candidates[pick])
            .unwrap_or(candidates[0]);
        let descriptor = &catalog.archetypes[archetype];

        let (min_run, max_run) = descriptor.run_length_bounds(level);
        let length = rng.range_inclusive(min_run, max_run).max(1);
        let rotation = descriptor.rotation_for(level);
        let slot = rng.below(side_count);
        let committed_sign = if rotation.bidirectional {
            None
        } else {
            Some(rng.sign())
        };

        log::debug!(
            "Run '{}' x{} at level {} (slot {}, steps {}..={}, {})",
            descriptor.name,
            length,
            level,
            slot,
            rotation.min_steps,
            rotation.max_steps,
            if rotation.bidirectional {
                "bidirectional"
            } else {
                "fixed direction"
            }
        );

        self.runs_started += 1;
        self.run = Some(RunState {
            archetype,
            rotation,
            level,
            length,
            remaining: length,
            slot,
            committed_sign,
            last_step: 0,
            last_direction: committed_sign.unwrap_or(1),
        });
        self.run.as_ref().map(|r| (r, true))
    }

    /// Rotation (radians) for the ring about to be configured
    pub fn current_rotation(&self, side_count: u32) -> f32 {
        self.run
            .as_ref()
            .map(|r| slot_angle(r.slot, side_count))
            .unwrap_or(0.0)
    }

    /// Count one configured ring against the run
    pub fn consume_ring(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.remaining = run.remaining.saturating_sub(1);
        }
    }

    /// Step the rotation slot for the next ring of the run.
    ///
    /// The direction is only drawn for a non-zero step on bidirectional runs.
    pub fn advance_rotation(&mut self, side_count: u32, rng: &mut RandomSource) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let step = rng.range_inclusive(run.rotation.min_steps, run.rotation.max_steps);
        run.last_step = step;
        if step == 0 {
            return;
        }
        let direction = match run.committed_sign {
            Some(sign) => sign,
            None => rng.sign(),
        };
        run.last_direction = direction;
        run.slot = wrap_slot(run.slot, step as i64 * direction as i64, side_count);
    }
}
