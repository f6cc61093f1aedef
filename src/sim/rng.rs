//! Deterministic random source
//!
//! One instance is owned by the generator and shared by every decision point in
//! a fixed call order, so a seed fully determines the tunnel.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seeded PCG wrapper with the draws the generator needs
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    rng: Pcg32,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restart the sequence from a new seed
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform integer in [min, max]; an empty or inverted range yields `min`
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Uniform integer in [0, n); zero when n is zero
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }

    /// Bernoulli trial. Always consumes exactly one draw.
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }

    /// +1 or -1 with equal probability
    pub fn sign(&mut self) -> i32 {
        if self.rng.random::<bool>() { 1 } else { -1 }
    }

    /// Cumulative-weight roll over `weights`.
    ///
    /// Negative weights count as zero. Returns `None` for an empty table and
    /// `Some(0)` without drawing when the total weight is zero.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return Some(0);
        }

        let roll = self.unit() * total;
        let mut cumulative = 0.0;
        let mut last_positive = 0;
        for (i, w) in weights.iter().enumerate() {
            let w = w.max(0.0);
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_positive = i;
            if roll < cumulative {
                return Some(i);
            }
        }
        // Float rounding can leave roll == total
        Some(last_positive)
    }
}
