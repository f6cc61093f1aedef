//! Obstacle archetype catalog and powerup weight table
//!
//! Authored, immutable data. The generator owns one [`Catalog`] and one
//! [`PowerupTable`]; neither is mutated after construction.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// Rotation stepping for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEntry {
    /// Difficulty level this entry is authored for
    pub level: u32,
    /// Slots advanced between consecutive rings of a run
    pub min_steps: u32,
    pub max_steps: u32,
    /// Re-roll direction every step; otherwise one sign per run
    pub bidirectional: bool,
}

impl RotationEntry {
    /// Used when an archetype has no rotation table at all
    pub const STATIC: Self = Self {
        level: 0,
        min_steps: 0,
        max_steps: 0,
        bidirectional: false,
    };

    pub const fn new(level: u32, min_steps: u32, max_steps: u32, bidirectional: bool) -> Self {
        Self {
            level,
            min_steps,
            max_steps,
            bidirectional,
        }
    }
}

/// Pick the rotation entry for `level`.
///
/// Exact level match first, then the highest entry below `level`. When every
/// entry is authored above `level` the first entry is used anyway.
pub fn resolve_rotation(table: &[RotationEntry], level: u32) -> Option<&RotationEntry> {
    if let Some(exact) = table.iter().find(|e| e.level == level) {
        return Some(exact);
    }
    table
        .iter()
        .filter(|e| e.level <= level)
        .max_by_key(|e| e.level)
        .or_else(|| table.first())
}

fn unbounded() -> u32 {
    u32::MAX
}

/// One obstacle archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeDescriptor {
    pub name: String,
    /// Content template id in the content library
    pub template: String,
    pub weight: f32,
    #[serde(default)]
    pub min_difficulty: u32,
    #[serde(default = "unbounded")]
    pub max_difficulty: u32,
    pub min_run: u32,
    pub max_run: u32,
    /// Added to both run bounds per difficulty level
    #[serde(default)]
    pub run_bonus_per_level: u32,
    #[serde(default)]
    pub rotation: Vec<RotationEntry>,
}

impl ArchetypeDescriptor {
    pub fn new(name: &str, template: &str, weight: f32) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            weight,
            min_difficulty: 0,
            max_difficulty: u32::MAX,
            min_run: 1,
            max_run: 1,
            run_bonus_per_level: 0,
            rotation: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, min: u32, max: u32) -> Self {
        self.min_difficulty = min;
        self.max_difficulty = max;
        self
    }

    pub fn with_run(mut self, min: u32, max: u32, bonus_per_level: u32) -> Self {
        self.min_run = min;
        self.max_run = max;
        self.run_bonus_per_level = bonus_per_level;
        self
    }

    pub fn with_rotation(mut self, entry: RotationEntry) -> Self {
        self.rotation.push(entry);
        self
    }

    pub fn eligible_at(&self, level: u32) -> bool {
        (self.min_difficulty..=self.max_difficulty).contains(&level)
    }

    /// Inclusive run-length bounds at `level`
    pub fn run_length_bounds(&self, level: u32) -> (u32, u32) {
        let bonus = level.saturating_mul(self.run_bonus_per_level);
        let min = self.min_run.saturating_add(bonus);
        let max = self.max_run.saturating_add(bonus).max(min);
        (min, max)
    }

    /// Rotation entry for `level`, or [`RotationEntry::STATIC`] without a table
    pub fn rotation_for(&self, level: u32) -> RotationEntry {
        match resolve_rotation(&self.rotation, level) {
            Some(entry) => *entry,
            None => {
                log::warn!("Archetype '{}' has no rotation table, placing static", self.name);
                RotationEntry::STATIC
            }
        }
    }
}

/// The set of archetypes the pattern selector draws from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub archetypes: Vec<ArchetypeDescriptor>,
}

impl Catalog {
    pub fn new(archetypes: Vec<ArchetypeDescriptor>) -> Self {
        Self { archetypes }
    }

    /// The four stock archetypes with a gentle ramp
    pub fn standard() -> Self {
        Self::new(vec![
            ArchetypeDescriptor::new("fan", "fan", 3.0)
                .with_run(2, 4, 1)
                .with_rotation(RotationEntry::new(0, 0, 1, false))
                .with_rotation(RotationEntry::new(2, 1, 2, true)),
            ArchetypeDescriptor::new("wedge", "wedge", 4.0)
                .with_run(3, 5, 1)
                .with_rotation(RotationEntry::new(0, 1, 1, false))
                .with_rotation(RotationEntry::new(1, 1, 2, false))
                .with_rotation(RotationEntry::new(3, 1, 3, true)),
            ArchetypeDescriptor::new("door", "door", 2.0)
                .with_difficulty(1, u32::MAX)
                .with_run(2, 3, 0)
                .with_rotation(RotationEntry::new(1, 0, 2, true)),
            ArchetypeDescriptor::new("laser", "laser", 2.0)
                .with_difficulty(2, u32::MAX)
                .with_run(2, 4, 1)
                .with_rotation(RotationEntry::new(2, 1, 1, false))
                .with_rotation(RotationEntry::new(4, 1, 2, true)),
        ])
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ArchetypeDescriptor> {
        self.archetypes.get(index)
    }

    /// Indices whose difficulty window contains `level`
    pub fn eligible_indices(&self, level: u32) -> Vec<usize> {
        self.archetypes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.eligible_at(level))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Magnet,
    Shield,
    SlowMotion,
    ScoreMultiplier,
}

/// A weighted powerup choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerupWeight {
    pub kind: PowerupKind,
    pub weight: f32,
}

/// Weighted powerup table, independent of obstacle runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerupTable {
    pub entries: Vec<PowerupWeight>,
}

impl PowerupTable {
    pub fn new(entries: Vec<PowerupWeight>) -> Self {
        Self { entries }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            PowerupWeight {
                kind: PowerupKind::Magnet,
                weight: 4.0,
            },
            PowerupWeight {
                kind: PowerupKind::Shield,
                weight: 3.0,
            },
            PowerupWeight {
                kind: PowerupKind::SlowMotion,
                weight: 2.0,
            },
            PowerupWeight {
                kind: PowerupKind::ScoreMultiplier,
                weight: 1.0,
            },
        ])
    }

    /// Weighted draw; the first entry when total weight is zero
    pub fn pick(&self, rng: &mut RandomSource) -> Option<PowerupKind> {
        let weights: Vec<f32> = self.entries.iter().map(|e| e.weight).collect();
        rng.weighted_index(&weights).map(|i| self.entries[i].kind)
    }
}
