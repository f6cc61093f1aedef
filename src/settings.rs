//! Generator settings
//!
//! Every tuning knob of the tunnel lives here. Settings are plain serde data so
//! a host can keep them in a JSON file; missing keys fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{
    GeneratorError, GeneratorResult, require_ordered, require_positive, require_unit,
};

/// Ring pool layout and run spacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Number of ring slots (fixed for the session)
    pub size: usize,
    /// Distance between consecutive rings along the travel axis
    pub ring_interval: f32,
    /// How far behind the traveler a ring must fall before it is recycled
    pub recycle_behind_distance: f32,
    /// Discrete rotation positions around the tube axis
    pub side_count: u32,
    /// Plain rings placed after a fresh start or rebuild
    pub safe_start_rings: u32,
    /// Plain rings between two obstacle runs
    pub breather_min: u32,
    pub breather_max: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: POOL_SIZE,
            ring_interval: RING_INTERVAL,
            recycle_behind_distance: RECYCLE_BEHIND_DISTANCE,
            side_count: SIDE_COUNT,
            safe_start_rings: 3,
            breather_min: 1,
            breather_max: 2,
        }
    }
}

/// Difficulty clock tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
    /// When false, difficulty is frozen at level 0 / 0.0
    pub enabled: bool,
    /// Minutes until difficulty01 saturates at 1.0
    pub ramp_minutes: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ramp_minutes: RAMP_MINUTES,
        }
    }
}

/// Pickup chain and placement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupSettings {
    /// Evenly spaced angular slots per ring
    pub slots_per_ring: u32,
    /// Tries per pickup before giving up
    pub placement_attempts: u32,
    /// Pickups placed on each chain ring
    pub pickups_per_ring: u32,
    /// Chance a new chain starts on an idle pickup-only ring
    pub chain_start_chance: f32,
    pub chain_min: u32,
    pub chain_max: u32,
    /// Pickup-free rings after a chain ends
    pub gap_min: u32,
    pub gap_max: u32,
    /// Chance of a single pickup on an obstacle ring
    pub obstacle_ring_pickup_chance: f32,
    /// Chance a signpost ring carries a powerup instead of a coin
    pub powerup_spawn_chance: f32,
    /// Minimum distance between a pickup and obstacle geometry
    pub clearance_radius: f32,
    /// Inward offset from the placement radius
    pub float_height: f32,
    /// Placement radius; the traveler's tube radius when unset
    pub radius_override: Option<f32>,
}

impl Default for PickupSettings {
    fn default() -> Self {
        Self {
            slots_per_ring: PICKUP_SLOTS,
            placement_attempts: PLACEMENT_ATTEMPTS,
            pickups_per_ring: 1,
            chain_start_chance: 0.4,
            chain_min: 4,
            chain_max: 9,
            gap_min: 2,
            gap_max: 5,
            obstacle_ring_pickup_chance: 0.25,
            powerup_spawn_chance: 0.2,
            clearance_radius: PICKUP_CLEARANCE,
            float_height: PICKUP_FLOAT_HEIGHT,
            radius_override: None,
        }
    }
}

/// Atmosphere color cycling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Phase advance per second
    pub cycle_speed: f32,
    /// How far odd rings are pulled toward black (0 = none, 1 = black)
    pub darken_factor: f32,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            cycle_speed: 0.35,
            darken_factor: 0.4,
        }
    }
}

/// Complete generator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pool: PoolSettings,
    pub difficulty: DifficultySettings,
    pub pickups: PickupSettings,
    pub color: ColorSettings,
}

impl Settings {
    /// Parse settings from JSON (missing keys use defaults)
    pub fn from_json(json: &str) -> GeneratorResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings as pretty JSON
    pub fn to_json(&self) -> GeneratorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> GeneratorResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> GeneratorResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> GeneratorResult<()> {
        let pool = &self.pool;
        if pool.size == 0 {
            return Err(GeneratorError::InvalidSetting {
                name: "pool.size",
                value: 0.0,
                expected: "at least one ring",
            });
        }
        if pool.side_count == 0 {
            return Err(GeneratorError::InvalidSetting {
                name: "pool.side_count",
                value: 0.0,
                expected: "at least one side",
            });
        }
        require_positive("pool.ring_interval", pool.ring_interval)?;
        require_positive("pool.recycle_behind_distance", pool.recycle_behind_distance)?;
        require_ordered("pool.breather", pool.breather_min, pool.breather_max)?;

        require_positive("difficulty.ramp_minutes", self.difficulty.ramp_minutes)?;

        let pickups = &self.pickups;
        if pickups.slots_per_ring == 0 {
            return Err(GeneratorError::InvalidSetting {
                name: "pickups.slots_per_ring",
                value: 0.0,
                expected: "at least one slot",
            });
        }
        require_unit("pickups.chain_start_chance", pickups.chain_start_chance)?;
        require_unit(
            "pickups.obstacle_ring_pickup_chance",
            pickups.obstacle_ring_pickup_chance,
        )?;
        require_unit("pickups.powerup_spawn_chance", pickups.powerup_spawn_chance)?;
        require_ordered("pickups.chain", pickups.chain_min, pickups.chain_max)?;
        require_ordered("pickups.gap", pickups.gap_min, pickups.gap_max)?;
        if pickups.chain_min == 0 {
            return Err(GeneratorError::InvalidSetting {
                name: "pickups.chain_min",
                value: 0.0,
                expected: "at least one ring",
            });
        }

        require_unit("color.darken_factor", self.color.darken_factor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "pool": { "size": 12 } }"#).unwrap();
        assert_eq!(settings.pool.size, 12);
        assert_eq!(settings.pool.ring_interval, RING_INTERVAL);
        assert_eq!(settings.pickups.slots_per_ring, PICKUP_SLOTS);
    }

    #[test]
    fn test_rejects_inverted_chain() {
        let json = r#"{ "pickups": { "chain_min": 6, "chain_max": 2 } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(GeneratorError::InvalidSetting { name: "pickups.chain", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(GeneratorError::SettingsParse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_override() {
        let mut settings = Settings::default();
        settings.pickups.radius_override = Some(4.5);
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.pickups.radius_override, Some(4.5));
    }
}
