//! Difficulty curve
//!
//! Elapsed run time maps to a coarse integer level (content gating, rotation
//! tables) and a normalized 0..1 value (continuous behavior scaling).

use serde::{Deserialize, Serialize};

use crate::settings::DifficultySettings;

/// Difficulty sampled for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Difficulty {
    /// floor(elapsed minutes)
    pub level: u32,
    /// clamp01(elapsed minutes / ramp minutes)
    pub t01: f32,
}

/// Run clock that drives the difficulty curve
#[derive(Debug, Clone)]
pub struct DifficultyClock {
    elapsed_secs: f32,
    ramp_minutes: f32,
    enabled: bool,
}

impl DifficultyClock {
    pub fn new(settings: &DifficultySettings) -> Self {
        Self {
            elapsed_secs: 0.0,
            ramp_minutes: settings.ramp_minutes,
            enabled: settings.enabled,
        }
    }

    /// Restart the clock at zero
    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed_secs += dt;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn level(&self) -> u32 {
        if !self.enabled {
            return 0;
        }
        (self.elapsed_secs / 60.0).floor().max(0.0) as u32
    }

    pub fn difficulty01(&self) -> f32 {
        if !self.enabled || self.ramp_minutes <= 0.0 {
            return 0.0;
        }
        (self.elapsed_secs / 60.0 / self.ramp_minutes).clamp(0.0, 1.0)
    }

    pub fn sample(&self) -> Difficulty {
        Difficulty {
            level: self.level(),
            t01: self.difficulty01(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(ramp_minutes: f32) -> DifficultyClock {
        DifficultyClock::new(&DifficultySettings {
            enabled: true,
            ramp_minutes,
        })
    }

    #[test]
    fn test_level_is_floor_of_minutes() {
        let mut c = clock(5.0);
        assert_eq!(c.level(), 0);
        c.advance(59.9);
        assert_eq!(c.level(), 0);
        c.advance(0.2);
        assert_eq!(c.level(), 1);
        c.advance(125.0);
        assert_eq!(c.level(), 3);
    }

    #[test]
    fn test_difficulty01_ramps_and_clamps() {
        let mut c = clock(2.0);
        c.advance(60.0);
        assert!((c.difficulty01() - 0.5).abs() < 1e-5);
        c.advance(600.0);
        assert_eq!(c.difficulty01(), 1.0);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut c = clock(2.0);
        c.advance(-10.0);
        assert_eq!(c.elapsed_secs(), 0.0);
        assert_eq!(c.level(), 0);
    }

    #[test]
    fn test_disabled_freezes_outputs() {
        let mut c = clock(1.0);
        c.set_enabled(false);
        c.advance(1000.0);
        assert_eq!(c.sample(), Difficulty::default());
        c.set_enabled(true);
        assert_eq!(c.level(), 16);
    }

    #[test]
    fn test_reset() {
        let mut c = clock(1.0);
        c.advance(300.0);
        c.reset();
        assert_eq!(c.sample(), Difficulty { level: 0, t01: 0.0 });
    }
}
