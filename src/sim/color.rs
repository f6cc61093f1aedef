//! Atmosphere color cycling
//!
//! A single phase accumulator drives a sinusoidal sample through a
//! caller-supplied gradient. Even rings get the base color, odd rings a darker
//! variant. Colors are written as per-surface override blocks on each ring so
//! a shared material is never touched.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::state::Ring;
use crate::settings::ColorSettings;

/// GPU-ready tint override for one renderable surface
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct TintBlock {
    pub color: [f32; 4],
}

impl TintBlock {
    pub const WHITE: Self = Self {
        color: [1.0, 1.0, 1.0, 1.0],
    };

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<Vec4> for TintBlock {
    fn from(v: Vec4) -> Self {
        Self { color: v.to_array() }
    }
}

/// Maps t in [0, 1] to an RGBA color
pub trait Gradient {
    fn sample(&self, t: f32) -> Vec4;
}

impl<F> Gradient for F
where
    F: Fn(f32) -> Vec4,
{
    fn sample(&self, t: f32) -> Vec4 {
        self(t)
    }
}

/// One stop of a [`LinearGradient`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub t: f32,
    pub color: [f32; 4],
}

/// Piecewise-linear gradient over sorted stops
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { stops }
    }

    /// Cyan → magenta → amber, the default tunnel palette
    pub fn neon() -> Self {
        Self::new(vec![
            GradientStop {
                t: 0.0,
                color: [0.1, 0.85, 1.0, 1.0],
            },
            GradientStop {
                t: 0.5,
                color: [0.9, 0.2, 0.85, 1.0],
            },
            GradientStop {
                t: 1.0,
                color: [1.0, 0.7, 0.15, 1.0],
            },
        ])
    }
}

impl Gradient for LinearGradient {
    fn sample(&self, t: f32) -> Vec4 {
        let Some(first) = self.stops.first() else {
            return Vec4::ONE;
        };
        if t <= first.t {
            return Vec4::from_array(first.color);
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                let local = if span > 0.0 { (t - a.t) / span } else { 1.0 };
                return Vec4::from_array(a.color).lerp(Vec4::from_array(b.color), local);
            }
        }
        self.stops
            .last()
            .map(|s| Vec4::from_array(s.color))
            .unwrap_or(Vec4::ONE)
    }
}

/// Colors computed for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingPalette {
    pub base: Vec4,
    pub dark: Vec4,
    /// Obstacle/pickup color
    pub accent: Vec4,
}

impl RingPalette {
    /// Wall color for a ring by sequence parity
    pub fn wall(&self, sequence: u64) -> Vec4 {
        if sequence % 2 == 0 { self.base } else { self.dark }
    }
}

/// Pull `color` toward black by `factor`, keeping alpha
pub fn darken(color: Vec4, factor: f32) -> Vec4 {
    let black = Vec4::new(0.0, 0.0, 0.0, color.w);
    color.lerp(black, factor.clamp(0.0, 1.0))
}

/// Cycles hue/intensity across rings
pub struct ColorUpdater {
    phase: f32,
    cycle_speed: f32,
    darken_factor: f32,
    gradient: Box<dyn Gradient>,
    accent: Option<Box<dyn Gradient>>,
}

impl fmt::Debug for ColorUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorUpdater")
            .field("phase", &self.phase)
            .field("cycle_speed", &self.cycle_speed)
            .field("darken_factor", &self.darken_factor)
            .field("has_accent", &self.accent.is_some())
            .finish()
    }
}

impl ColorUpdater {
    pub fn new(settings: &ColorSettings, gradient: Box<dyn Gradient>) -> Self {
        Self {
            phase: 0.0,
            cycle_speed: settings.cycle_speed,
            darken_factor: settings.darken_factor,
            gradient,
            accent: None,
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase += dt * self.cycle_speed;
    }

    pub fn set_gradient(&mut self, gradient: Box<dyn Gradient>) {
        self.gradient = gradient;
    }

    /// Separate gradient for obstacle and pickup surfaces
    pub fn set_accent_gradient(&mut self, accent: Option<Box<dyn Gradient>>) {
        self.accent = accent;
    }

    pub fn set_cycle_speed(&mut self, cycle_speed: f32) {
        self.cycle_speed = cycle_speed;
    }

    pub fn set_darken_factor(&mut self, darken_factor: f32) {
        self.darken_factor = darken_factor.clamp(0.0, 1.0);
    }

    pub fn palette(&self) -> RingPalette {
        let t = 0.5 + 0.5 * self.phase.sin();
        let base = self.gradient.sample(t);
        let accent = self
            .accent
            .as_ref()
            .map(|g| g.sample(t))
            .unwrap_or(base);
        RingPalette {
            base,
            dark: darken(base, self.darken_factor),
            accent,
        }
    }

    /// Write override tints for every ring
    pub fn apply(&self, rings: &mut [Ring]) {
        let palette = self.palette();
        for ring in rings.iter_mut() {
            ring.apply_palette(&palette);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updater(darken_factor: f32) -> ColorUpdater {
        ColorUpdater::new(
            &ColorSettings {
                cycle_speed: 1.0,
                darken_factor,
            },
            Box::new(LinearGradient::neon()),
        )
    }

    #[test]
    fn test_linear_gradient_endpoints_and_midpoint() {
        let g = LinearGradient::new(vec![
            GradientStop {
                t: 1.0,
                color: [1.0, 1.0, 1.0, 1.0],
            },
            GradientStop {
                t: 0.0,
                color: [0.0, 0.0, 0.0, 1.0],
            },
        ]);
        assert_eq!(g.sample(-1.0), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(g.sample(2.0), Vec4::ONE);
        assert!((g.sample(0.25).x - 0.25).abs() < 1e-6);
        assert_eq!(LinearGradient::default().sample(0.3), Vec4::ONE);
    }

    #[test]
    fn test_darken_keeps_alpha() {
        let c = darken(Vec4::new(1.0, 0.5, 0.0, 0.8), 0.5);
        assert!((c - Vec4::new(0.5, 0.25, 0.0, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_parity_alternates() {
        let mut colors = updater(0.5);
        colors.advance(0.3);
        let palette = colors.palette();
        assert_eq!(palette.wall(0), palette.base);
        assert_eq!(palette.wall(1), palette.dark);
        assert_eq!(palette.wall(2), palette.base);
        assert_ne!(palette.base, palette.dark);
    }

    #[test]
    fn test_phase_sample_uses_sine() {
        let solid = |t: f32| Vec4::new(t, t, t, 1.0);
        let mut colors = ColorUpdater::new(
            &ColorSettings {
                cycle_speed: 2.0,
                darken_factor: 0.0,
            },
            Box::new(solid),
        );
        colors.advance(0.25);
        let expected = 0.5 + 0.5 * 0.5_f32.sin();
        assert!((colors.palette().base.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_retune_keeps_phase() {
        let mut colors = updater(0.2);
        colors.advance(1.5);
        let phase = colors.phase();
        colors.set_cycle_speed(3.0);
        colors.set_darken_factor(0.9);
        assert_eq!(colors.phase(), phase);
        colors.advance(1.0);
        assert!((colors.phase() - (phase + 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_reset_phase_restores_first_palette() {
        let mut colors = updater(0.3);
        let initial = colors.palette();
        colors.advance(2.7);
        assert_ne!(colors.palette(), initial);
        colors.reset_phase();
        assert_eq!(colors.phase(), 0.0);
        assert_eq!(colors.palette(), initial);
    }

    #[test]
    fn test_accent_gradient_overrides() {
        let mut colors = updater(0.2);
        assert_eq!(colors.palette().accent, colors.palette().base);
        colors.set_accent_gradient(Some(Box::new(|_t: f32| Vec4::new(1.0, 0.0, 0.0, 1.0))));
        assert_eq!(colors.palette().accent, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_tint_block_bytes() {
        let tint = TintBlock::from(Vec4::new(0.0, 0.5, 1.0, 1.0));
        assert_eq!(tint.as_bytes().len(), 16);
    }
}
