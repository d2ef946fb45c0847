//! Kosmos Raider - a small 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, game state)
//! - `platform`: Raw input translation
//! - `renderer`: Renderer collaborator contract and the event presenter
//! - `assets`: Texture provider with procedural placeholders
//! - `ui`: Screen/view collaborator contract
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{AssetError, ConfigError, TransitionError};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Nominal frame length; `dt == 1.0` advances effects by this much
    pub const FRAME_MS: f32 = 16.0;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// How far outside the field an entity may drift before it self-destroys
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;

    /// Enemies enter just above the visible field
    pub const ENEMY_SPAWN_Y: f32 = -50.0;
    /// Enemy spawn interval (wall clock)
    pub const SPAWN_INTERVAL_MS: f64 = 1000.0;

    /// Minimum time between accepted fire actions
    pub const FIRE_COOLDOWN_MS: f64 = 200.0;
}

/// The rectangular play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: consts::FIELD_WIDTH,
            height: consts::FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a top-left position so a box of `size` stays inside the field
    #[inline]
    pub fn clamp(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let max = Vec2::new(self.width - size.x, self.height - size.y).max(Vec2::ZERO);
        pos.clamp(Vec2::ZERO, max)
    }

    /// True when `pos` has left the field by more than the out-of-bounds margin
    #[inline]
    pub fn is_outside_margin(&self, pos: Vec2) -> bool {
        let m = consts::OUT_OF_BOUNDS_MARGIN;
        pos.x < -m || pos.x > self.width + m || pos.y < -m || pos.y > self.height + m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_clamp() {
        let field = Field::default();
        let size = Vec2::new(40.0, 40.0);
        assert_eq!(field.clamp(Vec2::new(-5.0, 10.0), size), Vec2::new(0.0, 10.0));
        assert_eq!(field.clamp(Vec2::new(900.0, 700.0), size), Vec2::new(760.0, 560.0));
    }

    #[test]
    fn test_field_margin() {
        let field = Field::default();
        assert!(!field.is_outside_margin(Vec2::new(-100.0, 700.0)));
        assert!(field.is_outside_margin(Vec2::new(-100.5, 0.0)));
        assert!(field.is_outside_margin(Vec2::new(0.0, 700.1)));
        assert!(field.is_outside_margin(Vec2::new(900.5, 0.0)));
    }
}
