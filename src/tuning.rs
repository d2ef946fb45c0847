//! Data-driven game balance
//!
//! Every gameplay number lives here so a JSON file can override it. Missing
//! keys fall back to the defaults below.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::Field;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Play field
    pub field: Field,

    // === Player ===
    pub player_size: Vec2,
    pub player_start: Vec2,
    /// Pixels per move command
    pub player_move_speed: f32,

    // === Enemies ===
    pub enemy_size: Vec2,
    pub enemy_spawn_y: f32,
    /// Descent speed range (px/frame), upper bound exclusive
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    /// Probability that a spawned enemy sways sideways
    pub enemy_sway_chance: f64,
    pub enemy_sway_amplitude_min: f32,
    pub enemy_sway_amplitude_max: f32,
    /// Sway cycles per pixel of descent
    pub enemy_sway_frequency: f32,
    pub spawn_interval_ms: f64,

    // === Projectiles ===
    pub projectile_size: Vec2,
    pub projectile_speed: f32,
    pub fire_cooldown_ms: f64,

    // === Effects ===
    pub explosion_size: Vec2,
    pub explosion_lifetime_ms: f32,
    /// Scale reached halfway through an explosion (1.0 = bounds)
    pub explosion_peak_scale: f32,
    pub particle_size: Vec2,
    /// Max particle speed per axis (px/frame)
    pub particle_speed: f32,
    pub particle_lifetime_min_ms: f32,
    pub particle_lifetime_jitter_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field: Field::default(),

            player_size: Vec2::new(48.0, 48.0),
            player_start: Vec2::new(400.0, 500.0),
            player_move_speed: 5.0,

            enemy_size: Vec2::new(64.0, 40.0),
            enemy_spawn_y: ENEMY_SPAWN_Y,
            enemy_speed_min: 1.0,
            enemy_speed_max: 3.0,
            enemy_sway_chance: 0.5,
            enemy_sway_amplitude_min: 0.25,
            enemy_sway_amplitude_max: 0.75,
            enemy_sway_frequency: 0.01,
            spawn_interval_ms: SPAWN_INTERVAL_MS,

            projectile_size: Vec2::new(8.0, 16.0),
            projectile_speed: 10.0,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,

            explosion_size: Vec2::new(48.0, 48.0),
            explosion_lifetime_ms: 1000.0,
            explosion_peak_scale: 1.5,
            particle_size: Vec2::new(4.0, 4.0),
            particle_speed: 2.0,
            particle_lifetime_min_ms: 500.0,
            particle_lifetime_jitter_ms: 500.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }

        fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                })
            }
        }

        fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
            finite(field, value)?;
            if value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must not be negative, got {value}"),
                });
            }
            Ok(())
        }

        positive("field.width", self.field.width as f64)?;
        positive("field.height", self.field.height as f64)?;
        for (name, size) in [
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("projectile_size", self.projectile_size),
            ("explosion_size", self.explosion_size),
            ("particle_size", self.particle_size),
        ] {
            positive(name, size.min_element() as f64)?;
        }
        positive("spawn_interval_ms", self.spawn_interval_ms)?;
        positive("explosion_lifetime_ms", self.explosion_lifetime_ms as f64)?;
        positive("particle_lifetime_min_ms", self.particle_lifetime_min_ms as f64)?;

        non_negative("fire_cooldown_ms", self.fire_cooldown_ms)?;
        non_negative("particle_lifetime_jitter_ms", self.particle_lifetime_jitter_ms as f64)?;

        // Everything below feeds a motion step or an RNG range
        for (name, value) in [
            ("player_start.x", self.player_start.x),
            ("player_start.y", self.player_start.y),
            ("player_move_speed", self.player_move_speed),
            ("enemy_spawn_y", self.enemy_spawn_y),
            ("enemy_speed_min", self.enemy_speed_min),
            ("enemy_speed_max", self.enemy_speed_max),
            ("enemy_sway_amplitude_min", self.enemy_sway_amplitude_min),
            ("enemy_sway_amplitude_max", self.enemy_sway_amplitude_max),
            ("enemy_sway_frequency", self.enemy_sway_frequency),
            ("projectile_speed", self.projectile_speed),
            ("explosion_peak_scale", self.explosion_peak_scale),
        ] {
            finite(name, value as f64)?;
        }
        non_negative("particle_speed", self.particle_speed as f64)?;
        finite("particle_speed", (self.particle_speed * 2.0) as f64)?;
        finite(
            "enemy_speed_max",
            (self.enemy_speed_max - self.enemy_speed_min) as f64,
        )?;
        finite(
            "enemy_sway_amplitude_max",
            (self.enemy_sway_amplitude_max - self.enemy_sway_amplitude_min) as f64,
        )?;

        if self.enemy_speed_max <= self.enemy_speed_min {
            return Err(ConfigError::Invalid {
                field: "enemy_speed_max",
                reason: format!(
                    "must exceed enemy_speed_min ({} <= {})",
                    self.enemy_speed_max, self.enemy_speed_min
                ),
            });
        }
        if self.enemy_sway_amplitude_max < self.enemy_sway_amplitude_min {
            return Err(ConfigError::Invalid {
                field: "enemy_sway_amplitude_max",
                reason: "must not be below enemy_sway_amplitude_min".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.enemy_sway_chance) {
            return Err(ConfigError::Invalid {
                field: "enemy_sway_chance",
                reason: "must be within [0, 1]".into(),
            });
        }
        Ok(())
    }
}
