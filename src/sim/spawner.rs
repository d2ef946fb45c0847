//! Enemy spawning
//!
//! The spawner is a scheduled task owned by the session, not a free-running
//! timer: it only fires while armed, and the session disarms it on every exit
//! from `Playing`. It never touches the world itself; it hands back spawn
//! requests for the session to apply.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::entity::{EnemyVariant, Sway};
use crate::Tuning;

/// An enemy the session should create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub pos: Vec2,
    pub variant: EnemyVariant,
    pub descent_speed: f32,
    pub sway: Option<Sway>,
    /// Scheduled firing time (session clock, ms)
    pub due_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    interval_ms: f64,
    next_due_ms: Option<f64>,
}

impl Spawner {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            next_due_ms: None,
        }
    }

    /// Start firing every interval, the first one interval after `now_ms`
    pub fn arm(&mut self, now_ms: f64) {
        self.next_due_ms = Some(now_ms + self.interval_ms);
    }

    /// Cancel the schedule; nothing fires until re-armed
    pub fn disarm(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<f64> {
        self.next_due_ms
    }

    /// Collect every firing due at or before `now_ms`, one per elapsed interval
    pub fn poll(&mut self, now_ms: f64, rng: &mut impl Rng, tuning: &Tuning) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();
        if self.interval_ms <= 0.0 {
            return requests;
        }

        while let Some(due) = self.next_due_ms {
            if due > now_ms {
                break;
            }
            requests.push(roll_enemy(rng, tuning, due));
            self.next_due_ms = Some(due + self.interval_ms);
        }
        requests
    }
}

/// Randomize one enemy: horizontal position, speed, variant and sway
pub fn roll_enemy(rng: &mut impl Rng, tuning: &Tuning, due_ms: f64) -> SpawnRequest {
    let span = (tuning.field.width - tuning.enemy_size.x).max(0.0);
    let x = if span > 0.0 { rng.random_range(0.0..span) } else { 0.0 };

    let descent_speed = rng.random_range(tuning.enemy_speed_min..tuning.enemy_speed_max);

    let variant = if rng.random_bool(0.5) {
        EnemyVariant::Ufo1
    } else {
        EnemyVariant::Ufo2
    };

    let sway = rng.random_bool(tuning.enemy_sway_chance).then(|| {
        let amplitude = if tuning.enemy_sway_amplitude_max > tuning.enemy_sway_amplitude_min {
            rng.random_range(tuning.enemy_sway_amplitude_min..tuning.enemy_sway_amplitude_max)
        } else {
            tuning.enemy_sway_amplitude_min
        };
        Sway {
            amplitude,
            frequency: tuning.enemy_sway_frequency,
            phase: rng.random_range(0.0..TAU),
        }
    });

    SpawnRequest {
        pos: Vec2::new(x, tuning.enemy_spawn_y),
        variant,
        descent_speed,
        sway,
        due_ms,
    }
}
