//! Game entities
//!
//! One `Entity` struct carries the shared state (position, velocity, bounds,
//! liveness); per-variant data and behaviour hang off the `EntityKind` tag.
//! Positions are the top-left corner of the entity's visual.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::Field;
use crate::consts::FRAME_MS;

/// Stable handle for an entity within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Visual variant of an enemy saucer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyVariant {
    Ufo1,
    Ufo2,
}

/// What blew up: selects the explosion texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionCause {
    Enemy,
    Ship,
}

/// Sideways oscillation of a descending enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sway {
    /// Peak sideways speed (px/frame)
    pub amplitude: f32,
    /// Radians per pixel of descent
    pub frequency: f32,
    pub phase: f32,
}

impl Sway {
    /// Horizontal velocity at height `y`
    #[inline]
    pub fn velocity_at(&self, y: f32) -> f32 {
        (y * self.frequency + self.phase).sin() * self.amplitude
    }
}

/// Lifetime bookkeeping for effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectClock {
    pub lifetime_ms: f32,
    pub elapsed_ms: f32,
}

impl EffectClock {
    pub fn new(lifetime_ms: f32) -> Self {
        Self {
            lifetime_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance and report whether the effect has run its course
    pub fn advance(&mut self, ms: f32) -> bool {
        self.elapsed_ms += ms;
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.lifetime_ms
    }

    /// 0 at birth, 1 at end of life
    pub fn progress(&self) -> f32 {
        if self.lifetime_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.lifetime_ms).clamp(0.0, 1.0)
    }
}

/// Coarse kind, used for partitioning and by collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    Player,
    Enemy,
    Projectile,
    Explosion,
    Particle,
}

/// Per-variant data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Moves only on command
    Player { move_speed: f32 },
    Enemy {
        variant: EnemyVariant,
        descent_speed: f32,
        sway: Option<Sway>,
    },
    Projectile { ascent_speed: f32 },
    Explosion {
        cause: ExplosionCause,
        clock: EffectClock,
        peak_scale: f32,
    },
    Particle { tint: u32, clock: EffectClock },
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Player { .. } => EntityTag::Player,
            EntityKind::Enemy { .. } => EntityTag::Enemy,
            EntityKind::Projectile { .. } => EntityTag::Projectile,
            EntityKind::Explosion { .. } => EntityTag::Explosion,
            EntityKind::Particle { .. } => EntityTag::Particle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Visual extent
    pub size: Vec2,
    alive: bool,
}

impl Entity {
    fn new(id: EntityId, kind: EntityKind, pos: Vec2, vel: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            size,
            alive: true,
        }
    }

    pub fn player(id: EntityId, pos: Vec2, size: Vec2, move_speed: f32) -> Self {
        Self::new(id, EntityKind::Player { move_speed }, pos, Vec2::ZERO, size)
    }

    pub fn enemy(
        id: EntityId,
        pos: Vec2,
        size: Vec2,
        variant: EnemyVariant,
        descent_speed: f32,
        sway: Option<Sway>,
    ) -> Self {
        let kind = EntityKind::Enemy {
            variant,
            descent_speed,
            sway,
        };
        Self::new(id, kind, pos, Vec2::new(0.0, descent_speed), size)
    }

    pub fn projectile(id: EntityId, pos: Vec2, size: Vec2, ascent_speed: f32) -> Self {
        let kind = EntityKind::Projectile { ascent_speed };
        Self::new(id, kind, pos, Vec2::new(0.0, -ascent_speed), size)
    }

    pub fn explosion(
        id: EntityId,
        pos: Vec2,
        size: Vec2,
        cause: ExplosionCause,
        lifetime_ms: f32,
        peak_scale: f32,
    ) -> Self {
        let kind = EntityKind::Explosion {
            cause,
            clock: EffectClock::new(lifetime_ms),
            peak_scale,
        };
        Self::new(id, kind, pos, Vec2::ZERO, size)
    }

    pub fn particle(
        id: EntityId,
        pos: Vec2,
        size: Vec2,
        vel: Vec2,
        lifetime_ms: f32,
        tint: u32,
    ) -> Self {
        let kind = EntityKind::Particle {
            tint,
            clock: EffectClock::new(lifetime_ms),
        };
        Self::new(id, kind, pos, vel, size)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    /// Effects never take part in collision detection
    pub fn is_effect(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Explosion { .. } | EntityKind::Particle { .. }
        )
    }

    /// Mark dead. Returns true only for the call that actually killed it.
    pub fn destroy(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_out_of_bounds(&self, field: &Field) -> bool {
        field.is_outside_margin(self.pos)
    }

    /// Advance one tick. `dt` is in frames (1.0 = one nominal frame).
    ///
    /// Entities that leave the field margin, finish their lifetime, or end up
    /// at a non-finite position destroy themselves.
    pub fn update(&mut self, dt: f32, field: &Field) {
        if !self.alive {
            return;
        }
        // Already outside the margin: dies even if this step carries it back in
        let started_outside = self.is_out_of_bounds(field);

        let expired = match &mut self.kind {
            EntityKind::Player { .. } => false,
            EntityKind::Enemy { sway, .. } => {
                self.pos += self.vel * dt;
                if let Some(sway) = sway {
                    self.pos.x += sway.velocity_at(self.pos.y) * dt;
                }
                false
            }
            EntityKind::Projectile { .. } => {
                self.pos += self.vel * dt;
                false
            }
            EntityKind::Explosion { clock, .. } => clock.advance(dt * FRAME_MS),
            EntityKind::Particle { clock, .. } => {
                self.pos += self.vel * dt;
                clock.advance(dt * FRAME_MS)
            }
        };

        if !self.pos.is_finite() {
            log::warn!("{:?} {:?} reached a non-finite position, dropping it", self.tag(), self.id);
            self.destroy();
        } else if expired || started_outside || self.is_out_of_bounds(field) {
            self.destroy();
        }
    }

    /// Command-driven move; only the player responds. The result is clamped
    /// to the field.
    pub fn steer(&mut self, direction: Vec2, field: &Field) {
        if !self.alive {
            return;
        }
        if let EntityKind::Player { move_speed } = self.kind {
            self.pos = field.clamp(self.pos + direction * move_speed, self.size);
        }
    }

    /// Logical texture name for the texture provider
    pub fn texture_name(&self) -> &'static str {
        match &self.kind {
            EntityKind::Player { .. } => "rocket",
            EntityKind::Enemy { variant, .. } => match variant {
                EnemyVariant::Ufo1 => "ufo1",
                EnemyVariant::Ufo2 => "ufo2",
            },
            EntityKind::Projectile { .. } => "bullet",
            EntityKind::Explosion { cause, .. } => match cause {
                ExplosionCause::Enemy => "explosion",
                ExplosionCause::Ship => "bang",
            },
            EntityKind::Particle { .. } => "particle",
        }
    }

    /// Visual scale relative to bounds (explosions swell, then shrink back)
    pub fn scale(&self) -> f32 {
        match &self.kind {
            EntityKind::Explosion {
                clock, peak_scale, ..
            } => 1.0 + (peak_scale - 1.0) * (clock.progress() * PI).sin(),
            _ => 1.0,
        }
    }

    /// Visual opacity (particles fade out)
    pub fn alpha(&self) -> f32 {
        match &self.kind {
            EntityKind::Particle { clock, .. } => 1.0 - clock.progress(),
            _ => 1.0,
        }
    }

    /// Colour tint for the renderer, if the variant has one
    pub fn tint(&self) -> Option<u32> {
        match &self.kind {
            EntityKind::Particle { tint, .. } => Some(*tint),
            _ => None,
        }
    }
}
