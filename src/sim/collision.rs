//! Collision detection and resolution
//!
//! Detection is a plain axis-aligned box test on half-open intervals.
//! Resolution runs once per tick, after motion and before cleanup, so a
//! destroyed entity's final position is still available for its explosion.

use glam::Vec2;

use super::entity::{Entity, EntityId};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Boxes that merely touch along an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Overlap test between two live entities.
///
/// Callers must only pass live entities; a dead entity has no meaningful
/// bounds any more.
#[inline]
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    debug_assert!(a.is_alive() && b.is_alive(), "collision query on a dead entity");
    a.bounds().intersects(&b.bounds())
}

/// A projectile that took out an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub projectile: EntityId,
    pub enemy: EntityId,
    /// Enemy position at the moment of impact
    pub at: Vec2,
}

/// Projectile x Enemy pass.
///
/// Each projectile is consumed by at most one enemy: once it hits, it is not
/// tested against the remaining enemies, so a single shot scores once even
/// when it overlaps several enemies.
pub fn resolve_projectile_hits(projectiles: &mut [Entity], enemies: &mut [Entity]) -> Vec<Hit> {
    let mut hits = Vec::new();

    for projectile in projectiles.iter_mut().filter(|p| p.is_alive()) {
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.is_alive() && overlaps(projectile, e))
        else {
            continue;
        };

        projectile.destroy();
        enemy.destroy();
        hits.push(Hit {
            projectile: projectile.id,
            enemy: enemy.id,
            at: enemy.pos,
        });
    }

    hits
}

/// Player x Enemy pass: the first live enemy touching the player, if any
pub fn find_player_collision<'a>(player: &Entity, enemies: &'a [Entity]) -> Option<&'a Entity> {
    if !player.is_alive() {
        return None;
    }
    enemies.iter().find(|e| e.is_alive() && overlaps(player, e))
}
