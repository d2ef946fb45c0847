//! Per-frame simulation tick
//!
//! Order is load-bearing: input, motion, collisions, cleanup, HUD. Collisions
//! run after motion but before cleanup so a destroyed entity's explosion can
//! still use its final position.

use glam::Vec2;

use super::collision::{find_player_collision, resolve_projectile_hits};
use super::entity::ExplosionCause;
use super::state::{GameEvent, GamePhase, GameSession};
use crate::Field;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement directions
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Accepted fire actions since the last tick
    pub fires: u32,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one tick. A no-op unless playing and unpaused.
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    if session.phase != GamePhase::Playing {
        return;
    }
    if input.pause {
        if !session.paused {
            // Shots accepted before the pause press still leave the gun
            for _ in 0..input.fires {
                session.fire();
            }
            session.set_paused(true);
            return;
        }
        session.set_paused(false);
    }
    if session.paused {
        return;
    }

    session.time_ticks += 1;
    let field = session.tuning.field;
    let score_before = session.score;

    // 1. Input
    apply_input(session, input, &field);

    // 2. Motion and lifetimes
    for entity in session.world.iter_mut() {
        entity.update(dt, &field);
    }

    // 3. Collisions
    resolve_collisions(session);

    // 4. Cleanup
    session.purge_dead();

    // 5. HUD
    if session.score != score_before {
        session.events.push(GameEvent::ScoreChanged {
            score: session.score,
        });
    }
}

fn apply_input(session: &mut GameSession, input: &TickInput, field: &Field) {
    if let Some(player) = session.world.player.as_mut() {
        let moves = [
            (input.left, Vec2::NEG_X),
            (input.right, Vec2::X),
            (input.up, Vec2::NEG_Y),
            (input.down, Vec2::Y),
        ];
        for (held, direction) in moves {
            if held {
                player.steer(direction, field);
            }
        }
    }

    for _ in 0..input.fires {
        session.fire();
    }
}

fn resolve_collisions(session: &mut GameSession) {
    let world = &mut session.world;
    let hits = resolve_projectile_hits(&mut world.projectiles, &mut world.enemies);
    for hit in &hits {
        log::debug!("Projectile {:?} destroyed enemy {:?}", hit.projectile, hit.enemy);
        session.spawn_explosion(hit.at, ExplosionCause::Enemy);
    }
    session.add_score(hits.len() as u32);

    let crash = session.world.player.as_ref().and_then(|player| {
        find_player_collision(player, &session.world.enemies).map(|enemy| (player.pos, enemy.id))
    });
    if let Some((at, enemy)) = crash {
        log::debug!("Player rammed by enemy {:?}", enemy);
        if let Some(player) = session.world.player.as_mut() {
            player.destroy();
        }
        if let Some(rammer) = session.world.enemies.iter_mut().find(|e| e.id == enemy) {
            rammer.destroy();
        }
        session.spawn_explosion(at, ExplosionCause::Ship);
        session.enter_game_over();
    }
}
