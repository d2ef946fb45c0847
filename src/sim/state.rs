//! Game session state
//!
//! The session exclusively owns the world (every live entity, partitioned by
//! kind), the score, the clock, the spawn task and the RNG. Collaborators
//! learn about changes through the `GameEvent` queue.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityTag, ExplosionCause};
use super::spawner::{SpawnRequest, Spawner};
use super::tick::{TickInput, tick};
use crate::Tuning;
use crate::consts::FRAME_MS;
use crate::error::TransitionError;
use crate::ui::UiAction;

/// High-level session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no entities
    Start,
    /// Active gameplay
    Playing,
    /// Run ended, score frozen
    GameOver,
}

/// Notifications for the renderer and UI collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        tag: EntityTag,
        texture: &'static str,
        size: Vec2,
    },
    Despawned {
        id: EntityId,
    },
    ScoreChanged {
        score: u32,
    },
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    GameOver {
        final_score: u32,
    },
    PauseChanged {
        paused: bool,
    },
}

/// Live entities, partitioned by kind
#[derive(Debug, Clone, Default)]
pub struct World {
    pub player: Option<Entity>,
    pub enemies: Vec<Entity>,
    pub projectiles: Vec<Entity>,
    /// Explosions and particles
    pub effects: Vec<Entity>,
}

impl World {
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.player
            .iter()
            .chain(&self.enemies)
            .chain(&self.projectiles)
            .chain(&self.effects)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.player
            .iter_mut()
            .chain(&mut self.enemies)
            .chain(&mut self.projectiles)
            .chain(&mut self.effects)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.player.is_none()
            && self.enemies.is_empty()
            && self.projectiles.is_empty()
            && self.effects.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.iter().find(|e| e.id == id)
    }

    pub fn count(&self, tag: EntityTag) -> usize {
        self.iter().filter(|e| e.tag() == tag).count()
    }

    /// File an entity under its kind. A second player replaces the first,
    /// which is returned.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        match entity.tag() {
            EntityTag::Player => return self.player.replace(entity),
            EntityTag::Enemy => self.enemies.push(entity),
            EntityTag::Projectile => self.projectiles.push(entity),
            EntityTag::Explosion | EntityTag::Particle => self.effects.push(entity),
        }
        None
    }

    /// Remove every dead entity, returning their ids
    pub fn purge_dead(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();

        if self.player.as_ref().is_some_and(|p| !p.is_alive()) {
            removed.extend(self.player.take().map(|p| p.id));
        }
        for list in [&mut self.enemies, &mut self.projectiles, &mut self.effects] {
            list.retain(|e| {
                if !e.is_alive() {
                    removed.push(e.id);
                }
                e.is_alive()
            });
        }

        removed
    }

    /// Remove everything, returning the ids
    pub fn clear(&mut self) -> Vec<EntityId> {
        let ids = self.iter().map(|e| e.id).collect();
        self.player = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.effects.clear();
        ids
    }
}

/// One game session: state machine, world, score and timers
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) tuning: Tuning,
    pub(crate) phase: GamePhase,
    pub(crate) paused: bool,
    pub(crate) score: u32,
    pub(crate) world: World,
    pub(crate) rng: Pcg32,
    seed: u64,
    /// Session clock (ms); only advances while playing and not paused
    clock_ms: f64,
    spawner: Spawner,
    /// Particles per explosion
    particle_burst: usize,
    pub(crate) time_ticks: u64,
    next_id: u32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session on the start screen
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let spawner = Spawner::new(tuning.spawn_interval_ms);
        Self {
            tuning,
            phase: GamePhase::Start,
            paused: false,
            score: 0,
            world: World::default(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            clock_ms: 0.0,
            spawner,
            particle_burst: 0,
            time_ticks: 0,
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub fn with_particle_burst(mut self, particles: usize) -> Self {
        self.particle_burst = particles;
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// The live player, if any
    pub fn player(&self) -> Option<&Entity> {
        self.world.player.as_ref().filter(|p| p.is_alive())
    }

    /// Pending notifications, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Frame driving ===

    /// Advance timers by the frame's wall time, then run one tick
    pub fn frame(&mut self, input: &TickInput, dt: f32) {
        self.advance_clock(dt as f64 * FRAME_MS as f64);
        tick(self, input, dt);
    }

    /// Advance the session clock and run due spawn firings.
    ///
    /// The clock stands still outside `Playing` and while paused.
    pub fn advance_clock(&mut self, elapsed_ms: f64) {
        if self.phase != GamePhase::Playing || self.paused {
            return;
        }
        self.clock_ms += elapsed_ms;

        let requests = self.spawner.poll(self.clock_ms, &mut self.rng, &self.tuning);
        for request in requests {
            self.spawn_enemy(request);
        }
    }

    // === State machine ===

    /// Start -> Playing
    pub fn start_game(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::Start => {
                self.enter_playing();
                Ok(())
            }
            from => Err(TransitionError::Invalid {
                from,
                to: GamePhase::Playing,
            }),
        }
    }

    /// GameOver -> Playing
    pub fn restart_game(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::GameOver => {
                self.enter_playing();
                Ok(())
            }
            from => Err(TransitionError::Invalid {
                from,
                to: GamePhase::Playing,
            }),
        }
    }

    /// GameOver -> Start (no-op when already there)
    pub fn show_start_screen(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::Start => Ok(()),
            GamePhase::GameOver => {
                self.enter_start();
                Ok(())
            }
            from => Err(TransitionError::Invalid {
                from,
                to: GamePhase::Start,
            }),
        }
    }

    /// Entry point for screen activation callbacks
    pub fn handle_ui_action(&mut self, action: UiAction) {
        let result = match action {
            UiAction::StartGame => self.start_game(),
            UiAction::RestartGame => self.restart_game(),
            UiAction::ShowStartScreen => self.show_start_screen(),
        };
        if let Err(err) = result {
            log::warn!("Ignoring {:?}: {}", action, err);
        }
    }

    /// Toggle pause; only meaningful while playing
    pub fn toggle_pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.set_paused(!self.paused);
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
            self.events.push(GameEvent::PauseChanged { paused });
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = std::mem::replace(&mut self.phase, to);
        log::info!("Phase {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    fn clear_world(&mut self) {
        for id in self.world.clear() {
            self.events.push(GameEvent::Despawned { id });
        }
    }

    fn enter_playing(&mut self) {
        self.set_paused(false);
        self.clear_world();
        self.score = 0;

        let id = self.next_entity_id();
        let player = Entity::player(
            id,
            self.tuning.player_start,
            self.tuning.player_size,
            self.tuning.player_move_speed,
        );
        self.spawn(player);

        self.set_phase(GamePhase::Playing);
        self.spawner.arm(self.clock_ms);
        self.events.push(GameEvent::ScoreChanged { score: 0 });
    }

    pub(crate) fn enter_game_over(&mut self) {
        self.spawner.disarm();
        self.set_paused(false);
        self.set_phase(GamePhase::GameOver);
        log::info!("Game over, final score {}", self.score);
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
        });
    }

    fn enter_start(&mut self) {
        self.spawner.disarm();
        self.clear_world();
        self.set_phase(GamePhase::Start);
    }

    // === World mutation ===

    /// Add an entity to the world and announce it
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.events.push(GameEvent::Spawned {
            id,
            tag: entity.tag(),
            texture: entity.texture_name(),
            size: entity.size,
        });
        if let Some(replaced) = self.world.insert(entity) {
            self.events.push(GameEvent::Despawned { id: replaced.id });
        }
        id
    }

    pub fn spawn_enemy(&mut self, request: SpawnRequest) -> EntityId {
        let id = self.next_entity_id();
        let enemy = Entity::enemy(
            id,
            request.pos,
            self.tuning.enemy_size,
            request.variant,
            request.descent_speed,
            request.sway,
        );
        log::debug!("Spawned enemy {:?} at ({:.0}, {:.0})", id, request.pos.x, request.pos.y);
        self.spawn(enemy)
    }

    pub fn spawn_projectile(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let projectile = Entity::projectile(
            id,
            pos,
            self.tuning.projectile_size,
            self.tuning.projectile_speed,
        );
        self.spawn(projectile)
    }

    /// Fire from the player's nose. Without a live player this is a no-op.
    pub fn fire(&mut self) -> Option<EntityId> {
        let player = self.player()?;
        let size = self.tuning.projectile_size;
        let pos = Vec2::new(
            player.pos.x + (player.size.x - size.x) / 2.0,
            player.pos.y - size.y,
        );
        Some(self.spawn_projectile(pos))
    }

    /// Explosion at `pos` plus a particle burst from its centre
    pub fn spawn_explosion(&mut self, pos: Vec2, cause: ExplosionCause) -> EntityId {
        let id = self.next_entity_id();
        let explosion = Entity::explosion(
            id,
            pos,
            self.tuning.explosion_size,
            cause,
            self.tuning.explosion_lifetime_ms,
            self.tuning.explosion_peak_scale,
        );
        self.spawn(explosion);

        let tint = match cause {
            ExplosionCause::Enemy => 0xff6600,
            ExplosionCause::Ship => 0xffffff,
        };
        let centre = pos + self.tuning.explosion_size / 2.0;
        let speed = self.tuning.particle_speed;
        for _ in 0..self.particle_burst {
            let vel = if speed > 0.0 {
                Vec2::new(
                    self.rng.random_range(-speed..speed),
                    self.rng.random_range(-speed..speed),
                )
            } else {
                Vec2::ZERO
            };
            let jitter = self.tuning.particle_lifetime_jitter_ms;
            let lifetime = self.tuning.particle_lifetime_min_ms
                + if jitter > 0.0 { self.rng.random_range(0.0..jitter) } else { 0.0 };
            let particle_id = self.next_entity_id();
            let particle = Entity::particle(
                particle_id,
                centre,
                self.tuning.particle_size,
                vel,
                lifetime,
                tint,
            );
            self.spawn(particle);
        }

        id
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Drop dead entities and tell the renderer to release them
    pub(crate) fn purge_dead(&mut self) {
        for id in self.world.purge_dead() {
            self.events.push(GameEvent::Despawned { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(Tuning::default(), 1);
        assert_eq!(session.phase(), GamePhase::Start);
        assert!(session.world().is_empty());
        assert!(!session.spawner().is_armed());
    }

    #[test]
    fn test_start_creates_player_and_arms_spawner() {
        let mut session = GameSession::new(Tuning::default(), 1);
        session.start_game().unwrap();

        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score(), 0);
        let player = session.player().unwrap();
        assert_eq!(player.pos, Vec2::new(400.0, 500.0));
        assert!(session.spawner().is_armed());
        assert!(session.events().contains(&GameEvent::PhaseChanged {
            from: GamePhase::Start,
            to: GamePhase::Playing,
        }));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut session = GameSession::new(Tuning::default(), 1);
        assert_eq!(
            session.restart_game(),
            Err(TransitionError::Invalid {
                from: GamePhase::Start,
                to: GamePhase::Playing
            })
        );
        session.start_game().unwrap();
        assert!(session.start_game().is_err());
        assert!(session.show_start_screen().is_err());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_ui_action_dispatch() {
        let mut session = GameSession::new(Tuning::default(), 1);
        session.handle_ui_action(UiAction::RestartGame);
        assert_eq!(session.phase(), GamePhase::Start);
        session.handle_ui_action(UiAction::StartGame);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_fire_without_player_is_noop() {
        let mut session = GameSession::new(Tuning::default(), 1);
        assert_eq!(session.fire(), None);
        assert!(session.world().is_empty());
    }

    #[test]
    fn test_fire_from_player_nose() {
        let mut session = GameSession::new(Tuning::default(), 1);
        session.start_game().unwrap();
        let id = session.fire().unwrap();
        let projectile = session.world().get(id).unwrap();
        // Player 48 wide at x=400, projectile 8x16
        assert_eq!(projectile.pos, Vec2::new(420.0, 484.0));
        assert_eq!(projectile.vel, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_explosion_particle_burst() {
        let mut session = GameSession::new(Tuning::default(), 1).with_particle_burst(6);
        session.start_game().unwrap();
        session.spawn_explosion(Vec2::new(100.0, 100.0), ExplosionCause::Enemy);

        assert_eq!(session.world().count(EntityTag::Explosion), 1);
        assert_eq!(session.world().count(EntityTag::Particle), 6);
        for p in session.world().effects.iter().filter(|e| e.tag() == EntityTag::Particle) {
            assert_eq!(p.pos, Vec2::new(124.0, 124.0));
            assert!(p.vel.x.abs() <= 2.0 && p.vel.y.abs() <= 2.0);
        }
    }

    #[test]
    fn test_clock_frozen_outside_playing() {
        let mut session = GameSession::new(Tuning::default(), 1);
        session.advance_clock(5000.0);
        assert_eq!(session.clock_ms(), 0.0);

        session.start_game().unwrap();
        session.advance_clock(1000.0);
        assert_eq!(session.clock_ms(), 1000.0);
        assert_eq!(session.world().enemies.len(), 1);

        session.toggle_pause();
        session.advance_clock(5000.0);
        assert_eq!(session.clock_ms(), 1000.0);
        assert_eq!(session.world().enemies.len(), 1);
    }

    #[test]
    fn test_world_purge() {
        let mut world = World::default();
        let mut dead = Entity::projectile(EntityId(1), Vec2::ZERO, Vec2::ONE, 1.0);
        dead.destroy();
        world.insert(dead);
        world.insert(Entity::projectile(EntityId(2), Vec2::ZERO, Vec2::ONE, 1.0));
        let mut player = Entity::player(EntityId(3), Vec2::ZERO, Vec2::ONE, 1.0);
        player.destroy();
        world.insert(player);

        let mut removed = world.purge_dead();
        removed.sort();
        assert_eq!(removed, vec![EntityId(1), EntityId(3)]);
        assert_eq!(world.len(), 1);
        assert!(world.iter().all(Entity::is_alive));
    }
}
