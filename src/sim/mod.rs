//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-normalized timestep, driven by the caller
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each entity kind)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Hit, find_player_collision, overlaps, resolve_projectile_hits};
pub use entity::{
    EffectClock, EnemyVariant, Entity, EntityId, EntityKind, EntityTag, ExplosionCause, Sway,
};
pub use spawner::{SpawnRequest, Spawner, roll_enemy};
pub use state::{GameEvent, GamePhase, GameSession, World};
pub use tick::{TickInput, tick};
