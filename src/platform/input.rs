//! Keyboard input mapping
//!
//! Raw key-down/key-up events are recorded into a held-key set regardless of
//! game phase. Movement is polled once per tick; fire and pause are
//! edge-triggered on key-down. Fire is gated by a cooldown measured against
//! the last *accepted* shot.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::consts::FIRE_COOLDOWN_MS;
use crate::sim::{GamePhase, GameSession, TickInput};

/// Raw key identifier as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Escape,
    Enter,
    Char(char),
}

impl KeyCode {
    /// Letter keys are case-insensitive
    pub fn normalized(self) -> Self {
        match self {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// Logical actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Pause,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Fire,
        Action::Pause,
    ];
}

/// Action -> raw keys. One action may have several keys.
///
/// Deserializing a partial map keeps the default keys of unlisted actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Action, Vec<KeyCode>>", into = "BTreeMap<Action, Vec<KeyCode>>")]
pub struct KeyBindings {
    map: BTreeMap<Action, Vec<KeyCode>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let map = BTreeMap::from([
            (Action::Left, vec![KeyCode::ArrowLeft, KeyCode::Char('a')]),
            (Action::Right, vec![KeyCode::ArrowRight, KeyCode::Char('d')]),
            (Action::Up, vec![KeyCode::ArrowUp, KeyCode::Char('w')]),
            (Action::Down, vec![KeyCode::ArrowDown, KeyCode::Char('s')]),
            (Action::Fire, vec![KeyCode::Space]),
            (Action::Pause, vec![KeyCode::Escape, KeyCode::Char('p')]),
        ]);
        Self { map }
    }
}

impl From<BTreeMap<Action, Vec<KeyCode>>> for KeyBindings {
    fn from(overrides: BTreeMap<Action, Vec<KeyCode>>) -> Self {
        let mut bindings = Self::default();
        for (action, keys) in overrides {
            bindings.bind(action, keys);
        }
        bindings
    }
}

impl From<KeyBindings> for BTreeMap<Action, Vec<KeyCode>> {
    fn from(bindings: KeyBindings) -> Self {
        bindings.map
    }
}

impl KeyBindings {
    /// Replace the keys for an action
    pub fn bind(&mut self, action: Action, keys: Vec<KeyCode>) {
        let keys = keys.into_iter().map(KeyCode::normalized).collect();
        self.map.insert(action, keys);
    }

    pub fn keys_for(&self, action: Action) -> &[KeyCode] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every action bound to `key`
    pub fn actions_for(&self, key: KeyCode) -> impl Iterator<Item = Action> + '_ {
        let key = key.normalized();
        self.map
            .iter()
            .filter(move |(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }
}

/// Turns raw key events into per-tick `TickInput`s
#[derive(Debug, Clone)]
pub struct InputMapper {
    bindings: KeyBindings,
    held: HashSet<KeyCode>,
    fire_cooldown_ms: f64,
    last_fire_ms: Option<f64>,
    pending_fires: u32,
    pending_pause: bool,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(KeyBindings::default(), FIRE_COOLDOWN_MS)
    }
}

impl InputMapper {
    pub fn new(bindings: KeyBindings, fire_cooldown_ms: f64) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            fire_cooldown_ms,
            last_fire_ms: None,
            pending_fires: 0,
            pending_pause: false,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bind(&mut self, action: Action, keys: Vec<KeyCode>) {
        self.bindings.bind(action, keys);
    }

    pub fn set_fire_cooldown(&mut self, cooldown_ms: f64) {
        self.fire_cooldown_ms = cooldown_ms;
    }

    /// Record a key press. Fire/pause are only dispatched while the session
    /// is playing; the key is recorded either way.
    pub fn key_down(&mut self, key: KeyCode, now_ms: f64, session: &GameSession) {
        let key = key.normalized();
        let fresh = self.held.insert(key);
        if !fresh || session.phase() != GamePhase::Playing {
            return;
        }

        let actions: Vec<Action> = self.bindings.actions_for(key).collect();
        for action in actions {
            match action {
                Action::Fire if !session.is_paused() => self.try_fire(now_ms),
                Action::Pause => self.pending_pause = !self.pending_pause,
                _ => {}
            }
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.held.remove(&key.normalized());
    }

    /// Forget every held key (e.g. on focus loss)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// True while any key bound to `action` is held
    pub fn is_active(&self, action: Action) -> bool {
        self.bindings
            .keys_for(action)
            .iter()
            .any(|key| self.held.contains(key))
    }

    /// Build the input for the next tick, consuming queued fire/pause intents.
    /// Outside `Playing` the result is always empty.
    pub fn poll(&mut self, session: &GameSession) -> TickInput {
        let fires = std::mem::take(&mut self.pending_fires);
        let pause = std::mem::take(&mut self.pending_pause);
        if session.phase() != GamePhase::Playing {
            return TickInput::default();
        }

        TickInput {
            left: self.is_active(Action::Left),
            right: self.is_active(Action::Right),
            up: self.is_active(Action::Up),
            down: self.is_active(Action::Down),
            fires,
            pause,
        }
    }

    fn try_fire(&mut self, now_ms: f64) {
        if let Some(last) = self.last_fire_ms {
            if now_ms - last < self.fire_cooldown_ms {
                log::trace!("Fire dropped ({:.0}ms since last shot)", now_ms - last);
                return;
            }
        }
        self.last_fire_ms = Some(now_ms);
        self.pending_fires += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;

    fn playing_session() -> GameSession {
        let mut session = GameSession::new(Tuning::default(), 7);
        session.start_game().unwrap();
        session
    }

    fn tap(mapper: &mut InputMapper, key: KeyCode, now_ms: f64, session: &GameSession) {
        mapper.key_down(key, now_ms, session);
        mapper.key_up(key);
    }

    #[test]
    fn test_multiple_keys_per_action() {
        let session = playing_session();
        let mut mapper = InputMapper::default();

        mapper.key_down(KeyCode::Char('A'), 0.0, &session);
        assert!(mapper.is_active(Action::Left));
        mapper.key_up(KeyCode::Char('a'));
        assert!(!mapper.is_active(Action::Left));

        mapper.key_down(KeyCode::ArrowLeft, 0.0, &session);
        let input = mapper.poll(&session);
        assert!(input.left);
        assert!(!input.right);
    }

    #[test]
    fn test_fire_cooldown() {
        let session = playing_session();
        let mut mapper = InputMapper::default();

        tap(&mut mapper, KeyCode::Space, 0.0, &session);
        tap(&mut mapper, KeyCode::Space, 100.0, &session);
        assert_eq!(mapper.poll(&session).fires, 1);

        tap(&mut mapper, KeyCode::Space, 250.0, &session);
        assert_eq!(mapper.poll(&session).fires, 1);
    }

    #[test]
    fn test_dropped_fire_does_not_reset_cooldown() {
        let session = playing_session();
        let mut mapper = InputMapper::default();

        tap(&mut mapper, KeyCode::Space, 0.0, &session);
        tap(&mut mapper, KeyCode::Space, 150.0, &session);
        // 200ms after the accepted shot, not after the dropped one
        tap(&mut mapper, KeyCode::Space, 200.0, &session);
        assert_eq!(mapper.poll(&session).fires, 2);
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let session = playing_session();
        let mut mapper = InputMapper::default();

        mapper.key_down(KeyCode::Space, 0.0, &session);
        // Auto-repeat while held
        mapper.key_down(KeyCode::Space, 500.0, &session);
        mapper.key_down(KeyCode::Space, 1000.0, &session);
        assert_eq!(mapper.poll(&session).fires, 1);
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let session = GameSession::new(Tuning::default(), 7);
        assert_eq!(session.phase(), GamePhase::Start);
        let mut mapper = InputMapper::default();

        mapper.key_down(KeyCode::Space, 0.0, &session);
        mapper.key_down(KeyCode::ArrowRight, 0.0, &session);
        assert!(mapper.is_active(Action::Right), "key state is still recorded");
        assert_eq!(mapper.poll(&session), TickInput::default());

        // Cooldown untouched: the first shot once playing is accepted
        let session = playing_session();
        mapper.key_up(KeyCode::Space);
        tap(&mut mapper, KeyCode::Space, 10.0, &session);
        let input = mapper.poll(&session);
        assert_eq!(input.fires, 1);
        assert!(input.right, "held key survives the phase change");
    }

    #[test]
    fn test_pause_toggle_intent() {
        let session = playing_session();
        let mut mapper = InputMapper::default();

        tap(&mut mapper, KeyCode::Char('p'), 0.0, &session);
        assert!(mapper.poll(&session).pause);
        assert!(!mapper.poll(&session).pause);

        // Two presses before a poll cancel out
        tap(&mut mapper, KeyCode::Escape, 0.0, &session);
        tap(&mut mapper, KeyCode::Char('p'), 0.0, &session);
        assert!(!mapper.poll(&session).pause);
    }

    #[test]
    fn test_rebind() {
        let session = playing_session();
        let mut mapper = InputMapper::default();
        mapper.bind(Action::Fire, vec![KeyCode::Char('J')]);

        tap(&mut mapper, KeyCode::Space, 0.0, &session);
        assert_eq!(mapper.poll(&session).fires, 0);
        tap(&mut mapper, KeyCode::Char('j'), 0.0, &session);
        assert_eq!(mapper.poll(&session).fires, 1);
    }
}
