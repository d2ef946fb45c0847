//! Rendering contract
//!
//! Drawing happens outside the core. The `Presenter` drains session events
//! and turns them into `Renderer` and `Views` calls, then syncs every live
//! entity's transform once per frame. The core never reads anything back.

use std::collections::HashMap;

use glam::Vec2;

use crate::assets::{Drawable, TextureProvider};
use crate::sim::{EntityId, GameEvent, GamePhase, GameSession};
use crate::ui::Views;

/// Opaque handle to a visual node owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

pub trait Renderer {
    /// Add a visual node for `drawable`, initially visible at the origin
    fn attach(&mut self, drawable: &Drawable) -> NodeId;
    fn detach(&mut self, node: NodeId);
    fn set_position(&mut self, node: NodeId, pos: Vec2);
    fn set_scale(&mut self, node: NodeId, scale: Vec2);
    fn set_alpha(&mut self, node: NodeId, alpha: f32);
    fn set_visible(&mut self, node: NodeId, visible: bool);
    /// 0xRRGGBB multiply tint; renderers without tinting can ignore it
    fn set_tint(&mut self, _node: NodeId, _rgb: u32) {}
}

#[derive(Debug, Clone, Copy)]
struct Visual {
    node: NodeId,
    /// Stretches the drawable's native size to the entity's bounds
    base_scale: Vec2,
}

/// Keeps one renderer node per live entity
#[derive(Debug, Default)]
pub struct Presenter {
    visuals: HashMap<EntityId, Visual>,
    /// Entity nodes are hidden behind the pause view
    hidden: bool,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently attached
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn node_for(&self, id: EntityId) -> Option<NodeId> {
        self.visuals.get(&id).map(|v| v.node)
    }

    fn set_nodes_visible(&mut self, renderer: &mut dyn Renderer, visible: bool) {
        self.hidden = !visible;
        for visual in self.visuals.values() {
            renderer.set_visible(visual.node, visible);
        }
    }

    /// Put the screens into the state for `phase`. Used at startup, before
    /// any event has been produced.
    pub fn show_phase(&self, views: &mut dyn Views, phase: GamePhase) {
        match phase {
            GamePhase::Start => {
                views.hide_game_over();
                views.hide_pause();
                views.set_score_visible(false);
                views.show_start();
            }
            GamePhase::Playing => {
                views.hide_start();
                views.hide_game_over();
                views.hide_pause();
                views.set_score_visible(true);
            }
            GamePhase::GameOver => {
                views.hide_pause();
                views.set_score_visible(false);
            }
        }
    }

    /// Apply pending session events, then sync transforms of live entities
    pub fn apply(
        &mut self,
        session: &mut GameSession,
        renderer: &mut dyn Renderer,
        views: &mut dyn Views,
        textures: &dyn TextureProvider,
    ) {
        for event in session.drain_events() {
            match event {
                GameEvent::Spawned {
                    id, texture, size, ..
                } => {
                    let drawable = textures.get(texture);
                    let node = renderer.attach(&drawable);
                    let native = drawable.size();
                    let base_scale = if native.x > 0.0 && native.y > 0.0 {
                        size / native
                    } else {
                        Vec2::ONE
                    };
                    if let Some(tint) = session.world().get(id).and_then(|e| e.tint()) {
                        renderer.set_tint(node, tint);
                    }
                    if self.hidden {
                        renderer.set_visible(node, false);
                    }
                    if let Some(old) = self.visuals.insert(id, Visual { node, base_scale }) {
                        renderer.detach(old.node);
                    }
                }
                GameEvent::Despawned { id } => {
                    if let Some(visual) = self.visuals.remove(&id) {
                        renderer.detach(visual.node);
                    }
                }
                GameEvent::ScoreChanged { score } => views.set_score(score),
                GameEvent::PhaseChanged { to, .. } => self.show_phase(views, to),
                GameEvent::GameOver { final_score } => views.show_game_over(final_score),
                GameEvent::PauseChanged { paused } => {
                    if paused {
                        views.show_pause();
                    } else {
                        views.hide_pause();
                    }
                    self.set_nodes_visible(renderer, !paused);
                }
            }
        }

        for entity in session.world().iter() {
            let Some(visual) = self.visuals.get(&entity.id) else {
                continue;
            };
            renderer.set_position(visual.node, entity.pos);
            renderer.set_scale(visual.node, visual.base_scale * entity.scale());
            renderer.set_alpha(visual.node, entity.alpha());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::Tuning;
    use crate::assets::{Placeholder, Texture};
    use crate::sim::TickInput;

    #[derive(Default)]
    struct CountingRenderer {
        next: u64,
        attached: Vec<NodeId>,
        scales: HashMap<NodeId, Vec2>,
        tints: HashMap<NodeId, u32>,
        hidden: HashSet<NodeId>,
    }

    impl Renderer for CountingRenderer {
        fn attach(&mut self, _drawable: &Drawable) -> NodeId {
            self.next += 1;
            let node = NodeId(self.next);
            self.attached.push(node);
            node
        }
        fn detach(&mut self, node: NodeId) {
            self.attached.retain(|n| *n != node);
        }
        fn set_position(&mut self, _node: NodeId, _pos: Vec2) {}
        fn set_scale(&mut self, node: NodeId, scale: Vec2) {
            self.scales.insert(node, scale);
        }
        fn set_alpha(&mut self, _node: NodeId, _alpha: f32) {}
        fn set_visible(&mut self, node: NodeId, visible: bool) {
            if visible {
                self.hidden.remove(&node);
            } else {
                self.hidden.insert(node);
            }
        }
        fn set_tint(&mut self, node: NodeId, rgb: u32) {
            self.tints.insert(node, rgb);
        }
    }

    #[derive(Default)]
    struct NullViews {
        score: u32,
        game_over: Option<u32>,
    }

    impl Views for NullViews {
        fn show_start(&mut self) {}
        fn hide_start(&mut self) {}
        fn show_game_over(&mut self, final_score: u32) {
            self.game_over = Some(final_score);
        }
        fn hide_game_over(&mut self) {
            self.game_over = None;
        }
        fn show_pause(&mut self) {}
        fn hide_pause(&mut self) {}
        fn set_score_visible(&mut self, _visible: bool) {}
        fn set_score(&mut self, score: u32) {
            self.score = score;
        }
    }

    /// Every name resolves to an 80x80 texture
    struct BigTextures;

    impl TextureProvider for BigTextures {
        fn get(&self, name: &str) -> Drawable {
            if name == "particle" {
                return Drawable::Placeholder(Placeholder::for_name(name));
            }
            Drawable::Texture(Texture {
                url: format!("{name}.png"),
                width: 80,
                height: 80,
            })
        }
    }

    #[test]
    fn test_nodes_follow_world() {
        let mut session = GameSession::new(Tuning::default(), 3).with_particle_burst(6);
        let mut presenter = Presenter::new();
        let mut renderer = CountingRenderer::default();
        let mut views = NullViews::default();

        session.start_game().unwrap();
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(presenter.len(), 1);

        // Player is 48x48 drawn from an 80x80 texture
        let player = session.player().unwrap().id;
        let node = presenter.node_for(player).unwrap();
        assert_eq!(renderer.scales[&node], Vec2::splat(0.6));

        session.spawn_explosion(Vec2::new(100.0, 100.0), crate::sim::ExplosionCause::Enemy);
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(presenter.len(), 8);
        assert_eq!(renderer.attached.len(), 8);
        assert_eq!(renderer.tints.len(), 6);

        // Effects expire after a second of frames
        for _ in 0..70 {
            session.frame(&TickInput::default(), 1.0);
        }
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(presenter.len(), session.world().len());
        assert_eq!(renderer.attached.len(), session.world().len());
    }

    #[test]
    fn test_pause_hides_entity_nodes() {
        let mut session = GameSession::new(Tuning::default(), 3);
        let mut presenter = Presenter::new();
        let mut renderer = CountingRenderer::default();
        let mut views = NullViews::default();

        session.start_game().unwrap();
        session.spawn_projectile(Vec2::new(100.0, 100.0));
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert!(renderer.hidden.is_empty());

        session.toggle_pause();
        // Spawned behind the pause view: starts hidden too
        session.spawn_projectile(Vec2::new(200.0, 100.0));
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(renderer.hidden.len(), 3);

        session.toggle_pause();
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert!(renderer.hidden.is_empty());
    }

    #[test]
    fn test_views_track_score_and_game_over() {
        let mut session = GameSession::new(Tuning::default(), 3);
        let mut presenter = Presenter::new();
        let mut renderer = CountingRenderer::default();
        let mut views = NullViews::default();

        session.start_game().unwrap();
        session.spawn_projectile(Vec2::new(200.0, 300.0));
        session.spawn_enemy(crate::sim::SpawnRequest {
            pos: Vec2::new(200.0, 295.0),
            variant: crate::sim::EnemyVariant::Ufo2,
            descent_speed: 0.0,
            sway: None,
            due_ms: 0.0,
        });
        session.frame(&TickInput::default(), 1.0);
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(views.score, 1);

        session.spawn_enemy(crate::sim::SpawnRequest {
            pos: Vec2::new(400.0, 500.0),
            variant: crate::sim::EnemyVariant::Ufo1,
            descent_speed: 0.0,
            sway: None,
            due_ms: 0.0,
        });
        session.frame(&TickInput::default(), 1.0);
        presenter.apply(&mut session, &mut renderer, &mut views, &BigTextures);
        assert_eq!(views.game_over, Some(1));
    }
}
