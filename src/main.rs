//! Kosmos Raider - headless native runner
//!
//! Drives a session with an autopilot producing raw key events, renders to the
//! log and prints a summary. Useful for soak-testing the core and reproducing
//! a run from its seed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;

use kosmos_raider::assets::{AssetLibrary, AssetManifest, AssetSource, Drawable, FileSource, MissingSource};
use kosmos_raider::consts::FRAME_MS;
use kosmos_raider::platform::{InputMapper, KeyCode};
use kosmos_raider::renderer::{NodeId, Presenter, Renderer};
use kosmos_raider::sim::{GamePhase, GameSession};
use kosmos_raider::ui::{UiAction, Views};
use kosmos_raider::{Settings, Tuning};

#[derive(Parser, Debug)]
#[command(name = "kosmos-raider")]
#[command(about = "Run Kosmos Raider headless with an autopilot at the controls")]
struct Cli {
    /// RNG seed (overrides settings; random when neither is given)
    #[arg(long)]
    seed: Option<u64>,
    /// Frames to simulate
    #[arg(long, default_value_t = 3_600)]
    frames: u32,
    /// Tuning JSON file
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Directory holding the texture files; placeholders are used without it
    #[arg(long)]
    assets: Option<PathBuf>,
    /// How many times to press "Play again" after a game over
    #[arg(long, default_value_t = 1)]
    restarts: u32,
}

/// Renderer that only keeps count of its nodes
#[derive(Default)]
struct LogRenderer {
    next: u64,
    live: usize,
    peak: usize,
}

impl Renderer for LogRenderer {
    fn attach(&mut self, drawable: &Drawable) -> NodeId {
        self.next += 1;
        self.live += 1;
        self.peak = self.peak.max(self.live);
        log::trace!("attach node {} ({:?})", self.next, drawable.size());
        NodeId(self.next)
    }

    fn detach(&mut self, node: NodeId) {
        self.live = self.live.saturating_sub(1);
        log::trace!("detach node {}", node.0);
    }

    fn set_position(&mut self, _node: NodeId, _pos: Vec2) {}
    fn set_scale(&mut self, _node: NodeId, _scale: Vec2) {}
    fn set_alpha(&mut self, _node: NodeId, _alpha: f32) {}
    fn set_visible(&mut self, _node: NodeId, _visible: bool) {}
}

/// Screens as log lines; keeps every final score for the summary
#[derive(Default)]
struct LogViews {
    results: Vec<u32>,
}

impl Views for LogViews {
    fn show_start(&mut self) {
        log::info!("[screen] title");
    }
    fn hide_start(&mut self) {}
    fn show_game_over(&mut self, final_score: u32) {
        log::info!("[screen] game over, score {}", final_score);
        self.results.push(final_score);
    }
    fn hide_game_over(&mut self) {}
    fn show_pause(&mut self) {
        log::info!("[screen] paused");
    }
    fn hide_pause(&mut self) {}
    fn set_score_visible(&mut self, _visible: bool) {}
    fn set_score(&mut self, score: u32) {
        log::debug!("[hud] score {}", score);
    }
}

/// Chases the lowest enemy and taps fire
#[derive(Default)]
struct Autopilot {
    held: Option<KeyCode>,
    fire_down: bool,
}

impl Autopilot {
    /// Emit this frame's raw key events
    fn drive(&mut self, session: &GameSession, input: &mut InputMapper, now_ms: f64) {
        let Some(player) = session.player() else {
            return;
        };
        let centre = player.pos.x + player.size.x / 2.0;

        let target = session
            .world()
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x + e.size.x / 2.0);

        let want = match target {
            Some(x) if x < centre - 4.0 => Some(KeyCode::ArrowLeft),
            Some(x) if x > centre + 4.0 => Some(KeyCode::ArrowRight),
            _ => None,
        };
        if want != self.held {
            if let Some(key) = self.held.take() {
                input.key_up(key);
            }
            if let Some(key) = want {
                input.key_down(key, now_ms, session);
            }
            self.held = want;
        }

        // Fire is edge-triggered: alternate press and release
        if self.fire_down {
            input.key_up(KeyCode::Space);
        } else if target.is_some() {
            input.key_down(KeyCode::Space, now_ms, session);
        }
        self.fire_down = !self.fire_down && target.is_some();
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path).with_context(|| format!("loading tuning {}", path.display()))?,
        None => Tuning::default(),
    };
    let settings = match &cli.settings {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings {}", path.display()))?,
        None => Settings::default(),
    };
    let seed = cli.seed.or(settings.seed).unwrap_or_else(rand::random);
    log::info!("Kosmos Raider starting (seed {}, quality {})", seed, settings.quality.as_str());

    let mut library = AssetLibrary::new(AssetManifest::default());
    library.on_progress(|loaded, total| log::debug!("assets {}/{}", loaded, total));
    let mut source: Box<dyn AssetSource> = match &cli.assets {
        Some(root) => Box::new(FileSource::new(root)),
        None => Box::new(MissingSource),
    };
    library.load_all(source.as_mut());

    let mut session = GameSession::new(tuning.clone(), seed).with_particle_burst(settings.particle_burst());
    let mut input = InputMapper::new(settings.key_bindings.clone(), tuning.fire_cooldown_ms);
    let mut presenter = Presenter::new();
    let mut renderer = LogRenderer::default();
    let mut views = LogViews::default();
    let mut pilot = Autopilot::default();

    presenter.show_phase(&mut views, session.phase());
    log::info!("Pressing '{}'", UiAction::StartGame.label());
    session.handle_ui_action(UiAction::StartGame);

    let mut restarts_left = cli.restarts;
    let mut frames_run = 0;
    for frame in 0..cli.frames {
        let now_ms = frame as f64 * FRAME_MS as f64;

        if session.phase() == GamePhase::GameOver {
            input.release_all();
            pilot = Autopilot::default();
            let action = if restarts_left > 0 {
                restarts_left -= 1;
                UiAction::RestartGame
            } else {
                UiAction::ShowStartScreen
            };
            log::info!("Pressing '{}'", action.label());
            session.handle_ui_action(action);
        }
        if session.phase() == GamePhase::Start {
            break;
        }

        pilot.drive(&session, &mut input, now_ms);
        let tick_input = input.poll(&session);
        session.frame(&tick_input, 1.0);
        presenter.apply(&mut session, &mut renderer, &mut views, &library);
        frames_run += 1;
    }
    presenter.apply(&mut session, &mut renderer, &mut views, &library);

    let results: Vec<String> = views.results.iter().map(u32::to_string).collect();
    println!(
        "seed={} frames={} phase={:?} score={} games=[{}] peak_nodes={}",
        seed,
        frames_run,
        session.phase(),
        session.score(),
        results.join(", "),
        renderer.peak,
    );

    Ok(())
}
