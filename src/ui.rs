//! Screen collaborators
//!
//! Screens are built elsewhere. The core only shows and hides them and
//! receives their button activations back as `UiAction` values.

use serde::{Deserialize, Serialize};

/// Button activations a screen can send back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiAction {
    /// "Start" on the title screen
    StartGame,
    /// "Play again" on the game-over screen
    RestartGame,
    /// "Main menu" on the game-over screen
    ShowStartScreen,
}

impl UiAction {
    pub fn label(&self) -> &'static str {
        match self {
            UiAction::StartGame => "Start",
            UiAction::RestartGame => "Play again",
            UiAction::ShowStartScreen => "Main menu",
        }
    }
}

/// Show/hide contract for the game's screens and HUD
pub trait Views {
    fn show_start(&mut self);
    fn hide_start(&mut self);
    fn show_game_over(&mut self, final_score: u32);
    fn hide_game_over(&mut self);
    fn show_pause(&mut self);
    fn hide_pause(&mut self);
    fn set_score_visible(&mut self, visible: bool);
    fn set_score(&mut self, score: u32);
}
