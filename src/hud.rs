//! HUD and overlay text
//!
//! The DOM is updated by the front-end; the strings are built here so they
//! can be checked without a browser.

use crate::sim::{GamePhase, GameState};

pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

/// 1-based level number and the room's name
pub fn level_text(level_index: usize, name: &str) -> String {
    format!("Level: {} — {}", level_index + 1, name)
}

/// Title and subtitle for the overlay, or `None` while it should be hidden
pub fn overlay_text(phase: GamePhase, score: u32) -> Option<(String, String)> {
    match phase {
        GamePhase::Playing => None,
        GamePhase::Paused => Some((
            "Paused".to_string(),
            "Press Escape to keep haunting.".to_string(),
        )),
        GamePhase::Won => Some((
            "You Win!".to_string(),
            format!("You scoured {score} scares — the haunted mansion trembles."),
        )),
        GamePhase::Lost => Some(("Game Over".to_string(), String::new())),
    }
}

/// Snapshot of everything the HUD shows, compared frame to frame so the DOM
/// is only touched when something changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: String,
    pub level: String,
    pub overlay: Option<(String, String)>,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: score_text(state.score),
            level: level_text(state.level_index, state.current_level().name),
            overlay: overlay_text(state.phase, state.score),
        }
    }
}
