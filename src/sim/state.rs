//! Game state and core simulation types
//!
//! Everything a restart has to reset lives here.

use glam::Vec2;

use super::camera::Camera;
use super::level::{Facing, Level, Rect, build_levels};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Reached the win score
    Won,
    /// Every kid is accounted for and the score fell short
    Lost,
}

impl GamePhase {
    /// Phases that end the run and show the overlay
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Things that happened during a tick, drained by the front-end for audio/HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A kid saw the ghost coming (costs a point)
    KidSpotted { level: usize, kid: usize },
    /// A kid got scared (scores a point)
    KidScared { level: usize, kid: usize },
    /// Scare attempt with nobody in range
    ScareMissed,
    /// Walked off one page of the mansion onto another
    LevelChanged { from: usize, to: usize },
    Victory,
    Defeat,
}

/// The ghost
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left of the bounding box
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub on_ground: bool,
    /// Frames until the next scare is allowed
    pub scare_cooldown: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            on_ground: false,
            scare_cooldown: 0.0,
        }
    }

    pub fn body(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_HEIGHT
    }

    /// Stand on top of `surface_y` with no vertical motion
    pub fn land(&mut self, surface_y: f32) {
        self.pos.y = surface_y - PLAYER_HEIGHT;
        self.vel.y = 0.0;
        self.on_ground = true;
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u32,
    /// Index into `levels`
    pub level_index: usize,
    pub levels: Vec<Level>,
    pub player: Player,
    pub camera: Camera,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run with the ghost standing on the Foyer floor
    pub fn new(tuning: Tuning) -> Self {
        let levels = build_levels();
        let ground = levels[0].ground();
        let mut player = Player::new(Vec2::new(PLAYER_SPAWN_X, 0.0));
        player.pos.y = ground.top() - PLAYER_HEIGHT;

        Self {
            tuning,
            phase: GamePhase::Playing,
            score: 0,
            level_index: 0,
            levels,
            player,
            camera: Camera::default(),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Start over: score, level, kids and ghost position.
    /// Viewport and tuning are kept.
    pub fn restart(&mut self) {
        self.score = 0;
        self.level_index = 0;
        self.levels = build_levels();
        self.player = Player::new(Vec2::new(PLAYER_SPAWN_X, PLAYER_RESTART_Y));
        self.camera.offset_x = 0.0;
        self.phase = GamePhase::Playing;
        self.events.clear();
        log::info!("Run restarted");
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.camera.viewport = Vec2::new(width, height);
        }
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    pub fn total_kids(&self) -> usize {
        self.levels.iter().map(|l| l.kids.len()).sum()
    }

    /// Score needed to win. Capped by the number of kids so the run stays
    /// winnable with fewer kids than the configured target.
    pub fn win_target(&self) -> u32 {
        let kids = u32::try_from(self.total_kids()).unwrap_or(u32::MAX);
        self.tuning.required_score_to_win.min(kids)
    }

    /// True once no kid is left to scare or to be spotted by
    pub fn all_kids_resolved(&self) -> bool {
        self.levels
            .iter()
            .flat_map(|l| l.kids.iter())
            .all(|k| k.is_resolved())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn add_point(&mut self) {
        self.score = self.score.saturating_add(1);
    }

    pub(crate) fn lose_point(&mut self) {
        self.score = self.score.saturating_sub(1);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}
