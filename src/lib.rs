//! Ghost Scare - a haunted mansion side-scroller
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, landing, camera, kid reactions)
//! - `renderer`: WebGPU SDF rendering pipeline
//! - `audio`: Procedural Web Audio ambience and effects
//! - `hud`: Score/level/overlay text
//! - `settings`: Presentation preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one frame unit at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Frame units per second; per-frame tuning values are scaled by this
    pub const FRAME_RATE: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta the loop will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World width of a single level
    pub const LEVEL_WIDTH: f32 = 1600.0;
    /// Crossing `LEVEL_WIDTH - RIGHT_EDGE_MARGIN` moves to the next level
    pub const RIGHT_EDGE_MARGIN: f32 = 40.0;
    /// Player x after entering a level from its left side
    pub const LEFT_ENTRY_X: f32 = 40.0;
    /// Player x after entering a level from its right side
    pub const RIGHT_ENTRY_X: f32 = LEVEL_WIDTH - 48.0;

    /// Ghost bounding box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    /// Spawn column on a fresh run
    pub const PLAYER_SPAWN_X: f32 = 120.0;
    /// Spawn height after a restart (drops onto the ground)
    pub const PLAYER_RESTART_Y: f32 = 200.0;

    /// How far below the viewport the ghost may fall before being recovered
    pub const FALL_MARGIN: f32 = 200.0;

    /// Vertical anchor offsets from a kid's feet for spotting and scaring
    pub const KID_SIGHT_OFFSET: f32 = 5.0;
    pub const KID_SCARE_OFFSET: f32 = 10.0;

    /// Default viewport until the front-end reports the real one
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
}

/// Convert a `#rrggbb` literal packed as `0xRRGGBB` to linear-ish RGB floats
#[inline]
pub const fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb(0x00ff00), [0.0, 1.0, 0.0]);
        let c = rgb(0x0b0f14);
        assert!((c[2] - 20.0 / 255.0).abs() < 1e-6);
    }
}
