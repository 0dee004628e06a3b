//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only
//! - Stable iteration order (levels and kids in layout order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::land_on_platforms;
pub use level::{Facing, Kid, Level, Rect, build_levels};
pub use state::{GameEvent, GamePhase, GameState, Player};
pub use tick::{TickInput, attempt_scare, tick};
