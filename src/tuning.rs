//! Data-driven game balance
//!
//! Every value is expressed in frame units (1/60 s). Loaded from the
//! `#ghost-tuning` JSON block when present; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Horizontal acceleration per frame at base speed
    pub run_accel: f32,
    /// Reference run speed
    pub base_speed: f32,
    /// Speed multiplier while sprint is held
    pub sprint_multiplier: f32,
    /// Upward velocity applied on jump
    pub jump_strength: f32,
    /// Horizontal velocity retained per frame while grounded
    pub ground_friction: f32,
    /// Horizontal velocity retained per frame while airborne
    pub air_friction: f32,
    /// Kids closer than this to the ghost are scared
    pub scare_radius: f32,
    /// Horizontal range at which a kid spots the ghost in front of them
    pub detection_radius: f32,
    /// Vertical band for spotting
    pub detection_height: f32,
    /// Frames between scare attempts
    pub scare_cooldown: f32,
    /// Upward kick given to a kid when scared
    pub kid_startle_velocity: f32,
    /// Score needed to win (capped by the number of kids in the mansion)
    pub required_score_to_win: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.9,
            run_accel: 0.6,
            base_speed: 3.2,
            sprint_multiplier: 1.6,
            jump_strength: 15.0,
            ground_friction: 0.86,
            air_friction: 0.995,
            scare_radius: 80.0,
            detection_radius: 160.0,
            detection_height: 60.0,
            scare_cooldown: 18.0,
            kid_startle_velocity: 6.0,
            required_score_to_win: 10,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Per-frame acceleration for the current sprint state
    pub fn run_accel_for(&self, sprint: bool) -> f32 {
        if sprint {
            self.run_accel * self.sprint_multiplier
        } else {
            self.run_accel
        }
    }

    /// Load from the page (WASM only); falls back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("ghost-tuning"))
            .and_then(|el| el.text_content());

        match json.as_deref().map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Bad #ghost-tuning block, using defaults: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_scales_accel() {
        let t = Tuning::default();
        assert!((t.run_accel_for(false) - 0.6).abs() < 1e-6);
        assert!((t.run_accel_for(true) - 0.96).abs() < 1e-5);
    }

    #[test]
    fn test_zero_base_speed_keeps_accel_finite() {
        let t = Tuning::from_json(r#"{ "base_speed": 0 }"#).unwrap();
        assert!((t.run_accel_for(false) - 0.6).abs() < 1e-6);
        assert!((t.run_accel_for(true) - 0.96).abs() < 1e-5);
        assert!(t.run_accel_for(true).is_finite());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "gravity": 1.2, "required_score_to_win": 5 }"#).unwrap();
        assert_eq!(t.gravity, 1.2);
        assert_eq!(t.required_score_to_win, 5);
        assert_eq!(t.jump_strength, 15.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ gravity: }").is_err());
    }
}
