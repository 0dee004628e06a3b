//! Game settings and preferences
//!
//! Read from the page's `#ghost-settings` JSON block at startup. Settings
//! live for the session only and are never written back.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Rain streaks drawn over the scene
    pub fn rain_drops(&self) -> u32 {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 80,
            QualityPreset::High => 120,
        }
    }

    /// Soft glow around the ghost
    pub fn glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(format!("unknown quality preset: {other}")),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Audio ===
    /// Ambience and effects on at startup (the page's toggle may override)
    pub audio_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Rain and thunder volume (0.0 - 1.0)
    pub ambience_volume: f32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Freeze the rain animation
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            audio_enabled: true,
            master_volume: 1.0,
            sfx_volume: 1.0,
            ambience_volume: 1.0,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    pub fn effective_ambience_volume(&self) -> f32 {
        (self.master_volume * self.ambience_volume).clamp(0.0, 1.0)
    }

    pub fn rain_drops(&self) -> u32 {
        self.quality.rain_drops()
    }

    pub fn glow_enabled(&self) -> bool {
        self.quality.glow_enabled()
    }

    /// Rain scrolls unless reduced motion is on
    pub fn rain_animated(&self) -> bool {
        !self.reduced_motion
    }

    /// Load from the page (WASM only); falls back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("ghost-settings"))
            .and_then(|el| el.text_content());

        match json.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings (quality {})", settings.quality.as_str());
                settings
            }
            Some(Err(e)) => {
                log::warn!("Bad #ghost-settings block, using defaults: {e}");
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native builds have no page to read from
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
