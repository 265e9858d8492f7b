//! Runtime preferences supplied by the host page
//!
//! Not persisted; the host passes them in (as JSON) when mounting the game.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
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

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Spark cap; oldest sparks are dropped beyond it
    pub fn max_sparks(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 600,
            QualityPreset::High => 2000,
        }
    }

    /// Whether to draw backboard shadows
    pub fn shadows_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Draw shadows (also gated by quality)
    pub shadows: bool,
    /// Draw the swipe trail
    pub touch_trail: bool,

    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            shadows: true,
            touch_trail: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse host-supplied JSON; missing fields take defaults, bad JSON yields defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Ignoring malformed settings: {err}");
                Self::default()
            }
        }
    }

    pub fn max_sparks(&self) -> usize {
        self.quality.max_sparks()
    }

    /// Effective shadow toggle (respects quality)
    pub fn draw_shadows(&self) -> bool {
        self.shadows && self.quality.shadows_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_str() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let s = Settings::from_json(r#"{"quality":"Low","muted":true}"#);
        assert_eq!(s.quality, QualityPreset::Low);
        assert!(s.muted);
        assert!(s.touch_trail);
        assert!(!s.draw_shadows());

        assert_eq!(Settings::from_json("{oops"), Settings::default());
        assert_eq!(Settings::from_preset(QualityPreset::High).max_sparks(), 2000);
    }
}
