//! Player settings and preferences
//!
//! Kept apart from `Tuning`: these are per-player choices, not game balance.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::input::KeyBindings;

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

    /// Particles emitted alongside each explosion
    pub fn particle_burst(&self) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => 6,
            QualityPreset::High => 12,
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle bursts on explosions
    pub particles: bool,
    /// Action -> raw key mapping
    pub key_bindings: KeyBindings,
    /// Fixed RNG seed (random per run when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            key_bindings: KeyBindings::default(),
            seed: None,
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

    /// Effective particle burst size (respects the particles toggle)
    pub fn particle_burst(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.particle_burst()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::input::{Action, KeyCode};

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_particle_toggle() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        assert_eq!(settings.particle_burst(), 12);
        settings.particles = false;
        assert_eq!(settings.particle_burst(), 0);
    }

    #[test]
    fn test_json_overrides_bindings() {
        let settings = Settings::from_json(
            r#"{ "quality": "Low", "key_bindings": { "Fire": ["Enter", { "Char": "j" }] } }"#,
        )
        .unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(
            settings.key_bindings.keys_for(Action::Fire),
            &[KeyCode::Enter, KeyCode::Char('j')]
        );
        // Unlisted actions keep their defaults
        assert!(settings.key_bindings.keys_for(Action::Left).contains(&KeyCode::ArrowLeft));
    }

    #[test]
    fn test_missing_file_is_default() {
        let settings = Settings::load(Path::new("/nonexistent/kosmos/settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
