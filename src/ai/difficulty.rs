//! Difficulty profiles loaded from TOML
//!
//! A profile tunes how cautious the planner is and how often it fumbles an
//! activation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{HeistError, Result};

/// Named difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = HeistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(HeistError::InvalidConfig(format!("unknown difficulty {other}"))),
        }
    }
}

/// Planner tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    #[serde(default)]
    pub name: String,
    /// Preference for safety over progress (0.0 = reckless, 1.0 = cautious)
    pub safety_weight: f32,
    /// Willingness to pick fights (0.0 = avoids combat, 1.0 = seeks it)
    pub aggression: f32,
    /// Probability that a character's planned activation is fumbled
    pub mistake_chance: f32,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::preset(Difficulty::Normal)
    }
}

impl DifficultyProfile {
    pub fn preset(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                name: "easy".into(),
                safety_weight: 0.8,
                aggression: 0.3,
                mistake_chance: 0.25,
            },
            Difficulty::Normal => Self {
                name: "normal".into(),
                safety_weight: 0.6,
                aggression: 0.5,
                mistake_chance: 0.1,
            },
            Difficulty::Hard => Self {
                name: "hard".into(),
                safety_weight: 0.4,
                aggression: 0.7,
                mistake_chance: 0.0,
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let profile: DifficultyProfile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file; the name defaults to the file stem
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut profile = Self::from_toml_str(&content)?;
        if profile.name.is_empty() {
            profile.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("safety_weight", self.safety_weight),
            ("aggression", self.aggression),
            ("mistake_chance", self.mistake_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(HeistError::InvalidConfig(format!(
                    "{field} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}
