//! Engine configuration with documented constants
//!
//! Game-rule numbers the planner and the advisor both depend on live here so
//! that the two never disagree about, say, how many action slots exist.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{HeistError, Result};

/// Configuration for the tactical engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === GAME LENGTH ===
    /// Number of turns in a game. Turns remaining is `max_turns - turn_number`.
    pub max_turns: u32,

    // === ACTIVATIONS ===
    /// Action-slot budget of a single character activation
    pub action_slots: u32,

    // === ALERT ===
    /// Ascending cut points on `compromised + modifier`.
    ///
    /// The alert level is the number of thresholds the total has reached, so
    /// `[2, 4, 6]` maps 0-1 to level 0, 2-3 to level 1, 4-5 to level 2 and
    /// 6+ to level 3.
    pub alert_thresholds: Vec<u32>,

    // === THREATS ===
    /// Cells added to an enemy's movement when deciding whether it threatens a character
    pub threat_range_bonus: u32,

    // === ADVISOR ===
    /// Maximum advisory entries kept per session; oldest are evicted first
    pub advisor_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            action_slots: 3,
            alert_thresholds: vec![2, 4, 6],
            threat_range_bonus: 2,
            advisor_log_capacity: 500,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(HeistError::InvalidConfig("max_turns must be positive".into()));
        }

        if self.action_slots == 0 {
            return Err(HeistError::InvalidConfig(
                "action_slots must be positive".into(),
            ));
        }

        if self.alert_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HeistError::InvalidConfig(format!(
                "alert_thresholds must be strictly ascending, got {:?}",
                self.alert_thresholds
            )));
        }

        if self.advisor_log_capacity == 0 {
            return Err(HeistError::InvalidConfig(
                "advisor_log_capacity must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Map a raw compromised count (modifier already added) to an alert level
    pub fn alert_level_for(&self, total: u32) -> u32 {
        self.alert_thresholds.iter().filter(|&&t| total >= t).count() as u32
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Get the global engine config (initializes with defaults if not set)
pub fn config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

/// Set the global engine config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: EngineConfig) -> std::result::Result<(), EngineConfig> {
    CONFIG.set(config)
}
