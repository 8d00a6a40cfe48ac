//! Display filter for advisory entries
//!
//! Filtering only decides what is surfaced. The log itself is never touched.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::core::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub enabled: bool,
    pub muted: BTreeSet<RuleCategory>,
    /// Entries below this severity are hidden
    pub min_severity: Severity,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            muted: BTreeSet::new(),
            min_severity: Severity::Info,
        }
    }
}

impl AdvisorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Copy of this config with `category` muted
    pub fn mute_category(&self, category: RuleCategory) -> Self {
        let mut next = self.clone();
        next.muted.insert(category);
        next
    }

    /// Copy of this config with `category` unmuted
    pub fn unmute_category(&self, category: RuleCategory) -> Self {
        let mut next = self.clone();
        next.muted.remove(&category);
        next
    }

    pub fn with_min_severity(&self, min_severity: Severity) -> Self {
        Self {
            min_severity,
            ..self.clone()
        }
    }

    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    pub fn is_muted(&self, category: RuleCategory) -> bool {
        self.muted.contains(&category)
    }
}

/// Whether an entry should be surfaced under `config`
pub fn should_show(entry: &AdvisorEntry, config: &AdvisorConfig) -> bool {
    config.enabled && !config.is_muted(entry.category) && entry.severity >= config.min_severity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::entry::create_advisor_entry;

    #[test]
    fn test_severity_threshold() {
        let info = create_advisor_entry(RuleCategory::TurnEnd, Severity::Info, "i", None);
        let warn = create_advisor_entry(RuleCategory::TurnEnd, Severity::Warning, "w", None);
        let err = create_advisor_entry(RuleCategory::TurnEnd, Severity::Error, "e", None);

        let config = AdvisorConfig::default();
        assert!(should_show(&info, &config));

        let config = config.with_min_severity(Severity::Warning);
        assert!(!should_show(&info, &config));
        assert!(should_show(&warn, &config));

        let config = config.with_min_severity(Severity::Error);
        assert!(!should_show(&warn, &config));
        assert!(should_show(&err, &config));
    }

    #[test]
    fn test_mute_returns_new_value() {
        let base = AdvisorConfig::default();
        let muted = base.mute_category(RuleCategory::Combat);
        assert!(muted.is_muted(RuleCategory::Combat));
        assert!(!base.is_muted(RuleCategory::Combat));

        let unmuted = muted.unmute_category(RuleCategory::Combat);
        assert_eq!(unmuted, base);
        assert!(muted.is_muted(RuleCategory::Combat));
    }

    #[test]
    fn test_disabled_hides_everything() {
        let err = create_advisor_entry(RuleCategory::Alert, Severity::Error, "e", None);
        assert!(!should_show(&err, &AdvisorConfig::default().with_enabled(false)));
    }

    #[test]
    fn test_toml_config() {
        let config = AdvisorConfig::from_toml_str(
            r#"
            muted = ["combat", "turn_end"]
            min_severity = "warning"
            "#,
        )
        .unwrap();
        assert!(config.enabled);
        assert!(config.is_muted(RuleCategory::Combat));
        assert!(config.is_muted(RuleCategory::TurnEnd));
        assert_eq!(config.min_severity, Severity::Warning);
    }
}
