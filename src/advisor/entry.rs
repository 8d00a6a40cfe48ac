//! Advisory entries and the session log that holds them

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, EntryId};

/// Rule family an entry belongs to; also the unit of muting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Movement,
    ActionSlots,
    StateChange,
    Combat,
    VictoryPoints,
    Alert,
    TurnEnd,
}

impl RuleCategory {
    pub fn all() -> [RuleCategory; 7] {
        [
            RuleCategory::Movement,
            RuleCategory::ActionSlots,
            RuleCategory::StateChange,
            RuleCategory::Combat,
            RuleCategory::VictoryPoints,
            RuleCategory::Alert,
            RuleCategory::TurnEnd,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleCategory::Movement => "movement",
            RuleCategory::ActionSlots => "action-slots",
            RuleCategory::StateChange => "state-change",
            RuleCategory::Combat => "combat",
            RuleCategory::VictoryPoints => "victory-points",
            RuleCategory::Alert => "alert",
            RuleCategory::TurnEnd => "turn-end",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered so that `Info < Warning < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One suspected rule deviation. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorEntry {
    pub id: EntryId,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub category: RuleCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AdvisorEntry {
    pub fn with_character(mut self, id: CharacterId) -> Self {
        self.character_id = Some(id);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

impl std::fmt::Display for AdvisorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}] {}", self.severity, self.category, self.message)
    }
}

/// Create an entry with a fresh id stamped with the current wall-clock time
pub fn create_advisor_entry(
    category: RuleCategory,
    severity: Severity,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> AdvisorEntry {
    AdvisorEntry {
        id: EntryId::new(),
        timestamp_ms: now_ms(),
        category,
        severity,
        message: message.into(),
        character_id: None,
        action: None,
        details,
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Append-only log with a fixed capacity; the oldest entry is evicted when full
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorLog {
    capacity: usize,
    entries: VecDeque<AdvisorEntry>,
    /// Entries dropped to make room
    evicted: u64,
}

impl AdvisorLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
            evicted: 0,
        }
    }

    pub fn push(&mut self, entry: AdvisorEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = AdvisorEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &AdvisorEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: EntryId) -> Option<&AdvisorEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for AdvisorLog {
    fn default() -> Self {
        Self::with_capacity(crate::core::config::EngineConfig::default().advisor_log_capacity)
    }
}
