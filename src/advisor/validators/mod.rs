//! One validator per rule category
//!
//! Validators are pure: they read the board through a `RuleContext`, never
//! mutate it, and return zero or more entries. A partial or inconsistent
//! state (a target already removed, an unknown id) produces no entries.

pub mod alert;
pub mod combat;
pub mod movement;
pub mod slots;
pub mod state_change;
pub mod turn_end;
pub mod vp;

pub use alert::validate_alert_level;
pub use combat::{validate_combat_action, AttackReport};
pub use movement::validate_movement;
pub use slots::validate_action_slots;
pub use state_change::{check_loud_attack_transition, validate_state_change};
pub use turn_end::validate_turn_end;
pub use vp::validate_vp_award;

use serde::{Deserialize, Serialize};

use crate::advisor::config::AdvisorConfig;
use crate::advisor::entry::{create_advisor_entry, AdvisorEntry, RuleCategory, Severity};
use crate::ai::executor::DiceEvent;
use crate::core::config::EngineConfig;
use crate::core::types::CharacterId;
use crate::data::actions::ActionKind;
use crate::data::tables::DomainTables;
use crate::game::map_state::MapState;
use crate::spatial::GridType;

/// Read-only view every validator works from
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub map: &'a MapState,
    pub grid: GridType,
    pub rules: &'a EngineConfig,
    pub tables: &'a DomainTables,
    pub config: &'a AdvisorConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        map: &'a MapState,
        grid: GridType,
        rules: &'a EngineConfig,
        tables: &'a DomainTables,
        config: &'a AdvisorConfig,
    ) -> Self {
        Self {
            map,
            grid,
            rules,
            tables,
            config,
        }
    }

    /// Validation is skipped entirely while the advisor is switched off
    pub(crate) fn active(&self) -> bool {
        self.config.enabled
    }

    pub(crate) fn character_name(&self, id: CharacterId) -> String {
        self.map
            .character(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Evidence gathered during the current turn, used to justify VP awards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnHistory {
    pub checks: Vec<DiceEvent>,
    pub actions: Vec<(CharacterId, ActionKind)>,
}

impl TurnHistory {
    pub fn record_check(&mut self, check: &DiceEvent) {
        self.checks.push(check.clone());
    }

    pub fn record_action(&mut self, character: CharacterId, action: ActionKind) {
        self.actions.push((character, action));
    }

    pub fn checks_by(&self, character: CharacterId) -> impl Iterator<Item = &DiceEvent> {
        self.checks.iter().filter(move |c| c.character_id == character)
    }

    pub fn took_action(&self, character: CharacterId, action: &ActionKind) -> bool {
        self.actions.iter().any(|(c, a)| *c == character && a == action)
    }

    pub fn clear(&mut self) {
        self.checks.clear();
        self.actions.clear();
    }
}

pub(crate) fn finding(
    category: RuleCategory,
    severity: Severity,
    character: Option<CharacterId>,
    message: String,
) -> AdvisorEntry {
    let entry = create_advisor_entry(category, severity, message, None);
    match character {
        Some(id) => entry.with_character(id),
        None => entry,
    }
}
