//! Event-driven rules advisor
//!
//! Each state-mutation event routes to the validators for its category.
//! Entries go into a bounded log; display filtering happens on read.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisor::config::{should_show, AdvisorConfig};
use crate::advisor::entry::{AdvisorEntry, AdvisorLog};
use crate::advisor::validators::{
    check_loud_attack_transition, validate_action_slots, validate_alert_level, validate_combat_action,
    validate_movement, validate_state_change, validate_turn_end, validate_vp_award, AttackReport, RuleContext,
    TurnHistory,
};
use crate::ai::executor::{ActionOutcome, ActionResult, DiceEvent};
use crate::core::config::{config, EngineConfig};
use crate::data::actions::ActionKind;
use crate::data::tables::{tables, DomainTables};
use crate::game::character::CharacterToken;
use crate::game::map_state::MapState;
use crate::game::turn::TurnState;
use crate::game::vp::VpEvent;
use crate::spatial::{GridType, Position};

/// A committed state mutation the advisor should look at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdvisorEvent {
    /// A character's position was patched
    PositionPatched {
        before: CharacterToken,
        to: Position,
        #[serde(default)]
        via: Option<ActionKind>,
    },
    /// A character's activation was filled with actions
    ActionSlotsFilled {
        character: CharacterToken,
        actions: Vec<ActionKind>,
    },
    /// A character's state was patched
    StatePatched {
        before: CharacterToken,
        after: CharacterToken,
        #[serde(default)]
        trigger: Option<ActionKind>,
    },
    /// A check was rolled; attacks carry their combat context in the event
    DiceRolled { check: DiceEvent },
    /// VP were awarded
    VpPatched { award: VpEvent },
    /// The turn was passed
    TurnPassed {
        ended: TurnState,
        #[serde(default)]
        next: Option<TurnState>,
        /// Alert level displayed after the turn, if it was recomputed
        #[serde(default)]
        alert_shown: Option<u32>,
        #[serde(default)]
        alert_modifier: i32,
    },
}

/// Holds the advisor log and routes events to validators
pub struct RulesAdvisor {
    config: AdvisorConfig,
    log: AdvisorLog,
    history: TurnHistory,
    rules: EngineConfig,
    tables: DomainTables,
    grid: GridType,
}

impl RulesAdvisor {
    /// Advisor using the process-wide engine config and tables
    pub fn new(grid: GridType) -> Self {
        Self::with_rules(grid, config().clone(), tables().clone())
    }

    pub fn with_rules(grid: GridType, rules: EngineConfig, tables: DomainTables) -> Self {
        Self {
            config: AdvisorConfig::default(),
            log: AdvisorLog::with_capacity(rules.advisor_log_capacity),
            history: TurnHistory::default(),
            rules,
            tables,
            grid,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Replace the display config; the log is untouched
    pub fn set_config(&mut self, config: AdvisorConfig) {
        self.config = config;
    }

    pub fn log(&self) -> &AdvisorLog {
        &self.log
    }

    pub fn history(&self) -> &TurnHistory {
        &self.history
    }

    fn context<'a>(&'a self, map: &'a MapState) -> RuleContext<'a> {
        RuleContext::new(map, self.grid, &self.rules, &self.tables, &self.config)
    }

    /// Run the validators for one event without recording anything
    pub fn validate(&self, event: &AdvisorEvent, map: &MapState) -> Vec<AdvisorEntry> {
        let ctx = self.context(map);
        match event {
            AdvisorEvent::PositionPatched { before, to, via } => validate_movement(&ctx, before, *to, via.as_ref()),
            AdvisorEvent::ActionSlotsFilled { character, actions } => validate_action_slots(&ctx, character, actions),
            AdvisorEvent::StatePatched { before, after, trigger } => {
                validate_state_change(&ctx, before, after, trigger.as_ref())
            }
            AdvisorEvent::DiceRolled { check } => {
                let Some(report) = AttackReport::from_dice_event(check) else {
                    return Vec::new();
                };
                let mut entries = validate_combat_action(&ctx, &report);
                if let (Some(attacker), Some(weapon)) = (map.character(check.character_id), check.weapon.as_ref()) {
                    entries.extend(check_loud_attack_transition(&ctx, attacker, weapon));
                }
                entries
            }
            AdvisorEvent::VpPatched { award } => validate_vp_award(&ctx, award, &self.history, None),
            AdvisorEvent::TurnPassed {
                ended,
                next,
                alert_shown,
                alert_modifier,
            } => {
                let mut entries = validate_turn_end(&ctx, ended, next.as_ref(), *alert_shown);
                if let Some(shown) = alert_shown {
                    entries.extend(validate_alert_level(&ctx, *shown, *alert_modifier));
                }
                entries
            }
        }
    }

    /// Validate an event that has just been committed and append its entries
    ///
    /// Checks and actions are remembered as evidence for later VP awards until
    /// the turn is passed.
    pub fn on_event(&mut self, event: &AdvisorEvent, map: &MapState) -> Vec<AdvisorEntry> {
        match event {
            AdvisorEvent::DiceRolled { check } => {
                self.history.record_check(check);
                self.history.record_action(check.character_id, check.action.clone());
            }
            AdvisorEvent::ActionSlotsFilled { character, actions } => {
                for action in actions {
                    self.history.record_action(character.id, action.clone());
                }
            }
            _ => {}
        }

        let entries = self.validate(event, map);
        for entry in &entries {
            debug!(
                category = %entry.category,
                severity = %entry.severity,
                message = %entry.message,
                "Advisory"
            );
        }
        self.log.extend(entries.iter().cloned());

        if matches!(event, AdvisorEvent::TurnPassed { .. }) {
            self.history.clear();
        }
        entries
    }

    /// Feed the results of an executed AI activation through the advisor
    pub fn observe_results(&mut self, results: &[ActionResult], map: &MapState) -> Vec<AdvisorEntry> {
        let mut entries = Vec::new();
        for result in results {
            if matches!(result.outcome, ActionOutcome::Skipped { .. }) {
                continue;
            }
            match &result.check {
                Some(check) => entries.extend(self.on_event(&AdvisorEvent::DiceRolled { check: check.clone() }, map)),
                None => self.history.record_action(result.character_id, result.action.clone()),
            }
            if let Some(award) = &result.vp_awarded {
                entries.extend(self.on_event(&AdvisorEvent::VpPatched { award: award.clone() }, map));
            }
        }
        entries
    }

    /// Validate many independent events against the same board in parallel
    ///
    /// Nothing is recorded; results come back in event order.
    pub fn validate_batch(&self, events: &[AdvisorEvent], map: &MapState) -> Vec<AdvisorEntry> {
        events
            .par_iter()
            .map(|event| self.validate(event, map))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Entries the current config lets through, oldest first
    pub fn visible_entries(&self) -> Vec<&AdvisorEntry> {
        self.log.iter().filter(|e| should_show(e, &self.config)).collect()
    }
}
