//! Rules advisor
//!
//! Post-hoc, non-blocking rule checks. Validators classify evidence that
//! something looks wrong; they never reject or rewrite an action.

pub mod config;
pub mod engine;
pub mod entry;
pub mod validators;

pub use config::{should_show, AdvisorConfig};
pub use engine::{AdvisorEvent, RulesAdvisor};
pub use entry::{create_advisor_entry, AdvisorEntry, AdvisorLog, RuleCategory, Severity};
pub use validators::{
    check_loud_attack_transition, validate_action_slots, validate_alert_level, validate_combat_action,
    validate_movement, validate_state_change, validate_turn_end, validate_vp_award, AttackReport, RuleContext,
    TurnHistory,
};
