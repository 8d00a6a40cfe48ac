//! State transition validation

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::data::actions::{AbilityEffect, ActionKind};
use crate::data::equipment::WeaponProfile;
use crate::game::character::{CharacterState, CharacterToken};

/// Check that a state patch is explained by what triggered it
///
/// # Arguments
/// * `before` - The character before the patch
/// * `after` - The character after the patch
/// * `trigger` - The action the character took, if the change came from its own action
pub fn validate_state_change(
    ctx: &RuleContext,
    before: &CharacterToken,
    after: &CharacterToken,
    trigger: Option<&ActionKind>,
) -> Vec<AdvisorEntry> {
    if !ctx.active() || before.state == after.state {
        return Vec::new();
    }

    let (from, to) = (before.state, after.state);
    let name = &before.name;
    let problem = match trigger {
        Some(ActionKind::Ability(id)) => match ctx.tables.ability(id) {
            Some(def) => match def.effect {
                AbilityEffect::EnterState { state } if state != to => Some((
                    Severity::Warning,
                    format!("{} used {} but became {} instead of {}", name, def.name, to, state),
                )),
                AbilityEffect::EnterState { .. } => None,
                _ => Some((
                    Severity::Warning,
                    format!("{} does not change state, but {} went from {} to {}", def.name, name, from, to),
                )),
            },
            None => None,
        },
        Some(ActionKind::Recover) => match recovery_target(from) {
            Some(expected) if expected == to => None,
            Some(expected) => Some((
                Severity::Warning,
                format!("{} recovered from {} to {}, but recovery leads to {}", name, from, to, expected),
            )),
            None => Some((
                Severity::Warning,
                format!("{} had nothing to recover from but went from {} to {}", name, from, to),
            )),
        },
        Some(ActionKind::Attack(_)) if from.is_concealed() && to == CharacterState::Overt => None,
        Some(action) => Some((
            Severity::Warning,
            format!(
                "{} does not change state, but {} went from {} to {}",
                action.name(ctx.tables),
                name,
                from,
                to
            ),
        )),
        None => unprompted_change(before, after),
    };

    problem
        .map(|(severity, message)| {
            let entry = finding(RuleCategory::StateChange, severity, Some(before.id), message);
            vec![match trigger {
                Some(action) => entry.with_action(action.name(ctx.tables)),
                None => entry,
            }]
        })
        .unwrap_or_default()
}

fn recovery_target(from: CharacterState) -> Option<CharacterState> {
    match from {
        CharacterState::Unconscious => Some(CharacterState::Stunned),
        CharacterState::Stunned => Some(CharacterState::Overt),
        _ => None,
    }
}

/// Changes made by the rules rather than the character's own action
fn unprompted_change(before: &CharacterToken, after: &CharacterToken) -> Option<(Severity, String)> {
    let (from, to) = (before.state, after.state);
    let name = &before.name;

    if to == CharacterState::Unconscious && after.stats.wounds > 0 {
        return Some((
            Severity::Warning,
            format!("{} became Unconscious with {} wounds left", name, after.stats.wounds),
        ));
    }
    if from == CharacterState::Unconscious && to != CharacterState::Stunned {
        return Some((
            Severity::Warning,
            format!("{} went from Unconscious straight to {}", name, to),
        ));
    }
    if from.is_incapacitated() && to.is_concealed() {
        return Some((
            Severity::Warning,
            format!("{} went from {} straight to {}", name, from, to),
        ));
    }
    if to.is_concealed() {
        return Some((
            Severity::Info,
            format!("{} became {} without using an ability", name, to),
        ));
    }
    None
}

/// Flag an attacker left concealed after firing a loud weapon
pub fn check_loud_attack_transition(
    ctx: &RuleContext,
    attacker: &CharacterToken,
    weapon: &WeaponProfile,
) -> Vec<AdvisorEntry> {
    if !ctx.active() || !weapon.loud || !attacker.state.is_concealed() {
        return Vec::new();
    }
    vec![finding(
        RuleCategory::StateChange,
        Severity::Warning,
        Some(attacker.id),
        format!(
            "{} attacked with a loud weapon but state is still {}",
            attacker.name, attacker.state
        ),
    )]
}
