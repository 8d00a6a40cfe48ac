//! Victory-point award validation

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext, TurnHistory};
use crate::core::types::TurnNumber;
use crate::data::actions::{ActionKind, AttackMode};
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::vp::{VpEvent, VpType};

/// Check that a VP award is backed by this turn's actions and the VP table
///
/// # Arguments
/// * `event` - The award that was applied
/// * `history` - Checks and actions recorded so far this turn
/// * `current_turn` - The turn being played, when known
pub fn validate_vp_award(
    ctx: &RuleContext,
    event: &VpEvent,
    history: &TurnHistory,
    current_turn: Option<TurnNumber>,
) -> Vec<AdvisorEntry> {
    if !ctx.active() {
        return Vec::new();
    }
    let Some(character) = ctx.map.character(event.character_id) else {
        return Vec::new();
    };

    let mut problems: Vec<(Severity, String)> = Vec::new();

    let table_value = event.vp_type.default_points();
    if event.points != table_value {
        problems.push((
            Severity::Warning,
            format!(
                "awarded {} VP for {} but the table value is {}",
                event.points,
                event.vp_type.name(),
                table_value
            ),
        ));
    }

    if let Some(turn) = current_turn.filter(|t| *t != event.turn) {
        problems.push((
            Severity::Info,
            format!("award is dated turn {} but it is turn {}", event.turn, turn),
        ));
    }

    let justification = match event.vp_type {
        VpType::Hack => unbacked_check(history, character, &[ActionKind::Hack], false),
        VpType::SocialIntel => {
            if character.state != CharacterState::Disguised {
                problems.push((
                    Severity::Warning,
                    format!(
                        "social intel requires Disguised but {} is {}",
                        character.name, character.state
                    ),
                ));
            }
            unbacked_check(history, character, &[ActionKind::Charm], false)
        }
        VpType::FirstKnockdown => unbacked_check(
            history,
            character,
            &[
                ActionKind::Attack(AttackMode::Melee),
                ActionKind::Attack(AttackMode::Ranged),
            ],
            true,
        ),
        VpType::InfoDropExtraction => (!history.took_action(character.id, &ActionKind::Extract)).then(|| {
            format!(
                "extraction VP awarded but {} did not extract this turn",
                character.name
            )
        }),
        VpType::Escape => {
            let inside = ctx
                .map
                .escape_zone_for(character.player)
                .map(|z| z.contains(character.position))
                .unwrap_or(false);
            (!inside).then(|| {
                format!(
                    "{} was awarded escape VP outside the escape zone",
                    character.name
                )
            })
        }
    };
    if let Some(message) = justification {
        problems.push((Severity::Warning, message));
    }

    problems
        .into_iter()
        .map(|(severity, message)| finding(RuleCategory::VictoryPoints, severity, Some(character.id), message))
        .collect()
}

/// Why a check-based award is not backed by this turn's rolls, if it is not
fn unbacked_check(
    history: &TurnHistory,
    character: &CharacterToken,
    actions: &[ActionKind],
    needs_damage: bool,
) -> Option<String> {
    let mut rolled = history.checks_by(character.id).peekable();
    if rolled.peek().is_none() {
        return Some("VP awarded but no check was rolled this turn".to_string());
    }
    let relevant: Vec<_> = rolled.filter(|c| actions.contains(&c.action)).collect();
    if relevant.is_empty() {
        return Some(format!(
            "VP awarded but {} made no qualifying check this turn",
            character.name
        ));
    }
    let backed = relevant
        .iter()
        .any(|c| c.success && (!needs_damage || c.damage.unwrap_or(0) > 0));
    (!backed).then(|| format!("VP awarded but every qualifying check by {} failed", character.name))
}
