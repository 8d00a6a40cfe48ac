//! End-of-turn validation

use std::collections::BTreeMap;

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::core::types::PlayerNumber;
use crate::game::turn::TurnState;

/// Check the turn that just ended and the resets applied for the next one
///
/// # Arguments
/// * `ended` - Turn state as it stood when the turn was passed
/// * `next` - Turn state after the end-of-turn resets, if they have been applied
/// * `alert_shown` - Alert level displayed after the turn, None if it was not recomputed
pub fn validate_turn_end(
    ctx: &RuleContext,
    ended: &TurnState,
    next: Option<&TurnState>,
    alert_shown: Option<u32>,
) -> Vec<AdvisorEntry> {
    if !ctx.active() {
        return Vec::new();
    }

    let mut entries: Vec<AdvisorEntry> = ctx
        .map
        .characters
        .iter()
        .filter(|c| !ended.has_acted(c.id))
        .map(|c| {
            finding(
                RuleCategory::TurnEnd,
                Severity::Info,
                Some(c.id),
                format!("{} was not activated this turn", c.name),
            )
        })
        .collect();

    let mut problem = |severity: Severity, message: String| {
        entries.push(finding(RuleCategory::TurnEnd, severity, None, message));
    };

    if alert_shown.is_none() {
        problem(
            Severity::Info,
            format!("alert level was not recomputed after turn {}", ended.turn_number),
        );
    }

    if let Some(next) = next {
        if next.turn_number != ended.turn_number + 1 {
            problem(
                Severity::Warning,
                format!(
                    "turn counter went from {} to {}",
                    ended.turn_number, next.turn_number
                ),
            );
        }
        if !next.activated.is_empty() || !next.exhausted.is_empty() {
            problem(
                Severity::Warning,
                "end-of-turn reset missing: characters are still marked as having acted".to_string(),
            );
        }
        if next.npc_phase_complete {
            problem(
                Severity::Warning,
                "end-of-turn reset missing: NPC phase is still marked complete".to_string(),
            );
        }

        let mut expected: BTreeMap<PlayerNumber, u32> = BTreeMap::new();
        for c in &ctx.map.characters {
            *expected.entry(c.player).or_insert(0) += 1;
        }
        for (player, count) in expected {
            let restored = next.remaining(player);
            if restored != count {
                problem(
                    Severity::Warning,
                    format!(
                        "player {} starts turn {} with {} activations but fields {} characters",
                        player, next.turn_number, restored, count
                    ),
                );
            }
        }
    }

    entries
}
