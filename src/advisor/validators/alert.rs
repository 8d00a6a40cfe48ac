//! Alert level validation

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::game::alert::compute_alert_level;

/// Compare the displayed alert level with the one the board implies
pub fn validate_alert_level(ctx: &RuleContext, displayed: u32, modifier: i32) -> Vec<AdvisorEntry> {
    if !ctx.active() {
        return Vec::new();
    }

    let expected = compute_alert_level(ctx.map, modifier, ctx.rules);
    if expected.level == displayed {
        return Vec::new();
    }

    let direction = if expected.level > displayed { "higher" } else { "lower" };
    let message = format!(
        "{} compromised units (modifier {:+}) -> alert level should be {}, {} than the {} shown",
        expected.compromised, modifier, expected.level, direction, displayed
    );
    let details = serde_json::json!({
        "compromised": expected.compromised,
        "modifier": modifier,
        "expected": expected.level,
        "displayed": displayed,
    });

    let mut entry = finding(RuleCategory::Alert, Severity::Warning, None, message);
    entry.details = Some(details);
    vec![entry]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::config::AdvisorConfig;
    use crate::core::config::EngineConfig;
    use crate::core::types::CharacterId;
    use crate::data::roles::Role;
    use crate::data::tables::DomainTables;
    use crate::game::character::{CharacterState, CharacterToken, Stats};
    use crate::game::map_state::MapState;
    use crate::spatial::{GridType, Position, WallMap};

    fn board(compromised: u32, concealed: u32) -> MapState {
        let mut map = MapState::new(WallMap::new(20, 20));
        for i in 0..compromised + concealed {
            let state = if i < compromised {
                CharacterState::Overt
            } else {
                CharacterState::Hidden
            };
            map.characters.push(
                CharacterToken::new(
                    CharacterId(i + 1),
                    format!("c{i}"),
                    1 + (i % 2) as u8,
                    Role::Muscle,
                    Position::new(i as i32, 0),
                    Stats::default(),
                )
                .with_state(state),
            );
        }
        map
    }

    fn check(map: &MapState, displayed: u32, modifier: i32) -> Vec<AdvisorEntry> {
        let rules = EngineConfig::default();
        let tables = DomainTables::builtin();
        let config = AdvisorConfig::default();
        let ctx = RuleContext::new(map, GridType::Hex, &rules, &tables, &config);
        validate_alert_level(&ctx, displayed, modifier)
    }

    #[test]
    fn test_six_compromised_shown_as_one() {
        let entries = check(&board(6, 2), 1, 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[0].category, RuleCategory::Alert);
        assert!(entries[0].message.starts_with("6 compromised units"));
        assert!(entries[0].message.contains("higher"));
    }

    #[test]
    fn test_matching_level_is_clean() {
        assert!(check(&board(6, 0), 3, 0).is_empty());
        assert!(check(&board(1, 3), 0, 0).is_empty());
    }

    #[test]
    fn test_modifier_counts() {
        // 3 compromised + 1 reaches the second threshold
        assert!(check(&board(3, 0), 2, 1).is_empty());
        let entries = check(&board(3, 0), 3, 1);
        assert!(entries[0].message.contains("lower"));
    }
}
