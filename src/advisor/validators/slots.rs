//! Action-slot validation

use ahash::AHashSet;

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::data::actions::ActionKind;
use crate::game::character::CharacterToken;

/// Check the actions filled into one activation
///
/// Looks at the total slot cost, whether each action is on the character's
/// menu for its role, state and kit, exclusive-state restrictions and reuse
/// of once-per-game abilities.
pub fn validate_action_slots(
    ctx: &RuleContext,
    character: &CharacterToken,
    actions: &[ActionKind],
) -> Vec<AdvisorEntry> {
    if !ctx.active() {
        return Vec::new();
    }

    let tables = ctx.tables;
    let mut entries = Vec::new();
    let mut report = |severity: Severity, action: Option<&ActionKind>, message: String| {
        let entry = finding(RuleCategory::ActionSlots, severity, Some(character.id), message);
        entries.push(match action {
            Some(a) => entry.with_action(a.name(tables)),
            None => entry,
        });
    };

    let total: u32 = actions.iter().map(|a| tables.action_cost(a)).sum();
    if total > ctx.rules.action_slots {
        let count = actions.len() as u32;
        let cost = if total == count {
            String::new()
        } else {
            format!(" costing {total} slots")
        };
        report(
            Severity::Error,
            None,
            format!(
                "{} assigned {} actions{} but only has {} slots",
                character.name, count, cost, ctx.rules.action_slots
            ),
        );
    }

    let exclusive = tables
        .state_rules(character.state)
        .filter(|r| r.exclusive);
    let available = tables.available_actions(character);
    let mut spent = AHashSet::new();

    for action in actions {
        if let Some(rules) = exclusive {
            if !rules.additional_actions.contains(action) {
                let allowed: Vec<String> = rules.additional_actions.iter().map(|a| a.name(tables)).collect();
                report(
                    Severity::Error,
                    Some(action),
                    format!(
                        "{} is {} and may only {}, but chose {}",
                        character.name,
                        character.state,
                        allowed.join(" or "),
                        action.name(tables)
                    ),
                );
            }
            continue;
        }

        if let ActionKind::Ability(id) = action {
            let once = tables.ability(id).map(|a| a.once_per_game).unwrap_or(false);
            if once && character.has_used(id) {
                report(
                    Severity::Warning,
                    Some(action),
                    format!("{} already used {} this game", character.name, action.name(tables)),
                );
                continue;
            }
            if once && !spent.insert(id.clone()) {
                report(
                    Severity::Warning,
                    Some(action),
                    format!("{} used {} twice in one activation", character.name, action.name(tables)),
                );
                continue;
            }
        }

        if !available.contains(action) {
            report(
                Severity::Warning,
                Some(action),
                format!(
                    "{} cannot take {} as a {:?} while {}",
                    character.name,
                    action.name(tables),
                    character.role,
                    character.state
                ),
            );
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::config::AdvisorConfig;
    use crate::core::config::EngineConfig;
    use crate::core::types::CharacterId;
    use crate::data::actions::{AbilityId, AttackMode};
    use crate::data::roles::Role;
    use crate::data::tables::DomainTables;
    use crate::game::character::CharacterState;
    use crate::game::map_state::MapState;
    use crate::spatial::{GridType, Position, WallMap};

    fn check(character: &CharacterToken, actions: &[ActionKind]) -> Vec<AdvisorEntry> {
        let map = MapState::new(WallMap::new(10, 10));
        let rules = EngineConfig::default();
        let tables = DomainTables::builtin();
        let config = AdvisorConfig::default();
        let ctx = RuleContext::new(&map, GridType::Hex, &rules, &tables, &config);
        validate_action_slots(&ctx, character, actions)
    }

    fn crew(role: Role) -> CharacterToken {
        CharacterToken::from_role(
            CharacterId(1),
            "Vex",
            1,
            role,
            Position::new(1, 1),
            &DomainTables::builtin(),
        )
    }

    #[test]
    fn test_three_moves_fit() {
        let actions = vec![ActionKind::Move; 3];
        assert!(check(&crew(Role::Face), &actions).is_empty());
    }

    #[test]
    fn test_four_actions_is_error() {
        let actions = vec![ActionKind::Move; 4];
        let entries = check(&crew(Role::Face), &actions);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Error);
        assert!(entries[0].message.contains("assigned 4 actions but only has 3 slots"));
    }

    #[test]
    fn test_ability_cost_counts_toward_budget() {
        // disguise costs 2
        let actions = vec![
            ActionKind::Ability(AbilityId::new("disguise")),
            ActionKind::Move,
            ActionKind::Move,
        ];
        let entries = check(&crew(Role::Face), &actions);
        let over: Vec<_> = entries.iter().filter(|e| e.severity == Severity::Error).collect();
        assert_eq!(over.len(), 1);
        assert!(
            over[0].message.contains("assigned 3 actions costing 4 slots but only has 3 slots"),
            "{}",
            over[0].message
        );
    }

    #[test]
    fn test_stunned_may_only_recover() {
        let stunned = crew(Role::Muscle).with_state(CharacterState::Stunned);
        assert!(check(&stunned, &[ActionKind::Recover]).is_empty());

        let entries = check(&stunned, &[ActionKind::Move]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action.as_deref(), Some("Move"));
        assert!(entries[0].message.contains("may only Recover"));
    }

    #[test]
    fn test_once_per_game_reuse() {
        let mut ninja = crew(Role::Ninja);
        let vanish = ActionKind::Ability(AbilityId::new("vanish"));
        assert!(check(&ninja, &[vanish.clone()]).is_empty());
        assert_eq!(check(&ninja, &[vanish.clone(), vanish.clone()]).len(), 1);

        ninja.used_abilities.push(AbilityId::new("vanish"));
        let entries = check(&ninja, &[vanish]);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("already used"));
    }

    #[test]
    fn test_ability_of_another_role() {
        let entries = check(&crew(Role::Muscle), &[ActionKind::Ability(AbilityId::new("disguise"))]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Warning);
    }

    #[test]
    fn test_ranged_attack_without_gun() {
        let mut unarmed = crew(Role::Ninja);
        unarmed.equipment.clear();
        let entries = check(&unarmed, &[ActionKind::Attack(AttackMode::Ranged)]);
        assert_eq!(entries.len(), 1);
    }
}
