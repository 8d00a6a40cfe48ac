//! Movement validation

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::data::actions::{AbilityEffect, ActionKind};
use crate::game::character::CharacterToken;
use crate::spatial::{cell_distance, path_length, Position};

/// Check a position patch against the mover's allowance and the walls
///
/// # Arguments
/// * `before` - The character as it was before the move
/// * `to` - Where it was placed
/// * `via` - The action that moved it; a reposition ability sets its own allowance
///
/// # Returns
/// At most one entry: the first problem found, checked from most to least severe
pub fn validate_movement(
    ctx: &RuleContext,
    before: &CharacterToken,
    to: Position,
    via: Option<&ActionKind>,
) -> Vec<AdvisorEntry> {
    if !ctx.active() || before.position == to {
        return Vec::new();
    }

    let walls = &ctx.map.walls;
    let cells = ctx.grid.cell_name();
    let allowance = movement_allowance(ctx, before, via);
    let entry = |severity: Severity, message: String| {
        vec![finding(RuleCategory::Movement, severity, Some(before.id), message)]
    };

    if !walls.in_bounds(to) {
        return entry(
            Severity::Error,
            format!("{} moved off the board to {}", before.name, to),
        );
    }
    if walls.is_wall(to) {
        return entry(
            Severity::Error,
            format!("{} ended inside a wall at {}", before.name, to),
        );
    }

    let distance = cell_distance(before.position, to, ctx.grid);
    if distance > allowance {
        return entry(
            Severity::Warning,
            format!(
                "{} moved {} {} but movement is {}",
                before.name, distance, cells, allowance
            ),
        );
    }

    match path_length(walls, before.position, to, ctx.grid) {
        None => entry(
            Severity::Warning,
            format!("{} reached {} but walls block every path there", before.name, to),
        ),
        Some(steps) if steps > allowance => entry(
            Severity::Warning,
            format!(
                "{} moved {} {} but the way around walls is {} and movement is {}",
                before.name, distance, cells, steps, allowance
            ),
        ),
        Some(_) => match ctx
            .map
            .characters
            .iter()
            .find(|c| c.id != before.id && c.position == to)
        {
            Some(other) => entry(
                Severity::Warning,
                format!("{} ended on the same cell as {}", before.name, other.name),
            ),
            None => Vec::new(),
        },
    }
}

fn movement_allowance(ctx: &RuleContext, mover: &CharacterToken, via: Option<&ActionKind>) -> u32 {
    if let Some(ActionKind::Ability(id)) = via {
        if let Some(AbilityEffect::ExtraMove { cells }) = ctx.tables.ability(id).map(|a| a.effect) {
            return cells;
        }
    }
    mover.effective_movement(ctx.tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::config::AdvisorConfig;
    use crate::core::config::EngineConfig;
    use crate::core::types::CharacterId;
    use crate::data::actions::AbilityId;
    use crate::data::roles::Role;
    use crate::data::tables::DomainTables;
    use crate::game::character::Stats;
    use crate::game::map_state::MapState;
    use crate::spatial::{GridType, WallMap};

    fn runner(movement: u32) -> CharacterToken {
        CharacterToken::new(
            CharacterId(1),
            "Runner",
            1,
            Role::Ninja,
            Position::new(0, 0),
            Stats {
                movement,
                ..Stats::default()
            },
        )
    }

    fn check(map: &MapState, who: &CharacterToken, to: Position, via: Option<&ActionKind>) -> Vec<AdvisorEntry> {
        let rules = EngineConfig::default();
        let tables = DomainTables::builtin();
        let config = AdvisorConfig::default();
        let ctx = RuleContext::new(map, GridType::Square, &rules, &tables, &config);
        validate_movement(&ctx, who, to, via)
    }

    #[test]
    fn test_move_within_allowance_is_clean() {
        let map = MapState::new(WallMap::new(20, 20));
        assert!(check(&map, &runner(5), Position::new(3, 0), None).is_empty());
    }

    #[test]
    fn test_overlong_move_names_both_numbers() {
        let map = MapState::new(WallMap::new(20, 20));
        let entries = check(&map, &runner(5), Position::new(7, 0), None);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.category, RuleCategory::Movement);
        assert!(entry.message.contains('7'), "{}", entry.message);
        assert!(entry.message.contains('5'), "{}", entry.message);
    }

    #[test]
    fn test_detour_around_walls_counts() {
        let mut walls = WallMap::new(20, 20);
        for y in 0..4 {
            walls.add_wall(Position::new(2, y));
        }
        let map = MapState::new(walls);
        let entries = check(&map, &runner(4), Position::new(4, 0), None);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("around walls"));
    }

    #[test]
    fn test_off_board_is_error() {
        let map = MapState::new(WallMap::new(5, 5));
        let entries = check(&map, &runner(5), Position::new(-1, 0), None);
        assert_eq!(entries[0].severity, Severity::Error);
    }

    #[test]
    fn test_reposition_ability_uses_its_own_allowance() {
        let map = MapState::new(WallMap::new(20, 20));
        let step = ActionKind::Ability(AbilityId::new("shadow_step"));
        assert!(check(&map, &runner(1), Position::new(3, 0), Some(&step)).is_empty());
        assert_eq!(check(&map, &runner(9), Position::new(5, 0), Some(&step)).len(), 1);
    }

    #[test]
    fn test_disabled_advisor_reports_nothing() {
        let map = MapState::new(WallMap::new(20, 20));
        let rules = EngineConfig::default();
        let tables = DomainTables::builtin();
        let config = AdvisorConfig::default().with_enabled(false);
        let ctx = RuleContext::new(&map, GridType::Square, &rules, &tables, &config);
        assert!(validate_movement(&ctx, &runner(1), Position::new(9, 0), None).is_empty());
    }
}
