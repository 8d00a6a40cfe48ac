//! Check target numbers and attack modifiers
//!
//! Shared by the executor that resolves checks and the advisor that audits
//! them, so both apply the same arithmetic.

use crate::core::types::CharacterId;
use crate::data::actions::AttackMode;
use crate::game::map_state::MapState;
use crate::spatial::{cell_distance, GridType, Position};

/// Base target number of an opposed check
pub const CHECK_BASE: i32 = 7;

/// Penalty per attack already made this activation
pub const REPEAT_ATTACK_PENALTY: i32 = 1;

/// Penalty for shooting at a target locked in melee with someone else
pub const INTO_MELEE_PENALTY: i32 = 1;

pub fn attack_target_number(defense: i32) -> i32 {
    CHECK_BASE + defense
}

pub fn charm_target_number(con: i32) -> i32 {
    CHECK_BASE + con
}

/// Whether anyone other than the attacker and the target stands next to `target_pos`
pub fn is_engaged_in_melee(
    map: &MapState,
    target_pos: Position,
    attacker: CharacterId,
    target: Option<CharacterId>,
    grid: GridType,
) -> bool {
    map.characters
        .iter()
        .filter(|c| c.id != attacker && Some(c.id) != target)
        .filter(|c| !c.state.is_incapacitated())
        .any(|c| cell_distance(c.position, target_pos, grid) <= 1)
}

/// Situational modifier on an attack roll (zero or negative)
pub fn attack_situation_modifier(mode: AttackMode, previous_attacks: u32, into_melee: bool) -> i32 {
    let repeat = previous_attacks as i32 * REPEAT_ATTACK_PENALTY;
    let melee = if mode == AttackMode::Ranged && into_melee {
        INTO_MELEE_PENALTY
    } else {
        0
    };
    -(repeat + melee)
}
