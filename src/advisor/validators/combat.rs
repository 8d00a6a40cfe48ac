//! Attack validation

use serde::{Deserialize, Serialize};

use crate::advisor::entry::{AdvisorEntry, RuleCategory, Severity};
use crate::advisor::validators::{finding, RuleContext};
use crate::ai::executor::DiceEvent;
use crate::ai::planner::ActionTarget;
use crate::core::types::CharacterId;
use crate::data::actions::{ActionKind, AttackMode};
use crate::data::equipment::WeaponProfile;
use crate::game::combat::{is_engaged_in_melee, INTO_MELEE_PENALTY, REPEAT_ATTACK_PENALTY};
use crate::spatial::{cell_distance, Position};

/// What was claimed about one attack roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: CharacterId,
    pub target: ActionTarget,
    pub mode: AttackMode,
    /// Weapon used; falls back to the attacker's best weapon for `mode`
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    /// Stat added to the roll
    pub skill: i32,
    /// Penalties applied (zero or negative)
    pub situational: i32,
    /// Attacks the attacker already made this activation
    pub previous_attacks: u32,
    pub hit: bool,
    #[serde(default)]
    pub damage: Option<u32>,
    /// Attacker position at roll time; the current board is used when absent
    #[serde(default)]
    pub attacker_position: Option<Position>,
    /// Target position at roll time; the current board is used when absent
    #[serde(default)]
    pub target_position: Option<Position>,
    /// Melee engagement of the target at roll time
    #[serde(default)]
    pub into_melee: Option<bool>,
}

impl AttackReport {
    /// The attack claims carried by a dice event, if it was an attack
    pub fn from_dice_event(event: &DiceEvent) -> Option<Self> {
        let ActionKind::Attack(mode) = event.action else {
            return None;
        };
        Some(Self {
            attacker: event.character_id,
            target: event.target?,
            mode,
            weapon: event.weapon,
            skill: event.skill,
            situational: event.situational,
            previous_attacks: event.previous_attacks,
            hit: event.success,
            damage: event.damage,
            attacker_position: event.actor_position,
            target_position: event.target_position,
            into_melee: event.into_melee,
        })
    }
}

/// Check range, line of sight, skill, penalties and damage of an attack
///
/// # Arguments
/// * `report` - The attack as resolved. Geometry recorded at roll time wins over
///   the current board, which may have moved on since.
///
/// # Returns
/// One entry per problem found; empty when either party is no longer on the board
pub fn validate_combat_action(ctx: &RuleContext, report: &AttackReport) -> Vec<AdvisorEntry> {
    if !ctx.active() {
        return Vec::new();
    }
    let Some(attacker) = ctx.map.character(report.attacker) else {
        return Vec::new();
    };
    let (board_pos, target_character, target_name) = match report.target {
        ActionTarget::Character(id) => match ctx.map.character(id) {
            Some(c) => (c.position, Some(id), c.name.clone()),
            None => return Vec::new(),
        },
        ActionTarget::Item(id) => match ctx.map.item(id) {
            Some(i) => (i.position, None, i.name.clone()),
            None => return Vec::new(),
        },
    };
    let attacker_pos = report.attacker_position.unwrap_or(attacker.position);
    let target_pos = report.target_position.unwrap_or(board_pos);
    let Some(weapon) = report.weapon.or_else(|| attacker.weapon_for(report.mode, ctx.tables)) else {
        return vec![finding(
            RuleCategory::Combat,
            Severity::Warning,
            Some(attacker.id),
            format!("{} made a ranged attack without a ranged weapon", attacker.name),
        )];
    };

    let mut messages = Vec::new();

    if weapon.mode != report.mode {
        messages.push(format!(
            "{} made a {} attack with a {} weapon",
            attacker.name,
            mode_name(report.mode),
            mode_name(weapon.mode)
        ));
    }

    let distance = cell_distance(attacker_pos, target_pos, ctx.grid);
    if distance > weapon.range {
        messages.push(format!(
            "Target is {} {} away but weapon range is {}",
            distance,
            ctx.grid.cell_name(),
            weapon.range
        ));
    }

    if report.mode == AttackMode::Ranged
        && !ctx.map.walls.has_line_of_sight(attacker_pos, target_pos, ctx.grid)
    {
        messages.push(format!("{} has no line of sight to {}", attacker.name, target_name));
    }

    let expected_skill = attacker.attack_skill(report.mode);
    if report.skill != expected_skill {
        let other = match report.mode {
            AttackMode::Melee => AttackMode::Ranged,
            AttackMode::Ranged => AttackMode::Melee,
        };
        if report.skill == attacker.attack_skill(other) {
            messages.push(format!(
                "{} rolled with {} skill {} instead of {} skill {}",
                attacker.name,
                skill_name(other),
                report.skill,
                skill_name(report.mode),
                expected_skill
            ));
        } else {
            messages.push(format!(
                "{} rolled with skill {} but {} skill is {}",
                attacker.name,
                report.skill,
                skill_name(report.mode),
                expected_skill
            ));
        }
    }

    let repeat = report.previous_attacks as i32 * REPEAT_ATTACK_PENALTY;
    if repeat > 0 && report.situational > -repeat {
        messages.push(format!(
            "repeat-attack penalty not applied: {} earlier attacks this activation call for -{}",
            report.previous_attacks, repeat
        ));
    }

    let into_melee = report.mode == AttackMode::Ranged
        && report
            .into_melee
            .unwrap_or_else(|| is_engaged_in_melee(ctx.map, target_pos, attacker.id, target_character, ctx.grid));
    if into_melee && report.situational > -(repeat + INTO_MELEE_PENALTY) {
        messages.push(format!(
            "shooting-into-melee penalty not applied: {} is engaged in melee",
            target_name
        ));
    }

    match (report.hit, report.damage) {
        (true, Some(damage)) if damage != weapon.damage => messages.push(format!(
            "reported {} damage but the weapon deals {}",
            damage, weapon.damage
        )),
        (false, Some(damage)) if damage > 0 => {
            messages.push(format!("reported {} damage on a missed attack", damage))
        }
        _ => {}
    }

    let action = ActionKind::Attack(report.mode).name(ctx.tables);
    messages
        .into_iter()
        .map(|m| finding(RuleCategory::Combat, Severity::Warning, Some(attacker.id), m).with_action(action.clone()))
        .collect()
}

fn mode_name(mode: AttackMode) -> &'static str {
    match mode {
        AttackMode::Melee => "melee",
        AttackMode::Ranged => "ranged",
    }
}

fn skill_name(mode: AttackMode) -> &'static str {
    match mode {
        AttackMode::Melee => "Melee",
        AttackMode::Ranged => "Ballistic",
    }
}
