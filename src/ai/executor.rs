//! Stepwise activation executor
//!
//! `ActivationRun` applies one planned action per `next()` call against the
//! shared map state and reports what happened. Pacing (animation, network
//! delays) belongs to the caller, which decides when to pull the next step.
//!
//! Movement legality is not re-checked here: positions come from the planner
//! (or a human handler) and are applied as given.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::dice::{roll_2d6, DiceRoll};
use crate::ai::planner::{AIActivation, ActionTarget, PlannedAction};
use crate::core::types::{CharacterId, ItemId, TurnNumber};
use crate::data::actions::{AbilityEffect, ActionKind, AttackMode};
use crate::data::equipment::WeaponProfile;
use crate::data::tables::{tables, DomainTables};
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::combat::{
    attack_situation_modifier, attack_target_number, charm_target_number, is_engaged_in_melee,
};
use crate::game::map_state::{MapItemKind, MapState};
use crate::game::vp::{apply_vp, award_vp, VpEvent, VpType};
use crate::spatial::{cell_distance, GridType, Position};

// === EFFECTS ===

/// Fields of a character that changed; unset fields are untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CharacterState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory_points: Option<u32>,
}

impl CharacterPatch {
    pub fn apply(&self, token: &mut CharacterToken) {
        if let Some(position) = self.position {
            token.position = position;
        }
        if let Some(state) = self.state {
            token.state = state;
        }
        if let Some(wounds) = self.wounds {
            token.stats.wounds = wounds;
        }
        if let Some(vp) = self.victory_points {
            token.victory_points = vp;
        }
    }
}

/// A resolved check, with enough context to audit it later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceEvent {
    pub character_id: CharacterId,
    pub action: ActionKind,
    pub target: Option<ActionTarget>,
    pub roll: DiceRoll,
    /// Everything added to the dice total: `skill + bonus + situational`
    pub modifier: i32,
    /// Stat the check was rolled with
    #[serde(default)]
    pub skill: i32,
    /// One-shot ability bonus spent on this check
    #[serde(default)]
    pub bonus: i32,
    /// Repeat-attack and into-melee penalties (zero or negative)
    #[serde(default)]
    pub situational: i32,
    /// Attacks the same character already made this activation
    #[serde(default)]
    pub previous_attacks: u32,
    pub target_number: i32,
    pub success: bool,
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    /// Damage dealt by a successful attack
    #[serde(default)]
    pub damage: Option<u32>,
    /// Where the roller stood at roll time
    #[serde(default)]
    pub actor_position: Option<Position>,
    /// Where the target stood at roll time
    #[serde(default)]
    pub target_position: Option<Position>,
    /// Whether the target was engaged in melee at roll time (attacks only)
    #[serde(default)]
    pub into_melee: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    AiAction,
    AiPlan,
}

/// One line for the game-info feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub kind: LogKind,
    pub character_name: String,
    pub action_name: Option<String>,
    pub result: String,
    pub target_name: Option<String>,
}

/// Narrow outbound interface of the executor
pub trait Emitters {
    fn character_patched(&mut self, character_id: CharacterId, patch: &CharacterPatch);
    fn dice_rolled(&mut self, event: &DiceEvent);
    fn map_state_changed(&mut self, map: &MapState);
    fn game_info_updated(&mut self, entry: &GameLogEntry);
}

/// Emitters that keep everything in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitters {
    pub patches: Vec<(CharacterId, CharacterPatch)>,
    pub dice: Vec<DiceEvent>,
    pub map_changes: usize,
    pub log: Vec<GameLogEntry>,
}

impl Emitters for RecordingEmitters {
    fn character_patched(&mut self, character_id: CharacterId, patch: &CharacterPatch) {
        self.patches.push((character_id, patch.clone()));
    }

    fn dice_rolled(&mut self, event: &DiceEvent) {
        self.dice.push(event.clone());
    }

    fn map_state_changed(&mut self, _map: &MapState) {
        self.map_changes += 1;
    }

    fn game_info_updated(&mut self, entry: &GameLogEntry) {
        self.log.push(entry.clone());
    }
}

// === RESULTS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved { from: Position, to: Position },
    StateChanged { from: CharacterState, to: CharacterState },
    CheckResolved { target_number: i32, success: bool },
    Extracted { item: ItemId },
    BonusReady { amount: i32 },
    Skipped { reason: String },
}

/// What one planned action did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub slot: u32,
    pub character_id: CharacterId,
    pub action: ActionKind,
    pub outcome: ActionOutcome,
    pub check: Option<DiceEvent>,
    pub vp_awarded: Option<VpEvent>,
    pub narration: String,
}

impl ActionResult {
    pub fn roll(&self) -> Option<DiceRoll> {
        self.check.as_ref().map(|c| c.roll)
    }

    pub fn succeeded(&self) -> bool {
        match &self.outcome {
            ActionOutcome::CheckResolved { success, .. } => *success,
            ActionOutcome::Skipped { .. } => false,
            _ => true,
        }
    }
}

// === EXECUTION ===

/// Pieces of a check modifier, kept apart so they can be audited
#[derive(Debug, Clone, Copy, Default)]
struct CheckParts {
    skill: i32,
    bonus: i32,
    situational: i32,
    previous_attacks: u32,
    target_position: Option<Position>,
    into_melee: Option<bool>,
}

impl CheckParts {
    fn new(skill: i32, bonus: i32) -> Self {
        Self {
            skill,
            bonus,
            ..Self::default()
        }
    }
}

/// Iterator over the steps of one activation
pub struct ActivationRun<'a> {
    activation: &'a AIActivation,
    map: &'a mut MapState,
    grid: GridType,
    turn: TurnNumber,
    tables: &'a DomainTables,
    emitters: &'a mut dyn Emitters,
    rng: &'a mut dyn RngCore,
    next: usize,
    check_bonus: i32,
    attacks_made: u32,
    finished: bool,
}

impl<'a> ActivationRun<'a> {
    /// Start a run. Logs the activation's rationale once, unless the acting
    /// character is not on the map, in which case the run yields nothing.
    pub fn new(
        activation: &'a AIActivation,
        map: &'a mut MapState,
        grid: GridType,
        turn: TurnNumber,
        tables: &'a DomainTables,
        emitters: &'a mut dyn Emitters,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        let finished = match map.character(activation.character_id) {
            Some(actor) => {
                emitters.game_info_updated(&GameLogEntry {
                    kind: LogKind::AiPlan,
                    character_name: actor.name.clone(),
                    action_name: None,
                    result: activation.rationale.clone(),
                    target_name: None,
                });
                false
            }
            None => {
                warn!(character = %activation.character_id, "Activation for unknown character");
                true
            }
        };

        Self {
            activation,
            map,
            grid,
            turn,
            tables,
            emitters,
            rng,
            next: 0,
            check_bonus: 0,
            attacks_made: 0,
            finished,
        }
    }

    fn step(&mut self, planned: &PlannedAction) -> ActionResult {
        let tables = self.tables;
        let Some(actor) = self.map.character(self.activation.character_id).cloned() else {
            return self.result(planned, skipped("actor left the board"), None, None);
        };

        if let Some(rules) = tables.state_rules(actor.state).filter(|r| r.exclusive) {
            if !rules.additional_actions.contains(&planned.action) {
                let reason = format!(
                    "cannot {} while {}",
                    planned.action.name(tables),
                    actor.state
                );
                return self.result(planned, skipped(reason), None, None);
            }
        }

        match &planned.action {
            ActionKind::Move => self.resolve_move(planned, &actor),
            ActionKind::Hack => self.resolve_hack(planned, &actor),
            ActionKind::Charm => self.resolve_charm(planned, &actor),
            ActionKind::Attack(mode) => self.resolve_attack(planned, &actor, *mode),
            ActionKind::Extract => self.resolve_extract(planned, &actor),
            ActionKind::Recover => self.resolve_recover(planned, &actor),
            ActionKind::Ability(id) => {
                let Some(def) = tables.ability(id).cloned() else {
                    return self.result(planned, skipped("unknown ability"), None, None);
                };
                if def.once_per_game {
                    if actor.has_used(id) {
                        return self.result(planned, skipped("already used this game"), None, None);
                    }
                    if let Some(token) = self.map.character_mut(actor.id) {
                        token.used_abilities.push(id.clone());
                    }
                }
                match def.effect {
                    AbilityEffect::EnterState { state } => self.change_state(planned, &actor, state),
                    AbilityEffect::ExtraMove { .. } => self.resolve_move(planned, &actor),
                    AbilityEffect::CheckBonus { amount } => {
                        self.check_bonus += amount;
                        self.result(planned, ActionOutcome::BonusReady { amount }, None, None)
                    }
                }
            }
        }
    }

    fn resolve_move(&mut self, planned: &PlannedAction, actor: &CharacterToken) -> ActionResult {
        let Some(to) = planned.target_position else {
            return self.result(planned, skipped("no destination"), None, None);
        };
        self.patch(actor.id, CharacterPatch {
            position: Some(to),
            ..CharacterPatch::default()
        });
        self.result(
            planned,
            ActionOutcome::Moved {
                from: actor.position,
                to,
            },
            None,
            None,
        )
    }

    fn change_state(&mut self, planned: &PlannedAction, actor: &CharacterToken, to: CharacterState) -> ActionResult {
        self.patch(actor.id, CharacterPatch {
            state: Some(to),
            ..CharacterPatch::default()
        });
        self.result(
            planned,
            ActionOutcome::StateChanged {
                from: actor.state,
                to,
            },
            None,
            None,
        )
    }

    fn resolve_hack(&mut self, planned: &PlannedAction, actor: &CharacterToken) -> ActionResult {
        let security = match planned.target {
            Some(ActionTarget::Item(id)) => match self.map.item(id).map(|i| &i.kind) {
                Some(MapItemKind::Computer { security }) => *security,
                _ => return self.result(planned, skipped("target is not a computer"), None, None),
            },
            _ => return self.result(planned, skipped("no computer targeted"), None, None),
        };

        let parts = CheckParts::new(actor.effective_hack(self.tables), self.take_bonus());
        let check = self.roll_check(actor, planned, parts, security, None);
        let vp = check
            .success
            .then(|| self.award(actor.id, VpType::Hack, "hacked a computer"));
        self.result(
            planned,
            ActionOutcome::CheckResolved {
                target_number: security,
                success: check.success,
            },
            Some(check),
            vp,
        )
    }

    fn resolve_charm(&mut self, planned: &PlannedAction, actor: &CharacterToken) -> ActionResult {
        let target_con = match planned.target {
            Some(ActionTarget::Character(id)) => self.map.character(id).map(|c| c.stats.con),
            Some(ActionTarget::Item(id)) => self
                .map
                .item(id)
                .and_then(|i| i.enemy_kind())
                .and_then(|k| self.tables.enemy(k))
                .map(|e| e.con),
            None => None,
        };
        let Some(target_con) = target_con else {
            return self.result(planned, skipped("no one to charm"), None, None);
        };

        let target_number = charm_target_number(target_con);
        let parts = CheckParts::new(actor.stats.con, self.take_bonus());
        let check = self.roll_check(actor, planned, parts, target_number, None);
        let vp = (check.success && actor.state == CharacterState::Disguised)
            .then(|| self.award(actor.id, VpType::SocialIntel, "gathered social intel"));
        self.result(
            planned,
            ActionOutcome::CheckResolved {
                target_number,
                success: check.success,
            },
            Some(check),
            vp,
        )
    }

    fn resolve_attack(&mut self, planned: &PlannedAction, actor: &CharacterToken, mode: AttackMode) -> ActionResult {
        let Some(weapon) = actor.weapon_for(mode, self.tables) else {
            return self.result(planned, skipped("no weapon for that attack"), None, None);
        };

        let (target_pos, defense, target_character) = match planned.target {
            Some(ActionTarget::Character(id)) => match self.map.character(id) {
                Some(c) => (c.position, c.stats.defense, Some(id)),
                None => return self.result(planned, skipped("target is gone"), None, None),
            },
            Some(ActionTarget::Item(id)) => {
                let stats = self
                    .map
                    .item(id)
                    .filter(|i| i.is_active_enemy())
                    .and_then(|i| i.enemy_kind().map(|k| (i.position, k)))
                    .and_then(|(pos, k)| self.tables.enemy(k).map(|s| (pos, s.defense)));
                match stats {
                    Some((pos, defense)) => (pos, defense, None),
                    None => return self.result(planned, skipped("target is gone"), None, None),
                }
            }
            None => return self.result(planned, skipped("no target"), None, None),
        };

        if weapon.loud && actor.state.is_concealed() {
            debug!(character = %actor.id, "Loud attack breaks concealment");
            self.patch(actor.id, CharacterPatch {
                state: Some(CharacterState::Overt),
                ..CharacterPatch::default()
            });
        }

        let into_melee = is_engaged_in_melee(self.map, target_pos, actor.id, target_character, self.grid);
        let parts = CheckParts {
            skill: actor.attack_skill(mode),
            bonus: self.take_bonus(),
            situational: attack_situation_modifier(mode, self.attacks_made, into_melee),
            previous_attacks: self.attacks_made,
            target_position: Some(target_pos),
            into_melee: Some(into_melee),
        };
        self.attacks_made += 1;

        let target_number = attack_target_number(defense);
        let damage = weapon.damage;
        let check = self.roll_check(actor, planned, parts, target_number, Some((weapon, damage)));

        let mut vp = None;
        if check.success {
            match planned.target {
                Some(ActionTarget::Character(id)) => vp = self.wound_character(actor.id, id, damage),
                Some(ActionTarget::Item(id)) => self.damage_enemy(id, damage),
                None => {}
            }
        }

        self.result(
            planned,
            ActionOutcome::CheckResolved {
                target_number,
                success: check.success,
            },
            Some(check),
            vp,
        )
    }

    /// Apply damage; a character dropping to zero wounds is knocked out
    fn wound_character(&mut self, attacker: CharacterId, target: CharacterId, damage: u32) -> Option<VpEvent> {
        let wounds = self.map.character(target)?.stats.wounds.saturating_sub(damage);
        let knocked_out = wounds == 0;
        self.patch(target, CharacterPatch {
            wounds: Some(wounds),
            state: knocked_out.then_some(CharacterState::Unconscious),
            ..CharacterPatch::default()
        });
        if knocked_out && self.map.record_knockdown(target) {
            return Some(self.award(attacker, VpType::FirstKnockdown, "first knockdown"));
        }
        None
    }

    /// NPCs have no wound track; a hit that meets their wounds drops them
    fn damage_enemy(&mut self, item: ItemId, damage: u32) {
        let tables = self.tables;
        let Some(enemy) = self.map.item_mut(item) else {
            return;
        };
        if let MapItemKind::Enemy { kind, knocked_out } = &mut enemy.kind {
            let wounds = tables.enemy(*kind).map(|s| s.wounds).unwrap_or(1);
            if damage >= wounds {
                *knocked_out = true;
                self.emitters.map_state_changed(self.map);
            }
        }
    }

    fn resolve_extract(&mut self, planned: &PlannedAction, actor: &CharacterToken) -> ActionResult {
        let Some(ActionTarget::Item(id)) = planned.target else {
            return self.result(planned, skipped("no info drop targeted"), None, None);
        };
        let Some(info_drop) = self.map.item(id).filter(|i| i.is_info_drop()) else {
            return self.result(planned, skipped("info drop is gone"), None, None);
        };
        if cell_distance(actor.position, info_drop.position, self.grid) > 1 {
            return self.result(planned, skipped("info drop is out of reach"), None, None);
        }

        self.map.remove_item(id);
        self.emitters.map_state_changed(self.map);
        let vp = self.award(actor.id, VpType::InfoDropExtraction, "extracted an info drop");
        self.result(planned, ActionOutcome::Extracted { item: id }, None, Some(vp))
    }

    /// Unconscious -> Stunned -> Overt
    fn resolve_recover(&mut self, planned: &PlannedAction, actor: &CharacterToken) -> ActionResult {
        let (to, wounds) = match actor.state {
            CharacterState::Unconscious => (CharacterState::Stunned, Some(actor.stats.wounds.max(1))),
            CharacterState::Stunned => (CharacterState::Overt, None),
            _ => return self.result(planned, skipped("nothing to recover from"), None, None),
        };
        self.patch(actor.id, CharacterPatch {
            state: Some(to),
            wounds,
            ..CharacterPatch::default()
        });
        self.result(
            planned,
            ActionOutcome::StateChanged {
                from: actor.state,
                to,
            },
            None,
            None,
        )
    }

    // === helpers ===

    fn take_bonus(&mut self) -> i32 {
        std::mem::take(&mut self.check_bonus)
    }

    fn roll_check(
        &mut self,
        actor: &CharacterToken,
        planned: &PlannedAction,
        parts: CheckParts,
        target_number: i32,
        weapon: Option<(WeaponProfile, u32)>,
    ) -> DiceEvent {
        let modifier = parts.skill + parts.bonus + parts.situational;
        let roll = roll_2d6(&mut *self.rng);
        let success = roll.meets(modifier, target_number);
        let event = DiceEvent {
            character_id: actor.id,
            action: planned.action.clone(),
            target: planned.target,
            roll,
            modifier,
            skill: parts.skill,
            bonus: parts.bonus,
            situational: parts.situational,
            previous_attacks: parts.previous_attacks,
            target_number,
            success,
            weapon: weapon.map(|(w, _)| w),
            damage: weapon.filter(|_| success).map(|(_, d)| d),
            actor_position: Some(actor.position),
            target_position: parts.target_position,
            into_melee: parts.into_melee,
        };
        self.emitters.dice_rolled(&event);
        event
    }

    fn patch(&mut self, id: CharacterId, patch: CharacterPatch) {
        if let Some(token) = self.map.character_mut(id) {
            patch.apply(token);
            self.emitters.character_patched(id, &patch);
        }
    }

    fn award(&mut self, id: CharacterId, vp_type: VpType, description: &str) -> VpEvent {
        let event = award_vp(id, vp_type, self.turn, description, None);
        if apply_vp(self.map, &event) {
            let total = self.map.character(id).map(|c| c.victory_points);
            self.emitters.character_patched(id, &CharacterPatch {
                victory_points: total,
                ..CharacterPatch::default()
            });
        }
        event
    }

    fn result(
        &mut self,
        planned: &PlannedAction,
        outcome: ActionOutcome,
        check: Option<DiceEvent>,
        vp_awarded: Option<VpEvent>,
    ) -> ActionResult {
        let action_name = planned.action.name(self.tables);
        let target_name = match planned.target {
            Some(ActionTarget::Character(id)) => self.map.display_name_at(Some(id), None),
            Some(ActionTarget::Item(id)) => self.map.display_name_at(None, Some(id)),
            None => None,
        };
        let narration = narrate(&outcome, check.as_ref(), vp_awarded.as_ref(), self.grid);

        let character_name = self
            .map
            .character(self.activation.character_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        self.emitters.game_info_updated(&GameLogEntry {
            kind: LogKind::AiAction,
            character_name,
            action_name: Some(action_name),
            result: narration.clone(),
            target_name,
        });

        ActionResult {
            slot: planned.slot,
            character_id: self.activation.character_id,
            action: planned.action.clone(),
            outcome,
            check,
            vp_awarded,
            narration,
        }
    }
}

impl Iterator for ActivationRun<'_> {
    type Item = ActionResult;

    fn next(&mut self) -> Option<ActionResult> {
        if self.finished {
            return None;
        }
        let activation = self.activation;
        let Some(planned) = activation.actions.get(self.next) else {
            self.finished = true;
            return None;
        };
        self.next += 1;

        let result = self.step(planned);
        debug!(
            character = %result.character_id,
            slot = result.slot,
            narration = %result.narration,
            "Executed action"
        );
        Some(result)
    }
}

fn skipped(reason: impl Into<String>) -> ActionOutcome {
    ActionOutcome::Skipped {
        reason: reason.into(),
    }
}

fn narrate(outcome: &ActionOutcome, check: Option<&DiceEvent>, vp: Option<&VpEvent>, grid: GridType) -> String {
    let mut text = match outcome {
        ActionOutcome::Moved { from, to } => format!(
            "moved {} {} to {}",
            cell_distance(*from, *to, grid),
            grid.cell_name(),
            to
        ),
        ActionOutcome::StateChanged { from, to } => format!("went from {from} to {to}"),
        ActionOutcome::CheckResolved { target_number, success } => {
            let rolled = check.map(|c| c.roll.total as i32 + c.modifier).unwrap_or(0);
            format!(
                "rolled {} vs {}: {}",
                rolled,
                target_number,
                if *success { "success" } else { "failure" }
            )
        }
        ActionOutcome::Extracted { .. } => "extracted the info drop".to_string(),
        ActionOutcome::BonusReady { amount } => format!("+{amount} to the next check"),
        ActionOutcome::Skipped { reason } => format!("skipped: {reason}"),
    };
    if let Some(damage) = check.and_then(|c| c.damage) {
        text.push_str(&format!(", {damage} damage"));
    }
    if let Some(vp) = vp {
        text.push_str(&format!(" (+{} VP)", vp.points));
    }
    text
}

/// Run an activation to completion against the process-wide tables
///
/// `on_step` sees each result as soon as it is produced. An activation for a
/// character that is not on the map is the only case that yields an empty
/// list. A planned action whose target id is unknown still produces one
/// `ActionOutcome::Skipped` result in its slot.
pub fn execute_activation(
    activation: &AIActivation,
    map: &mut MapState,
    grid: GridType,
    turn: TurnNumber,
    emitters: &mut dyn Emitters,
    rng: &mut dyn RngCore,
    on_step: Option<&mut dyn FnMut(&ActionResult)>,
) -> Vec<ActionResult> {
    execute_activation_with(activation, map, grid, turn, tables(), emitters, rng, on_step)
}

/// Run an activation to completion against explicit tables
///
/// Same contract as [`execute_activation`]: unknown targets are skipped per
/// action, an unknown actor yields nothing.
#[allow(clippy::too_many_arguments)]
pub fn execute_activation_with(
    activation: &AIActivation,
    map: &mut MapState,
    grid: GridType,
    turn: TurnNumber,
    tables: &DomainTables,
    emitters: &mut dyn Emitters,
    rng: &mut dyn RngCore,
    mut on_step: Option<&mut dyn FnMut(&ActionResult)>,
) -> Vec<ActionResult> {
    let run = ActivationRun::new(activation, map, grid, turn, tables, emitters, rng);
    let mut results = Vec::new();
    for result in run {
        if let Some(callback) = on_step.as_deref_mut() {
            callback(&result);
        }
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::actions::AbilityId;
    use crate::data::enemies::EnemyKind;
    use crate::data::roles::Role;
    use crate::game::map_state::MapItem;
    use crate::spatial::WallMap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (MapState, DomainTables) {
        let tables = DomainTables::builtin();
        let mut map = MapState::new(WallMap::new(20, 20));
        map.characters.push(CharacterToken::from_role(
            CharacterId(1),
            "Ghost",
            1,
            Role::Brain,
            Position::new(3, 3),
            &tables,
        ));
        map.items.push(MapItem::new(
            ItemId(5),
            "Terminal",
            Position::new(4, 3),
            MapItemKind::Computer { security: 8 },
        ));
        (map, tables)
    }

    fn run(
        activation: &AIActivation,
        map: &mut MapState,
        tables: &DomainTables,
        emitters: &mut RecordingEmitters,
    ) -> Vec<ActionResult> {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        execute_activation_with(activation, map, GridType::Square, 1, tables, emitters, &mut rng, None)
    }

    #[test]
    fn test_unknown_character_yields_nothing() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(99), "ghost plan");
        activation.push(ActionKind::Move, Some(Position::new(1, 1)), None, &tables);
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);
        assert!(results.is_empty());
        assert!(emitters.log.is_empty());
        assert!(emitters.patches.is_empty());
    }

    #[test]
    fn test_unknown_target_is_skipped_in_place() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "swing at nobody");
        activation.push(
            ActionKind::Attack(AttackMode::Ranged),
            Some(Position::new(5, 5)),
            Some(ActionTarget::Character(CharacterId(99))),
            &tables,
        );
        activation.push(ActionKind::Move, Some(Position::new(4, 4)), None, &tables);
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].outcome,
            ActionOutcome::Skipped {
                reason: "target is gone".into()
            }
        );
        assert!(results[0].check.is_none());
        assert_eq!(map.character(CharacterId(1)).map(|c| c.position), Some(Position::new(4, 4)));
    }

    #[test]
    fn test_go_loud_single_patch() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "drop the act");
        activation.push(ActionKind::Ability(AbilityId::new("go_loud")), None, None, &tables);
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].outcome,
            ActionOutcome::StateChanged {
                from: CharacterState::Hidden,
                to: CharacterState::Overt
            }
        );
        assert_eq!(emitters.patches.len(), 1, "exactly one character patch");
        assert_eq!(emitters.patches[0].1.state, Some(CharacterState::Overt));
        assert_eq!(map.character(CharacterId(1)).map(|c| c.state), Some(CharacterState::Overt));
    }

    #[test]
    fn test_hack_rolls_once() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "crack the terminal");
        activation.push(
            ActionKind::Hack,
            Some(Position::new(4, 3)),
            Some(ActionTarget::Item(ItemId(5))),
            &tables,
        );
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);

        assert_eq!(emitters.dice.len(), 1, "exactly one dice emission");
        let roll = results[0].roll().expect("hack carries its roll");
        assert_eq!(roll, emitters.dice[0].roll);
        assert!((2..=12).contains(&roll.total));
        let vp = map.character(CharacterId(1)).map(|c| c.victory_points).unwrap_or(0);
        assert_eq!(vp, if results[0].succeeded() { 1 } else { 0 });
    }

    #[test]
    fn test_move_patches_position_and_logs() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "reposition");
        activation.push(ActionKind::Move, Some(Position::new(6, 6)), None, &tables);
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);

        assert_eq!(map.character(CharacterId(1)).map(|c| c.position), Some(Position::new(6, 6)));
        assert!(results[0].narration.contains("3 squares"));
        assert_eq!(emitters.log.len(), 2, "one plan entry plus one action entry");
        assert_eq!(emitters.log[0].kind, LogKind::AiPlan);
        assert_eq!(emitters.log[1].kind, LogKind::AiAction);
    }

    #[test]
    fn test_stunned_character_cannot_move() {
        let (mut map, tables) = setup();
        if let Some(c) = map.character_mut(CharacterId(1)) {
            c.state = CharacterState::Stunned;
        }
        let mut activation = AIActivation::new(CharacterId(1), "try anyway");
        activation.push(ActionKind::Move, Some(Position::new(6, 6)), None, &tables);
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);
        assert!(matches!(results[0].outcome, ActionOutcome::Skipped { .. }));
        assert_eq!(map.character(CharacterId(1)).map(|c| c.position), Some(Position::new(3, 3)));
    }

    #[test]
    fn test_recover_walks_back_up() {
        let (mut map, tables) = setup();
        if let Some(c) = map.character_mut(CharacterId(1)) {
            c.state = CharacterState::Unconscious;
            c.stats.wounds = 0;
        }
        let mut activation = AIActivation::new(CharacterId(1), "get up");
        activation.push(ActionKind::Recover, None, None, &tables);
        let mut emitters = RecordingEmitters::default();
        run(&activation, &mut map, &tables, &mut emitters);

        let token = map.character(CharacterId(1)).expect("still on the board");
        assert_eq!(token.state, CharacterState::Stunned);
        assert_eq!(token.stats.wounds, 1);
    }

    #[test]
    fn test_extract_removes_drop_and_scores() {
        let (mut map, tables) = setup();
        map.items.push(MapItem::new(ItemId(6), "Drop", Position::new(3, 4), MapItemKind::InfoDrop));
        let mut activation = AIActivation::new(CharacterId(1), "grab it");
        activation.push(
            ActionKind::Extract,
            Some(Position::new(3, 4)),
            Some(ActionTarget::Item(ItemId(6))),
            &tables,
        );
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);

        assert!(map.item(ItemId(6)).is_none());
        assert_eq!(results[0].vp_awarded.as_ref().map(|v| v.points), Some(3));
        assert_eq!(map.character(CharacterId(1)).map(|c| c.victory_points), Some(3));
        assert_eq!(emitters.map_changes, 1);
    }

    #[test]
    fn test_loud_attack_reveals_attacker() {
        let (mut map, tables) = setup();
        map.characters.push(
            CharacterToken::from_role(CharacterId(1), "Spook", 1, Role::Spook, Position::new(0, 0), &tables)
                .with_state(CharacterState::Hidden),
        );
        map.characters.retain(|c| c.name != "Ghost");
        map.items.push(MapItem::new(
            ItemId(7),
            "Guard",
            Position::new(0, 5),
            MapItemKind::Enemy {
                kind: EnemyKind::Guard,
                knocked_out: false,
            },
        ));
        let mut activation = AIActivation::new(CharacterId(1), "take the shot");
        activation.push(
            ActionKind::Attack(AttackMode::Ranged),
            Some(Position::new(0, 5)),
            Some(ActionTarget::Item(ItemId(7))),
            &tables,
        );
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);

        assert_eq!(map.character(CharacterId(1)).map(|c| c.state), Some(CharacterState::Overt));
        let check = results[0].check.as_ref().expect("attack rolled");
        assert_eq!(check.actor_position, Some(Position::new(0, 0)));
        assert_eq!(check.target_position, Some(Position::new(0, 5)));
        assert_eq!(check.into_melee, Some(false));
        let knocked = map.item(ItemId(7)).map(|i| !i.is_active_enemy()).unwrap_or(false);
        assert_eq!(knocked, check.success, "rifle damage drops a guard on a hit");
    }

    #[test]
    fn test_first_knockdown_awarded_once() {
        let (mut map, tables) = setup();
        map.characters.push(
            CharacterToken::from_role(CharacterId(2), "Mark", 2, Role::Face, Position::new(3, 4), &tables)
                .with_state(CharacterState::Overt),
        );
        if let Some(mark) = map.character_mut(CharacterId(2)) {
            mark.stats.wounds = 1;
            mark.stats.defense = -20;
        }
        let mut activation = AIActivation::new(CharacterId(1), "knock them out");
        activation.push(
            ActionKind::Attack(AttackMode::Melee),
            Some(Position::new(3, 4)),
            Some(ActionTarget::Character(CharacterId(2))),
            &tables,
        );
        let mut emitters = RecordingEmitters::default();

        let results = run(&activation, &mut map, &tables, &mut emitters);
        assert_eq!(map.character(CharacterId(2)).map(|c| c.state), Some(CharacterState::Unconscious));
        assert_eq!(
            results[0].vp_awarded.as_ref().map(|v| v.vp_type),
            Some(VpType::FirstKnockdown)
        );

        // Back up and down again: no second award
        if let Some(mark) = map.character_mut(CharacterId(2)) {
            mark.state = CharacterState::Overt;
            mark.stats.wounds = 1;
        }
        let results = run(&activation, &mut map, &tables, &mut emitters);
        assert!(results[0].vp_awarded.is_none());
    }

    #[test]
    fn test_step_callback_sees_every_result() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "two steps");
        activation.push(ActionKind::Move, Some(Position::new(4, 4)), None, &tables);
        activation.push(ActionKind::Move, Some(Position::new(5, 5)), None, &tables);
        let mut emitters = RecordingEmitters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = Vec::new();
        let mut on_step = |r: &ActionResult| seen.push(r.slot);

        let results = execute_activation_with(
            &activation,
            &mut map,
            GridType::Square,
            1,
            &tables,
            &mut emitters,
            &mut rng,
            Some(&mut on_step),
        );
        assert_eq!(results.len(), 2);
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn test_run_is_lazy() {
        let (mut map, tables) = setup();
        let mut activation = AIActivation::new(CharacterId(1), "one at a time");
        activation.push(ActionKind::Move, Some(Position::new(4, 4)), None, &tables);
        activation.push(ActionKind::Move, Some(Position::new(5, 5)), None, &tables);
        let mut emitters = RecordingEmitters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut steps = ActivationRun::new(&activation, &mut map, GridType::Square, 1, &tables, &mut emitters, &mut rng);
        let first = steps.next().expect("first step");
        assert_eq!(first.outcome, ActionOutcome::Moved { from: Position::new(3, 3), to: Position::new(4, 4) });
        drop(steps);

        assert_eq!(map.character(CharacterId(1)).map(|c| c.position), Some(Position::new(4, 4)));
    }
}
