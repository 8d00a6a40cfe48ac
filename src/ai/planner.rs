//! Turns an objective and a posture into a concrete activation
//!
//! Every activation the planner produces fits in the configured action-slot
//! budget. Movement is planned here with walls and occupied cells taken into
//! account; the executor applies positions without re-checking them.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::ai::evaluator::Posture;
use crate::ai::objectives::{ObjectiveInfo, ObjectiveKind, ObjectiveTarget};
use crate::core::config::EngineConfig;
use crate::core::types::{CharacterId, ItemId};
use crate::data::actions::{AbilityId, ActionKind, AttackMode};
use crate::data::tables::DomainTables;
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::map_state::MapState;
use crate::spatial::{cell_distance, step_toward, GridType, Position};

/// Entity an action is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTarget {
    Character(CharacterId),
    Item(ItemId),
}

/// One action bound to a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    /// First slot the action occupies
    pub slot: u32,
    pub action: ActionKind,
    pub target_position: Option<Position>,
    pub target: Option<ActionTarget>,
}

/// A character's whole turn, consumed once by the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIActivation {
    pub character_id: CharacterId,
    pub actions: Vec<PlannedAction>,
    pub rationale: String,
}

impl AIActivation {
    pub fn new(character_id: CharacterId, rationale: impl Into<String>) -> Self {
        Self {
            character_id,
            actions: Vec::new(),
            rationale: rationale.into(),
        }
    }

    /// Append an action in the next free slot
    pub fn push(
        &mut self,
        action: ActionKind,
        target_position: Option<Position>,
        target: Option<ActionTarget>,
        tables: &DomainTables,
    ) {
        let slot = self.slots_used(tables);
        self.actions.push(PlannedAction {
            slot,
            action,
            target_position,
            target,
        });
    }

    /// Total slot cost of the planned actions
    pub fn slots_used(&self, tables: &DomainTables) -> u32 {
        self.actions.iter().map(|a| tables.action_cost(&a.action)).sum()
    }
}

/// Builds activations against a fixed board snapshot
pub struct ActivationPlanner<'a> {
    map: &'a MapState,
    grid: GridType,
    tables: &'a DomainTables,
    config: &'a EngineConfig,
    aggression: f32,
}

/// Aggression from which leftover slots are spent on attacks of opportunity
const OPPORTUNISM_THRESHOLD: f32 = 0.5;

/// Running state while one activation is built
struct Draft<'t> {
    activation: AIActivation,
    position: Position,
    budget: u32,
    tables: &'t DomainTables,
}

impl Draft<'_> {
    fn remaining(&self) -> u32 {
        self.budget
            .saturating_sub(self.activation.slots_used(self.tables))
    }

    fn fits(&self, action: &ActionKind) -> bool {
        self.tables.action_cost(action) <= self.remaining()
    }

    /// Push if affordable; returns whether it was pushed
    fn push(&mut self, action: ActionKind, target_position: Option<Position>, target: Option<ActionTarget>) -> bool {
        if !self.fits(&action) {
            return false;
        }
        self.activation
            .push(action, target_position, target, self.tables);
        true
    }
}

impl<'a> ActivationPlanner<'a> {
    pub fn new(
        map: &'a MapState,
        grid: GridType,
        tables: &'a DomainTables,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            map,
            grid,
            tables,
            config,
            aggression: 0.0,
        }
    }

    /// Willingness to spend leftover slots attacking nearby opponents
    pub fn with_aggression(mut self, aggression: f32) -> Self {
        self.aggression = aggression;
        self
    }

    /// Plan one character's activation
    ///
    /// `blocked` holds cells the character may not end a move on (other
    /// characters, items, or cells already claimed by earlier activations).
    pub fn plan(
        &self,
        character: &CharacterToken,
        objective: Option<&ObjectiveInfo>,
        posture: Posture,
        blocked: &AHashSet<Position>,
    ) -> AIActivation {
        let mut draft = Draft {
            activation: AIActivation::new(character.id, String::new()),
            position: character.position,
            budget: self.config.action_slots,
            tables: self.tables,
        };
        let available = self.tables.available_actions(character);

        if character.state.is_incapacitated() {
            if available.contains(&ActionKind::Recover) {
                draft.push(ActionKind::Recover, None, None);
            }
            draft.activation.rationale =
                format!("{} is {}, recovering", character.name, character.state);
            return draft.activation;
        }

        if posture == Posture::Defensive && character.state == CharacterState::Overt {
            let hide = ActionKind::Ability(AbilityId::new("hide"));
            if available.contains(&hide) {
                draft.push(hide, None, None);
            }
        }

        let mut rationale = if posture == Posture::Escape {
            self.plan_escape(character, &mut draft, blocked)
        } else {
            match objective {
                Some(obj) => match obj.kind {
                    ObjectiveKind::Computer => {
                        self.plan_interaction(character, &mut draft, obj, ActionKind::Hack, blocked)
                    }
                    ObjectiveKind::InfoDrop => {
                        self.plan_interaction(character, &mut draft, obj, ActionKind::Extract, blocked)
                    }
                    ObjectiveKind::EnemyCharacter => {
                        self.plan_confrontation(character, &mut draft, obj, &available, blocked)
                    }
                    ObjectiveKind::EscapeZone => self.plan_escape(character, &mut draft, blocked),
                },
                None => format!("{} has no objective and holds position", character.name),
            }
        };

        let hunting = objective.is_some_and(|o| o.kind == ObjectiveKind::EnemyCharacter);
        if !hunting
            && matches!(posture, Posture::Aggressive | Posture::Balanced)
            && self.aggression >= OPPORTUNISM_THRESHOLD
        {
            if let Some(extra) = self.opportunistic_attack(character, &mut draft, &available) {
                rationale = format!("{}, then {}", rationale, extra);
            }
        }

        draft.activation.rationale = format!("{} ({} posture)", rationale, posture.name());
        tracing::debug!(
            character = %character.id,
            actions = draft.activation.actions.len(),
            slots = draft.activation.slots_used(self.tables),
            "Planned activation"
        );
        draft.activation
    }

    /// Walk toward `target` until within `stop_within`, using Move actions while slots last
    fn approach(
        &self,
        character: &CharacterToken,
        draft: &mut Draft<'_>,
        target: Position,
        stop_within: u32,
        reserve: u32,
        blocked: &AHashSet<Position>,
    ) {
        let movement = character.effective_movement(self.tables);
        let move_cost = self.tables.action_cost(&ActionKind::Move);

        while cell_distance(draft.position, target, self.grid) > stop_within
            && draft.remaining() >= move_cost + reserve
        {
            let next = step_toward(
                &self.map.walls,
                draft.position,
                target,
                movement,
                stop_within,
                self.grid,
                blocked,
            );
            if next == draft.position {
                break;
            }
            draft.push(ActionKind::Move, Some(next), None);
            draft.position = next;
        }
    }

    /// Move adjacent to an item and use it
    fn plan_interaction(
        &self,
        character: &CharacterToken,
        draft: &mut Draft<'_>,
        objective: &ObjectiveInfo,
        action: ActionKind,
        blocked: &AHashSet<Position>,
    ) -> String {
        let ObjectiveTarget::Item(item_id) = objective.target else {
            return format!("{} has a malformed objective", character.name);
        };
        let item_name = self
            .map
            .item(item_id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| item_id.to_string());

        let reserve = self.tables.action_cost(&action);
        self.approach(character, draft, objective.position, 1, reserve, blocked);
        if cell_distance(draft.position, objective.position, self.grid) > 1 {
            // Not enough slots to arrive and act; spend the rest closing in
            self.approach(character, draft, objective.position, 1, 0, blocked);
            return format!("{} moves toward {}", character.name, item_name);
        }

        draft.push(action.clone(), Some(objective.position), Some(ActionTarget::Item(item_id)));
        format!(
            "{} goes for {} ({} VP) with {}",
            character.name,
            item_name,
            objective.vp_value,
            action.name(self.tables)
        )
    }

    /// Engage an opposing character: charm when disguised, otherwise attack
    fn plan_confrontation(
        &self,
        character: &CharacterToken,
        draft: &mut Draft<'_>,
        objective: &ObjectiveInfo,
        available: &[ActionKind],
        blocked: &AHashSet<Position>,
    ) -> String {
        let ObjectiveTarget::Character(target_id) = objective.target else {
            return format!("{} has a malformed objective", character.name);
        };
        let Some(target) = self.map.character(target_id) else {
            return format!("{} lost track of its target", character.name);
        };
        let target_pos = target.position;

        if character.state == CharacterState::Disguised && available.contains(&ActionKind::Charm) {
            let reserve = self.tables.action_cost(&ActionKind::Charm);
            self.approach(character, draft, target_pos, 1, reserve, blocked);
            if cell_distance(draft.position, target_pos, self.grid) <= 1 {
                draft.push(ActionKind::Charm, Some(target_pos), Some(ActionTarget::Character(target_id)));
                return format!("{} works {} for intel", character.name, target.name);
            }
            return format!("{} closes on {} in disguise", character.name, target.name);
        }

        let ranged = available
            .contains(&ActionKind::Attack(AttackMode::Ranged))
            .then(|| character.weapon_for(AttackMode::Ranged, self.tables))
            .flatten();
        let move_cost = self.tables.action_cost(&ActionKind::Move);

        loop {
            let distance = cell_distance(draft.position, target_pos, self.grid);
            let has_sight = self
                .map
                .walls
                .has_line_of_sight(draft.position, target_pos, self.grid);

            let mode = match ranged {
                Some(w) if distance > 1 && distance <= w.range && has_sight => Some(AttackMode::Ranged),
                _ if distance <= 1 => Some(AttackMode::Melee),
                _ => None,
            };

            if let Some(mode) = mode {
                if draft.push(
                    ActionKind::Attack(mode),
                    Some(target_pos),
                    Some(ActionTarget::Character(target_id)),
                ) {
                    return format!("{} attacks {}", character.name, target.name);
                }
                break;
            }

            if draft.remaining() < move_cost {
                break;
            }
            let stop = ranged.map(|w| w.range).unwrap_or(1);
            let movement = character.effective_movement(self.tables);
            let mut next = step_toward(&self.map.walls, draft.position, target_pos, movement, stop, self.grid, blocked);
            if next == draft.position || !self.map.walls.has_line_of_sight(next, target_pos, self.grid) {
                next = step_toward(&self.map.walls, draft.position, target_pos, movement, 1, self.grid, blocked);
            }
            if next == draft.position {
                break;
            }
            draft.push(ActionKind::Move, Some(next), None);
            draft.position = next;
        }

        format!("{} hunts {}", character.name, target.name)
    }

    /// Attack an opponent already within reach of the draft's end position
    fn opportunistic_attack(
        &self,
        character: &CharacterToken,
        draft: &mut Draft<'_>,
        available: &[ActionKind],
    ) -> Option<String> {
        let ranged = available
            .contains(&ActionKind::Attack(AttackMode::Ranged))
            .then(|| character.weapon_for(AttackMode::Ranged, self.tables))
            .flatten();

        let (target, mode) = self
            .map
            .opponents(character.player)
            .filter(|o| o.is_active())
            .filter_map(|o| {
                let distance = cell_distance(draft.position, o.position, self.grid);
                let mode = if distance <= 1 {
                    AttackMode::Melee
                } else {
                    let weapon = ranged?;
                    let in_sight = self.map.walls.has_line_of_sight(draft.position, o.position, self.grid);
                    if distance > weapon.range || !in_sight {
                        return None;
                    }
                    AttackMode::Ranged
                };
                Some((distance, o, mode))
            })
            .min_by_key(|(distance, o, _)| (*distance, o.id))
            .map(|(_, o, mode)| (o, mode))?;

        draft
            .push(
                ActionKind::Attack(mode),
                Some(target.position),
                Some(ActionTarget::Character(target.id)),
            )
            .then(|| format!("takes a shot at {}", target.name))
    }

    fn plan_escape(&self, character: &CharacterToken, draft: &mut Draft<'_>, blocked: &AHashSet<Position>) -> String {
        let Some(zone) = self.map.escape_zone_for(character.player) else {
            return format!("{} has nowhere to escape to", character.name);
        };
        if zone.contains(draft.position) {
            return format!("{} holds in {}", character.name, zone.name);
        }
        let Some(exit) = zone
            .cells
            .iter()
            .copied()
            .filter(|c| !blocked.contains(c))
            .min_by_key(|c| cell_distance(draft.position, *c, self.grid))
        else {
            return format!("{} finds {} crowded", character.name, zone.name);
        };
        self.approach(character, draft, exit, 0, 0, blocked);
        format!("{} runs for {}", character.name, zone.name)
    }
}
