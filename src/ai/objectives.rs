//! Objective prioritization and greedy character assignment
//!
//! Objectives are recomputed on every planning pass and never persisted.

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, ItemId, PlayerNumber};
use crate::data::roles::Role;
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::map_state::{MapItemKind, MapState};
use crate::spatial::{cell_distance, path_length, GridType, Position};

/// Index of an objective within one prioritized list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectiveId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveKind {
    Computer,
    InfoDrop,
    EnemyCharacter,
    EscapeZone,
}

/// Entity an objective points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveTarget {
    Item(ItemId),
    Character(CharacterId),
    Zone(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveInfo {
    pub id: ObjectiveId,
    pub kind: ObjectiveKind,
    pub position: Position,
    pub target: ObjectiveTarget,
    /// Estimated VP on completion
    pub vp_value: u32,
    pub assigned_to: Option<CharacterId>,
}

/// One character bound to one objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub character_id: CharacterId,
    pub objective_id: ObjectiveId,
}

/// Collect every objective open to `player`, highest VP first
///
/// Ties keep discovery order: computers, info drops, opposing characters,
/// then the escape zone.
pub fn prioritize_objectives(map: &MapState, grid: GridType, player: PlayerNumber) -> Vec<ObjectiveInfo> {
    let mut found: Vec<(ObjectiveKind, Position, ObjectiveTarget, u32)> = Vec::new();

    for item in &map.items {
        match item.kind {
            MapItemKind::Computer { .. } => {
                found.push((ObjectiveKind::Computer, item.position, ObjectiveTarget::Item(item.id), 1));
            }
            MapItemKind::InfoDrop => {
                found.push((ObjectiveKind::InfoDrop, item.position, ObjectiveTarget::Item(item.id), 3));
            }
            _ => {}
        }
    }

    for opponent in map.opponents(player).filter(|c| c.is_active()) {
        found.push((
            ObjectiveKind::EnemyCharacter,
            opponent.position,
            ObjectiveTarget::Character(opponent.id),
            1,
        ));
    }

    if let Some(zone) = map.escape_zone_for(player) {
        let entry = map
            .team(player)
            .filter(|c| c.is_active())
            .filter_map(|c| zone.nearest_cell(c.position, grid).map(|cell| (cell, c.position)))
            .min_by_key(|(cell, from)| cell_distance(*from, *cell, grid))
            .map(|(cell, _)| cell)
            .or_else(|| zone.anchor());
        if let Some(position) = entry {
            found.push((ObjectiveKind::EscapeZone, position, ObjectiveTarget::Zone(zone.name.clone()), 1));
        }
    }

    // sort_by is stable, so equal values keep discovery order
    found.sort_by(|a, b| b.3.cmp(&a.3));

    found
        .into_iter()
        .enumerate()
        .map(|(i, (kind, position, target, vp_value))| ObjectiveInfo {
            id: ObjectiveId(i),
            kind,
            position,
            target,
            vp_value,
            assigned_to: None,
        })
        .collect()
}

/// How well suited a role is to an objective type
pub fn role_affinity(kind: ObjectiveKind, role: Role) -> f32 {
    match (kind, role) {
        (ObjectiveKind::Computer, Role::Brain) => 3.0,
        (ObjectiveKind::Computer, Role::Muscle) => 0.0,
        (ObjectiveKind::Computer, _) => 1.0,

        (ObjectiveKind::InfoDrop, Role::Ninja) => 3.0,
        (ObjectiveKind::InfoDrop, Role::Spook) => 2.0,
        (ObjectiveKind::InfoDrop, _) => 1.0,

        (ObjectiveKind::EnemyCharacter, Role::Muscle) => 3.0,
        (ObjectiveKind::EnemyCharacter, Role::Ninja | Role::Spook) => 2.0,
        (ObjectiveKind::EnemyCharacter, _) => 0.0,

        (ObjectiveKind::EscapeZone, _) => 1.0,
    }
}

/// Greedy single pass over objectives in priority order
///
/// Candidates are scored `affinity * 2 - distance * 0.5`. Equal scores go to
/// the lowest character id. Characters walled off from an objective are not
/// candidates for it; objectives with no candidate stay unassigned.
pub fn assign_characters_to_objectives(
    objectives: &[ObjectiveInfo],
    characters: &[&CharacterToken],
    map: &MapState,
    grid: GridType,
) -> Vec<Assignment> {
    let mut pool: Vec<&CharacterToken> = characters
        .iter()
        .copied()
        .filter(|c| c.state != CharacterState::Unconscious)
        .collect();
    pool.sort_by_key(|c| c.id);

    let mut assigned: Vec<CharacterId> = Vec::new();
    let mut result = Vec::new();

    for objective in objectives {
        let mut best: Option<(&CharacterToken, f32)> = None;

        for candidate in pool.iter().filter(|c| !assigned.contains(&c.id)) {
            if path_length(&map.walls, candidate.position, objective.position, grid).is_none() {
                continue;
            }
            let distance = cell_distance(candidate.position, objective.position, grid) as f32;
            let score = role_affinity(objective.kind, candidate.role) * 2.0 - distance * 0.5;

            // strictly greater keeps the earlier (lower id) candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*candidate, score));
            }
        }

        if let Some((character, score)) = best {
            tracing::debug!(
                character = %character.id,
                objective = objective.id.0,
                score,
                "Assigned objective"
            );
            assigned.push(character.id);
            result.push(Assignment {
                character_id: character.id,
                objective_id: objective.id,
            });
        }
    }

    result
}
