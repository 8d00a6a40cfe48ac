//! Board evaluation and strategic posture
//!
//! `evaluate_board` is a pure function of its inputs. Posture comes from a
//! fixed decision table and is recomputed on every call.

use serde::{Deserialize, Serialize};

use crate::ai::difficulty::DifficultyProfile;
use crate::ai::objectives::{
    assign_characters_to_objectives, prioritize_objectives, Assignment, ObjectiveInfo,
};
use crate::ai::threat::{assess_threats, Threat};
use crate::core::config::{config, EngineConfig};
use crate::core::types::{CharacterId, PlayerNumber};
use crate::data::tables::{tables, DomainTables};
use crate::game::alert::compute_alert_level;
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::map_state::MapState;
use crate::game::turn::TurnState;
use crate::game::vp::calculate_team_vp;
use crate::spatial::GridType;

/// Strategic stance for the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Aggressive,
    Balanced,
    Defensive,
    Escape,
}

impl Posture {
    pub fn name(&self) -> &'static str {
        match self {
            Posture::Aggressive => "aggressive",
            Posture::Balanced => "balanced",
            Posture::Defensive => "defensive",
            Posture::Escape => "escape",
        }
    }
}

/// Health snapshot of one living character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterHealth {
    pub character_id: CharacterId,
    pub wounds: u32,
    pub max_wounds: u32,
    pub state: CharacterState,
}

/// Everything the planner needs to know about the board, for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvaluation {
    pub player: PlayerNumber,
    pub own_vp: u32,
    pub opponent_vp: u32,
    pub vp_differential: i32,
    pub alert_level: u32,
    pub turns_remaining: u32,
    pub objectives: Vec<ObjectiveInfo>,
    pub assignments: Vec<Assignment>,
    pub health: Vec<CharacterHealth>,
    pub threats: Vec<Threat>,
    pub posture: Posture,
}

impl BoardEvaluation {
    /// Objective assigned to a character this pass
    pub fn objective_for(&self, character: CharacterId) -> Option<&ObjectiveInfo> {
        self.objectives
            .iter()
            .find(|o| o.assigned_to == Some(character))
    }

    /// Threats aimed at one character
    pub fn threats_to(&self, character: CharacterId) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(move |t| t.target == character)
    }
}

/// Pick a posture. First matching row wins.
pub fn select_posture(
    turns_remaining: u32,
    vp_differential: i32,
    threat_count: usize,
    alert_level: u32,
    difficulty: &DifficultyProfile,
) -> Posture {
    if turns_remaining <= 1 {
        Posture::Escape
    } else if vp_differential <= -2 {
        Posture::Aggressive
    } else if vp_differential >= 2 {
        Posture::Defensive
    } else if threat_count >= 4 && difficulty.safety_weight >= 0.7 {
        Posture::Defensive
    } else if alert_level >= 2 && difficulty.safety_weight >= 0.5 {
        Posture::Defensive
    } else {
        Posture::Balanced
    }
}

/// Evaluate the board for `player` using the process-wide config and tables
pub fn evaluate_board(
    map: &MapState,
    turn: &TurnState,
    grid: GridType,
    player: PlayerNumber,
    alert_modifier: i32,
    difficulty: &DifficultyProfile,
) -> BoardEvaluation {
    evaluate_board_with(map, turn, grid, player, alert_modifier, difficulty, config(), tables())
}

/// Evaluate the board against explicit config and tables
#[allow(clippy::too_many_arguments)]
pub fn evaluate_board_with(
    map: &MapState,
    turn: &TurnState,
    grid: GridType,
    player: PlayerNumber,
    alert_modifier: i32,
    difficulty: &DifficultyProfile,
    config: &EngineConfig,
    tables: &DomainTables,
) -> BoardEvaluation {
    let own_vp = calculate_team_vp(map, player);
    let opponent_vp: u32 = map.opponents(player).map(|c| c.victory_points).sum();
    let vp_differential = own_vp as i32 - opponent_vp as i32;

    let alert_level = compute_alert_level(map, alert_modifier, config).level;
    let turns_remaining = turn.turns_remaining(config.max_turns);

    let health = map
        .team(player)
        .filter(|c| c.is_active())
        .map(|c| CharacterHealth {
            character_id: c.id,
            wounds: c.stats.wounds,
            max_wounds: c.stats.max_wounds,
            state: c.state,
        })
        .collect();

    let threats = assess_threats(map, grid, player, alert_level, config, tables);

    let mut objectives = prioritize_objectives(map, grid, player);
    let team: Vec<&CharacterToken> = map.team(player).filter(|c| c.is_active()).collect();
    let assignments = assign_characters_to_objectives(&objectives, &team, map, grid);
    for assignment in &assignments {
        if let Some(objective) = objectives.iter_mut().find(|o| o.id == assignment.objective_id) {
            objective.assigned_to = Some(assignment.character_id);
        }
    }

    let posture = select_posture(
        turns_remaining,
        vp_differential,
        threats.len(),
        alert_level,
        difficulty,
    );

    tracing::info!(
        player,
        vp_differential,
        alert_level,
        turns_remaining,
        threats = threats.len(),
        objectives = objectives.len(),
        posture = posture.name(),
        "Board evaluated"
    );

    BoardEvaluation {
        player,
        own_vp,
        opponent_vp,
        vp_differential,
        alert_level,
        turns_remaining,
        objectives,
        assignments,
        health,
        threats,
        posture,
    }
}
