//! Tactical AI for heist crews
//!
//! Architecture: Trait + Data hybrid
//! - TacticalAi trait defines the interface for swappable planners
//! - DifficultyProfile holds TOML-loadable tuning
//! - BoardEvaluation is the filtered, derived view the planner decides from
//!
//! Data flow: evaluator -> {posture, objectives, assignments} -> planner
//! builds one activation per character -> executor applies them step by step.

pub mod commander;
pub mod dice;
pub mod difficulty;
pub mod evaluator;
pub mod executor;
pub mod objectives;
pub mod planner;
pub mod threat;

pub use commander::HeuristicPlanner;
pub use dice::{roll_2d6, DiceRoll};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use evaluator::{evaluate_board, evaluate_board_with, select_posture, BoardEvaluation, CharacterHealth, Posture};
pub use executor::{
    execute_activation, execute_activation_with, ActionOutcome, ActionResult, ActivationRun, CharacterPatch,
    DiceEvent, Emitters, GameLogEntry, LogKind, RecordingEmitters,
};
pub use objectives::{
    assign_characters_to_objectives, prioritize_objectives, role_affinity, Assignment, ObjectiveId, ObjectiveInfo,
    ObjectiveKind, ObjectiveTarget,
};
pub use planner::{AIActivation, ActionTarget, ActivationPlanner, PlannedAction};
pub use threat::{assess_threats, Threat, ThreatSource};

use serde::{Deserialize, Serialize};

use crate::core::types::PlayerNumber;
use crate::game::map_state::MapState;
use crate::game::turn::TurnState;
use crate::spatial::GridType;

/// Evaluation plus the activations chosen from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPlan {
    pub evaluation: BoardEvaluation,
    pub activations: Vec<AIActivation>,
}

/// Trait for tactical AI implementations
pub trait TacticalAi {
    /// Decide activations for every character of `player` that has not acted yet
    fn plan_turn(
        &mut self,
        map: &MapState,
        turn: &TurnState,
        grid: GridType,
        player: PlayerNumber,
        alert_modifier: i32,
    ) -> TurnPlan;

    /// Get the difficulty tuning
    fn difficulty(&self) -> &DifficultyProfile;
}
