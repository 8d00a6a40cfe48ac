//! Heuristic AI for a whole crew turn
//!
//! Evaluates the board, plans one activation per character (incapacitated ones
//! only recover) and, when asked to take the turn, runs them in id order
//! against the map.

use ahash::AHashSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::difficulty::DifficultyProfile;
use crate::ai::evaluator::evaluate_board_with;
use crate::ai::executor::{execute_activation_with, ActionResult, Emitters};
use crate::ai::planner::{AIActivation, ActivationPlanner};
use crate::ai::{TacticalAi, TurnPlan};
use crate::core::config::{config, EngineConfig};
use crate::core::types::PlayerNumber;
use crate::data::tables::{tables, DomainTables};
use crate::game::map_state::MapState;
use crate::game::turn::TurnState;
use crate::spatial::GridType;

/// Greedy planner driven by a difficulty profile
pub struct HeuristicPlanner {
    difficulty: DifficultyProfile,
    rng: ChaCha8Rng,
    config: EngineConfig,
    tables: DomainTables,
}

impl HeuristicPlanner {
    /// Create a planner with the default seed, using the process-wide config and tables
    pub fn new(difficulty: DifficultyProfile) -> Self {
        Self::with_seed(difficulty, 42)
    }

    /// Create with a specific RNG seed for deterministic behavior
    pub fn with_seed(difficulty: DifficultyProfile, seed: u64) -> Self {
        Self {
            difficulty,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config: config().clone(),
            tables: tables().clone(),
        }
    }

    /// Swap in explicit config and tables
    pub fn with_rules(mut self, config: EngineConfig, tables: DomainTables) -> Self {
        self.config = config;
        self.tables = tables;
        self
    }

    /// Plan and execute a full turn for `player`
    ///
    /// Each executed activation is recorded on `turn`; fumbled characters are
    /// marked exhausted.
    pub fn take_turn(
        &mut self,
        map: &mut MapState,
        turn: &mut TurnState,
        grid: GridType,
        player: PlayerNumber,
        alert_modifier: i32,
        emitters: &mut dyn Emitters,
    ) -> Vec<ActionResult> {
        let plan = self.plan_turn(map, turn, grid, player, alert_modifier);
        let mut results = Vec::new();

        for character in map.team(player).map(|c| c.id).collect::<Vec<_>>() {
            match plan.activations.iter().find(|a| a.character_id == character) {
                Some(activation) => {
                    if !turn.consume_activation(player, character) {
                        continue;
                    }
                    results.extend(execute_activation_with(
                        activation,
                        map,
                        grid,
                        turn.turn_number,
                        &self.tables,
                        emitters,
                        &mut self.rng,
                        None,
                    ));
                }
                None => {
                    turn.exhaust(player, character);
                }
            }
        }

        tracing::info!(
            player,
            turn = turn.turn_number,
            actions = results.len(),
            "AI turn complete"
        );
        results
    }
}

impl TacticalAi for HeuristicPlanner {
    fn plan_turn(
        &mut self,
        map: &MapState,
        turn: &TurnState,
        grid: GridType,
        player: PlayerNumber,
        alert_modifier: i32,
    ) -> TurnPlan {
        let evaluation = evaluate_board_with(
            map,
            turn,
            grid,
            player,
            alert_modifier,
            &self.difficulty,
            &self.config,
            &self.tables,
        );

        let planner = ActivationPlanner::new(map, grid, &self.tables, &self.config).with_aggression(self.difficulty.aggression);
        let mut occupied: AHashSet<_> = map.occupied_positions();
        let mut activations: Vec<AIActivation> = Vec::new();

        let mut team: Vec<_> = map
            .team(player)
            .filter(|c| !turn.has_acted(c.id))
            .collect();
        team.sort_by_key(|c| c.id);

        for character in team {
            occupied.remove(&character.position);
            let activation = planner.plan(
                character,
                evaluation.objective_for(character.id),
                evaluation.posture,
                &occupied,
            );

            // Roll for fumbling the activation based on difficulty
            if self.rng.gen::<f32>() < self.difficulty.mistake_chance {
                tracing::debug!(character = %character.id, "Activation fumbled");
                occupied.insert(character.position);
                continue;
            }

            // Later characters must not path through where this one ends up
            let end = activation
                .actions
                .iter()
                .rev()
                .find_map(|a| {
                    a.action
                        .is_movement(&self.tables)
                        .then_some(a.target_position)
                        .flatten()
                })
                .unwrap_or(character.position);
            occupied.insert(end);
            activations.push(activation);
        }

        TurnPlan {
            evaluation,
            activations,
        }
    }

    fn difficulty(&self) -> &DifficultyProfile {
        &self.difficulty
    }
}
