//! Turn bookkeeping
//!
//! Activations remaining only ever go down within a turn and are restored by
//! `advance_turn`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, PlayerNumber, TurnNumber};
use crate::game::map_state::MapState;

/// Phase within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    Deployment,
    #[default]
    Activation,
    NpcPhase,
    EndOfTurn,
}

/// Turn-level state shared by both players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    pub turn_number: TurnNumber,
    pub phase: TurnPhase,
    pub active_player: PlayerNumber,
    pub activations_remaining: BTreeMap<PlayerNumber, u32>,
    pub npc_phase_complete: bool,
    /// Characters that have taken their activation this turn
    #[serde(default)]
    pub activated: Vec<CharacterId>,
    /// Characters explicitly passed this turn without acting
    #[serde(default)]
    pub exhausted: Vec<CharacterId>,
}

impl TurnState {
    /// First turn, activation budgets taken from the team sizes on the map
    pub fn new(map: &MapState) -> Self {
        let mut state = Self {
            turn_number: 1,
            phase: TurnPhase::Activation,
            active_player: 1,
            activations_remaining: BTreeMap::new(),
            npc_phase_complete: false,
            activated: Vec::new(),
            exhausted: Vec::new(),
        };
        state.reset_activations(map);
        state
    }

    pub fn remaining(&self, player: PlayerNumber) -> u32 {
        self.activations_remaining.get(&player).copied().unwrap_or(0)
    }

    /// Record an activation. Returns false if the player had none left or the
    /// character already acted this turn.
    pub fn consume_activation(&mut self, player: PlayerNumber, character: CharacterId) -> bool {
        if self.has_acted(character) {
            return false;
        }
        match self.activations_remaining.get_mut(&player) {
            Some(n) if *n > 0 => {
                *n -= 1;
                self.activated.push(character);
                true
            }
            _ => false,
        }
    }

    /// Mark a character as passed without acting
    pub fn exhaust(&mut self, player: PlayerNumber, character: CharacterId) -> bool {
        if self.has_acted(character) {
            return false;
        }
        if let Some(n) = self.activations_remaining.get_mut(&player) {
            *n = n.saturating_sub(1);
        }
        self.exhausted.push(character);
        true
    }

    pub fn has_acted(&self, character: CharacterId) -> bool {
        self.activated.contains(&character) || self.exhausted.contains(&character)
    }

    /// End-of-turn resets: next turn number, fresh activations, NPC phase pending
    pub fn advance_turn(&mut self, map: &MapState) {
        self.turn_number += 1;
        self.phase = TurnPhase::Activation;
        self.active_player = 1;
        self.npc_phase_complete = false;
        self.activated.clear();
        self.exhausted.clear();
        self.reset_activations(map);
    }

    /// Turns left before the game horizon
    pub fn turns_remaining(&self, max_turns: u32) -> u32 {
        max_turns.saturating_sub(self.turn_number)
    }

    // Incapacitated characters still activate; they spend it recovering
    fn reset_activations(&mut self, map: &MapState) {
        self.activations_remaining.clear();
        for c in &map.characters {
            *self.activations_remaining.entry(c.player).or_insert(0) += 1;
        }
    }
}
