//! Per-state action rules

use serde::{Deserialize, Serialize};

use crate::data::actions::ActionKind;
use crate::game::character::CharacterState;

/// What a state adds to (or restricts) the action menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRules {
    pub state: CharacterState,
    /// Actions unlocked by being in this state
    #[serde(default)]
    pub additional_actions: Vec<ActionKind>,
    /// When set, only `additional_actions` may be taken
    #[serde(default)]
    pub exclusive: bool,
}
