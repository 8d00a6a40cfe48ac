//! Character archetypes

use serde::{Deserialize, Serialize};

use crate::data::actions::AbilityId;
use crate::data::equipment::EquipmentId;
use crate::game::character::Stats;

/// Crew archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Brain,
    Face,
    Muscle,
    Ninja,
    Spook,
}

impl Role {
    pub fn all() -> [Role; 5] {
        [Role::Brain, Role::Face, Role::Muscle, Role::Ninja, Role::Spook]
    }
}

/// Role table row: base stats, signature abilities and starting kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub role: Role,
    pub base_stats: Stats,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
    #[serde(default)]
    pub starting_equipment: Vec<EquipmentId>,
}
