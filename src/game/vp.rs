//! Victory-point accounting

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, PlayerNumber, TurnNumber};
use crate::game::map_state::MapState;

/// Reason a VP was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VpType {
    Hack,
    FirstKnockdown,
    InfoDropExtraction,
    SocialIntel,
    Escape,
}

impl VpType {
    /// Table value for this award type
    pub fn default_points(&self) -> u32 {
        match self {
            VpType::Hack | VpType::FirstKnockdown | VpType::Escape => 1,
            VpType::InfoDropExtraction => 3,
            VpType::SocialIntel => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VpType::Hack => "hack",
            VpType::FirstKnockdown => "first knockdown",
            VpType::InfoDropExtraction => "info drop extraction",
            VpType::SocialIntel => "social intel",
            VpType::Escape => "escape",
        }
    }
}

/// One VP award
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpEvent {
    pub character_id: CharacterId,
    pub vp_type: VpType,
    pub points: u32,
    pub turn: TurnNumber,
    pub description: String,
}

/// Create a VP event, defaulting `points` to the type's table value
pub fn award_vp(
    character_id: CharacterId,
    vp_type: VpType,
    turn: TurnNumber,
    description: impl Into<String>,
    points: Option<u32>,
) -> VpEvent {
    VpEvent {
        character_id,
        vp_type,
        points: points.unwrap_or_else(|| vp_type.default_points()),
        turn,
        description: description.into(),
    }
}

/// Add an event's points to the character it names. Unknown ids are ignored.
pub fn apply_vp(map: &mut MapState, event: &VpEvent) -> bool {
    match map.character_mut(event.character_id) {
        Some(c) => {
            c.victory_points += event.points;
            true
        }
        None => false,
    }
}

/// Sum of accumulated VP over a player's characters
pub fn calculate_team_vp(map: &MapState, player: PlayerNumber) -> u32 {
    map.team(player).map(|c| c.victory_points).sum()
}
