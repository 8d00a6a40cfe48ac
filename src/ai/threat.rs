//! Threat assessment for one team
//!
//! Security NPCs see through nothing but walls: they ignore Disguised
//! characters and only notice Hidden ones in an adjacent cell. Opposing crews
//! follow the same rule for Hidden characters but can see through disguises.

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{CharacterId, ItemId, PlayerNumber};
use crate::data::tables::DomainTables;
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::map_state::MapState;
use crate::spatial::{cell_distance, GridType, Position};

/// What is doing the threatening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatSource {
    Enemy(ItemId),
    Opponent(CharacterId),
    /// Building-wide pressure from a raised alert level
    AlertPressure,
}

/// One danger to one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub target: CharacterId,
    pub source: ThreatSource,
    pub source_position: Option<Position>,
    pub distance: u32,
    /// 0.0 (remote) to 1.0 (immediate)
    pub severity: f32,
}

/// Alert level at which every Overt character is under pressure
const ALERT_PRESSURE_LEVEL: u32 = 2;

/// Enumerate threats to `player`'s active characters
pub fn assess_threats(
    map: &MapState,
    grid: GridType,
    player: PlayerNumber,
    alert_level: u32,
    config: &EngineConfig,
    tables: &DomainTables,
) -> Vec<Threat> {
    let mut threats = Vec::new();

    for character in map.team(player).filter(|c| c.is_active()) {
        for enemy in map.active_enemies() {
            let Some(stats) = enemy.enemy_kind().and_then(|k| tables.enemy(k)) else {
                continue;
            };
            if character.state == CharacterState::Disguised {
                continue;
            }
            let distance = cell_distance(character.position, enemy.position, grid);
            if !noticed(character, distance, stats.threat_range)
                || !map.walls.has_line_of_sight(enemy.position, character.position, grid)
            {
                continue;
            }
            threats.push(Threat {
                target: character.id,
                source: ThreatSource::Enemy(enemy.id),
                source_position: Some(enemy.position),
                distance,
                severity: severity(distance, stats.threat_range),
            });
        }

        for opponent in map.opponents(player).filter(|o| !o.state.is_incapacitated()) {
            let reach = opponent.effective_movement(tables) + config.threat_range_bonus;
            let distance = cell_distance(character.position, opponent.position, grid);
            if !noticed(character, distance, reach) {
                continue;
            }
            threats.push(Threat {
                target: character.id,
                source: ThreatSource::Opponent(opponent.id),
                source_position: Some(opponent.position),
                distance,
                severity: severity(distance, reach),
            });
        }

        if alert_level >= ALERT_PRESSURE_LEVEL && character.state == CharacterState::Overt {
            threats.push(Threat {
                target: character.id,
                source: ThreatSource::AlertPressure,
                source_position: None,
                distance: 0,
                severity: (alert_level as f32 / 3.0).min(1.0),
            });
        }
    }

    tracing::debug!(player, count = threats.len(), "Assessed threats");
    threats
}

fn noticed(character: &CharacterToken, distance: u32, reach: u32) -> bool {
    match character.state {
        CharacterState::Hidden => distance <= 1,
        _ => distance <= reach,
    }
}

fn severity(distance: u32, reach: u32) -> f32 {
    1.0 - distance as f32 / (reach as f32 + 1.0)
}
