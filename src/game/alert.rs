//! Alert level computation
//!
//! Each compromised or incapacitated unit pushes the alert level up. The
//! count plus a scenario modifier is mapped through the configured thresholds.

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::game::map_state::{MapItemKind, MapState};

/// Derived alert tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLevel {
    pub level: u32,
    /// Compromised units counted (before the modifier)
    pub compromised: u32,
    pub modifier: i32,
}

/// Units that raise the alert: revealed or downed characters and knocked-out NPCs
pub fn compromised_count(map: &MapState) -> u32 {
    let characters = map
        .characters
        .iter()
        .filter(|c| !c.state.is_concealed())
        .count();
    let enemies = map
        .items
        .iter()
        .filter(|i| {
            matches!(
                i.kind,
                MapItemKind::Enemy {
                    knocked_out: true,
                    ..
                }
            )
        })
        .count();
    (characters + enemies) as u32
}

/// Compute the alert level for the board
pub fn compute_alert_level(map: &MapState, modifier: i32, config: &EngineConfig) -> AlertLevel {
    let compromised = compromised_count(map);
    let total = (compromised as i64 + modifier as i64).max(0) as u32;
    AlertLevel {
        level: config.alert_level_for(total),
        compromised,
        modifier,
    }
}
