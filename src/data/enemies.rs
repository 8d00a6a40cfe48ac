//! NPC security units

use serde::{Deserialize, Serialize};

/// Kind of security NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Guard,
    Elite,
    Camera,
    Turret,
}

/// Enemy table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub kind: EnemyKind,
    pub movement: u32,
    pub melee_skill: i32,
    pub ballistic_skill: i32,
    pub wounds: u32,
    pub defense: i32,
    pub con: i32,
    /// Cells within which the unit can spot or shoot
    pub threat_range: u32,
}
