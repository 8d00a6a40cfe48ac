//! Equipment and weapon profiles

use serde::{Deserialize, Serialize};

use crate::data::actions::AttackMode;

/// Key into the equipment table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EquipmentId(pub String);

impl EquipmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Weapon stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub mode: AttackMode,
    /// Maximum range in cells (1 for melee)
    pub range: u32,
    pub damage: u32,
    /// Loud weapons reveal a concealed attacker
    pub loud: bool,
}

impl WeaponProfile {
    pub fn unarmed() -> Self {
        Self {
            mode: AttackMode::Melee,
            range: 1,
            damage: 1,
            loud: false,
        }
    }
}

/// Equipment table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    #[serde(default)]
    pub movement_bonus: u32,
    #[serde(default)]
    pub hack_bonus: i32,
}
