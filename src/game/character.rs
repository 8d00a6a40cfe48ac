//! Character tokens and their five-way state

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, PlayerNumber};
use crate::data::actions::{AbilityId, AttackMode};
use crate::data::equipment::{EquipmentId, WeaponProfile};
use crate::data::roles::Role;
use crate::data::tables::DomainTables;
use crate::spatial::Position;

/// Visibility/condition state of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterState {
    Overt,
    Hidden,
    Disguised,
    Stunned,
    Unconscious,
}

impl CharacterState {
    pub fn all() -> [CharacterState; 5] {
        [
            CharacterState::Overt,
            CharacterState::Hidden,
            CharacterState::Disguised,
            CharacterState::Stunned,
            CharacterState::Unconscious,
        ]
    }

    /// Hidden or Disguised
    pub fn is_concealed(&self) -> bool {
        matches!(self, CharacterState::Hidden | CharacterState::Disguised)
    }

    /// Stunned or Unconscious
    pub fn is_incapacitated(&self) -> bool {
        matches!(self, CharacterState::Stunned | CharacterState::Unconscious)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterState::Overt => "Overt",
            CharacterState::Hidden => "Hidden",
            CharacterState::Disguised => "Disguised",
            CharacterState::Stunned => "Stunned",
            CharacterState::Unconscious => "Unconscious",
        }
    }
}

impl std::fmt::Display for CharacterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stat block of a character or enemy unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub movement: u32,
    pub melee_skill: i32,
    pub ballistic_skill: i32,
    pub wounds: u32,
    pub max_wounds: u32,
    pub defense: i32,
    pub hack: i32,
    pub con: i32,
}

/// A unit on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterToken {
    pub id: CharacterId,
    pub name: String,
    pub player: PlayerNumber,
    pub position: Position,
    pub role: Role,
    pub stats: Stats,
    pub state: CharacterState,
    #[serde(default)]
    pub equipment: Vec<EquipmentId>,
    #[serde(default)]
    pub victory_points: u32,
    /// Once-per-game abilities already spent
    #[serde(default)]
    pub used_abilities: Vec<AbilityId>,
}

impl CharacterToken {
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        player: PlayerNumber,
        role: Role,
        position: Position,
        stats: Stats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            player,
            position,
            role,
            stats,
            state: CharacterState::Hidden,
            equipment: Vec::new(),
            victory_points: 0,
            used_abilities: Vec::new(),
        }
    }

    /// Build a character with the role's base stats and starting kit
    pub fn from_role(
        id: CharacterId,
        name: impl Into<String>,
        player: PlayerNumber,
        role: Role,
        position: Position,
        tables: &DomainTables,
    ) -> Self {
        let profile = tables.role(role);
        let mut token = Self::new(
            id,
            name,
            player,
            role,
            position,
            profile.map(|p| p.base_stats).unwrap_or_default(),
        );
        if let Some(profile) = profile {
            token.equipment = profile.starting_equipment.clone();
        }
        token
    }

    pub fn with_state(mut self, state: CharacterState) -> Self {
        self.state = state;
        self
    }

    pub fn with_equipment(mut self, equipment: EquipmentId) -> Self {
        self.equipment.push(equipment);
        self
    }

    /// Still on the board and able to take part (not Unconscious)
    pub fn is_active(&self) -> bool {
        self.state != CharacterState::Unconscious
    }

    pub fn has_used(&self, ability: &AbilityId) -> bool {
        self.used_abilities.contains(ability)
    }

    /// Base movement plus equipment bonuses
    pub fn effective_movement(&self, tables: &DomainTables) -> u32 {
        let bonus: u32 = self
            .equipment
            .iter()
            .filter_map(|id| tables.equipment(id))
            .map(|e| e.movement_bonus)
            .sum();
        self.stats.movement + bonus
    }

    /// Hack stat plus equipment bonuses
    pub fn effective_hack(&self, tables: &DomainTables) -> i32 {
        let bonus: i32 = self
            .equipment
            .iter()
            .filter_map(|id| tables.equipment(id))
            .map(|e| e.hack_bonus)
            .sum();
        self.stats.hack + bonus
    }

    /// Best carried weapon for the given attack mode
    ///
    /// Melee falls back to bare hands; ranged returns None without a gun.
    pub fn weapon_for(&self, mode: AttackMode, tables: &DomainTables) -> Option<WeaponProfile> {
        let carried = self
            .equipment
            .iter()
            .filter_map(|id| tables.equipment(id))
            .filter_map(|e| e.weapon)
            .filter(|w| w.mode == mode)
            .max_by_key(|w| (w.damage, w.range));

        match (carried, mode) {
            (Some(w), _) => Some(w),
            (None, AttackMode::Melee) => Some(WeaponProfile::unarmed()),
            (None, AttackMode::Ranged) => None,
        }
    }

    /// Skill used for the given attack mode
    pub fn attack_skill(&self, mode: AttackMode) -> i32 {
        match mode {
            AttackMode::Melee => self.stats.melee_skill,
            AttackMode::Ranged => self.stats.ballistic_skill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tables::DomainTables;

    #[test]
    fn test_state_classification() {
        assert!(CharacterState::Hidden.is_concealed());
        assert!(CharacterState::Disguised.is_concealed());
        assert!(!CharacterState::Overt.is_concealed());
        assert!(CharacterState::Stunned.is_incapacitated());
        assert!(CharacterState::Unconscious.is_incapacitated());
        assert!(!CharacterState::Hidden.is_incapacitated());
    }

    #[test]
    fn test_from_role_uses_base_stats() {
        let tables = DomainTables::builtin();
        let brain = CharacterToken::from_role(
            CharacterId(1),
            "Brain",
            1,
            Role::Brain,
            Position::new(0, 0),
            &tables,
        );
        let profile = tables.role(Role::Brain).expect("builtin brain profile");
        assert_eq!(brain.stats, profile.base_stats);
        assert_eq!(brain.state, CharacterState::Hidden);
        assert!(brain.is_active());
    }

    #[test]
    fn test_unconscious_is_not_active() {
        let tables = DomainTables::builtin();
        let token = CharacterToken::from_role(
            CharacterId(1),
            "Muscle",
            1,
            Role::Muscle,
            Position::new(0, 0),
            &tables,
        )
        .with_state(CharacterState::Unconscious);
        assert!(!token.is_active());
    }

    #[test]
    fn test_unarmed_melee_fallback() {
        let tables = DomainTables::builtin();
        let token = CharacterToken::new(
            CharacterId(1),
            "Nobody",
            1,
            Role::Brain,
            Position::new(0, 0),
            Stats::default(),
        );
        let melee = token.weapon_for(AttackMode::Melee, &tables).expect("fists");
        assert_eq!(melee.range, 1);
        assert!(token.weapon_for(AttackMode::Ranged, &tables).is_none());
    }

    #[test]
    fn test_equipment_movement_bonus() {
        let tables = DomainTables::builtin();
        let token = CharacterToken::new(
            CharacterId(1),
            "Runner",
            1,
            Role::Ninja,
            Position::new(0, 0),
            Stats {
                movement: 5,
                ..Stats::default()
            },
        )
        .with_equipment(EquipmentId::new("sneakers"));
        assert_eq!(token.effective_movement(&tables), 6);
    }
}
