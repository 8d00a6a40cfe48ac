//! Action vocabulary
//!
//! Actions are parsed from their display names once, at input time, into
//! `ActionKind`. Costs and descriptions are then plain lookups on the tag.

use serde::{Deserialize, Serialize};

use crate::core::error::{HeistError, Result};
use crate::data::tables::DomainTables;
use crate::game::character::CharacterState;

/// Key into the ability table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Melee vs ranged attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackMode {
    Melee,
    Ranged,
}

/// Everything a character can spend action slots on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Hack,
    Charm,
    Attack(AttackMode),
    Extract,
    Recover,
    Ability(AbilityId),
}

impl ActionKind {
    /// Core actions available to every character in a non-exclusive state
    pub fn core() -> [ActionKind; 6] {
        [
            ActionKind::Move,
            ActionKind::Hack,
            ActionKind::Charm,
            ActionKind::Attack(AttackMode::Melee),
            ActionKind::Attack(AttackMode::Ranged),
            ActionKind::Extract,
        ]
    }

    /// Resolve a display name ("Ranged Attack", "Go Loud", ...) to an action
    pub fn parse(name: &str, tables: &DomainTables) -> Result<ActionKind> {
        let normalized = name.trim().to_ascii_lowercase();
        let kind = match normalized.as_str() {
            "move" => ActionKind::Move,
            "hack" => ActionKind::Hack,
            "charm" => ActionKind::Charm,
            "melee attack" | "melee" => ActionKind::Attack(AttackMode::Melee),
            "ranged attack" | "shoot" => ActionKind::Attack(AttackMode::Ranged),
            "extract" => ActionKind::Extract,
            "recover" => ActionKind::Recover,
            _ => {
                let ability = tables
                    .abilities
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(name.trim()) || a.id.0 == normalized)
                    .ok_or_else(|| HeistError::UnknownAction(name.to_string()))?;
                ActionKind::Ability(ability.id.clone())
            }
        };
        Ok(kind)
    }

    /// Display name
    pub fn name(&self, tables: &DomainTables) -> String {
        match self {
            ActionKind::Move => "Move".into(),
            ActionKind::Hack => "Hack".into(),
            ActionKind::Charm => "Charm".into(),
            ActionKind::Attack(AttackMode::Melee) => "Melee Attack".into(),
            ActionKind::Attack(AttackMode::Ranged) => "Ranged Attack".into(),
            ActionKind::Extract => "Extract".into(),
            ActionKind::Recover => "Recover".into(),
            ActionKind::Ability(id) => tables
                .ability(id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| id.0.clone()),
        }
    }

    /// Contested checks roll dice against a target
    pub fn is_check(&self) -> bool {
        matches!(
            self,
            ActionKind::Hack | ActionKind::Charm | ActionKind::Attack(_)
        )
    }

    /// Actions that only change the actor's position
    pub fn is_movement(&self, tables: &DomainTables) -> bool {
        match self {
            ActionKind::Move => true,
            ActionKind::Ability(id) => matches!(
                tables.ability(id).map(|a| a.effect),
                Some(AbilityEffect::ExtraMove { .. })
            ),
            _ => false,
        }
    }
}

/// What using an ability does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityEffect {
    /// Switch the user into the given state
    EnterState { state: CharacterState },
    /// Add to the next check this activation
    CheckBonus { amount: i32 },
    /// Move up to `cells` without spending a Move action
    ExtraMove { cells: u32 },
}

/// Ability table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: String,
    pub cost: u32,
    #[serde(default)]
    pub once_per_game: bool,
    pub effect: AbilityEffect,
    #[serde(default)]
    pub description: String,
}
