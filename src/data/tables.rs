//! Process-wide domain tables and derived lookups
//!
//! `DomainTables::builtin()` carries the standard rules. A TOML file may
//! replace any of the tables wholesale; tables it leaves out keep the builtin
//! rows.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::error::{HeistError, Result};
use crate::data::actions::{AbilityDef, AbilityEffect, AbilityId, ActionKind, AttackMode};
use crate::data::enemies::{EnemyKind, EnemyStats};
use crate::data::equipment::{Equipment, EquipmentId, WeaponProfile};
use crate::data::roles::{Role, RoleProfile};
use crate::data::states::StateRules;
use crate::game::character::{CharacterState, CharacterToken, Stats};

/// Cost and description of a core (non-ability) action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreActionDef {
    pub kind: ActionKind,
    pub cost: u32,
    pub description: String,
}

/// All rules tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainTables {
    pub roles: Vec<RoleProfile>,
    pub states: Vec<StateRules>,
    pub core_actions: Vec<CoreActionDef>,
    pub abilities: Vec<AbilityDef>,
    pub enemies: Vec<EnemyStats>,
    pub equipment: Vec<Equipment>,
}

impl Default for DomainTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainTables {
    /// Standard rules
    pub fn builtin() -> Self {
        Self {
            roles: builtin_roles(),
            states: builtin_states(),
            core_actions: builtin_core_actions(),
            abilities: builtin_abilities(),
            enemies: builtin_enemies(),
            equipment: builtin_equipment(),
        }
    }

    /// Parse tables from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tables: DomainTables = toml::from_str(content)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Cross-table consistency: every referenced ability and item must exist
    pub fn validate(&self) -> Result<()> {
        for profile in &self.roles {
            for ability in &profile.abilities {
                if self.ability(ability).is_none() {
                    return Err(HeistError::TableLoad {
                        name: "roles".into(),
                        reason: format!("{:?} references unknown ability {}", profile.role, ability.0),
                    });
                }
            }
            for item in &profile.starting_equipment {
                if self.equipment(item).is_none() {
                    return Err(HeistError::TableLoad {
                        name: "roles".into(),
                        reason: format!("{:?} starts with unknown equipment {}", profile.role, item.0),
                    });
                }
            }
        }

        for rules in &self.states {
            for action in &rules.additional_actions {
                if let ActionKind::Ability(id) = action {
                    if self.ability(id).is_none() {
                        return Err(HeistError::TableLoad {
                            name: "states".into(),
                            reason: format!("{} references unknown ability {}", rules.state, id.0),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn role(&self, role: Role) -> Option<&RoleProfile> {
        self.roles.iter().find(|r| r.role == role)
    }

    pub fn state_rules(&self, state: CharacterState) -> Option<&StateRules> {
        self.states.iter().find(|s| s.state == state)
    }

    pub fn ability(&self, id: &AbilityId) -> Option<&AbilityDef> {
        self.abilities.iter().find(|a| &a.id == id)
    }

    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyStats> {
        self.enemies.iter().find(|e| e.kind == kind)
    }

    pub fn equipment(&self, id: &EquipmentId) -> Option<&Equipment> {
        self.equipment.iter().find(|e| &e.id == id)
    }

    /// Slot cost of an action
    pub fn action_cost(&self, action: &ActionKind) -> u32 {
        match action {
            ActionKind::Ability(id) => self.ability(id).map(|a| a.cost).unwrap_or(1),
            core => self
                .core_actions
                .iter()
                .find(|c| &c.kind == core)
                .map(|c| c.cost)
                .unwrap_or(1),
        }
    }

    /// Slot cost of an action given by display name
    pub fn action_cost_by_name(&self, name: &str) -> Result<u32> {
        Ok(self.action_cost(&ActionKind::parse(name, self)?))
    }

    /// Rules text for an action
    pub fn describe_action(&self, action: &ActionKind) -> String {
        match action {
            ActionKind::Ability(id) => self
                .ability(id)
                .map(|a| a.description.clone())
                .unwrap_or_default(),
            core => self
                .core_actions
                .iter()
                .find(|c| &c.kind == core)
                .map(|c| c.description.clone())
                .unwrap_or_default(),
        }
    }

    /// Actions the character may take right now, given role, state and kit
    pub fn available_actions(&self, character: &CharacterToken) -> Vec<ActionKind> {
        let state_rules = self.state_rules(character.state);

        if let Some(rules) = state_rules.filter(|r| r.exclusive) {
            return rules.additional_actions.clone();
        }

        let mut actions: Vec<ActionKind> = ActionKind::core()
            .into_iter()
            .filter(|a| match a {
                ActionKind::Attack(AttackMode::Ranged) => character
                    .weapon_for(AttackMode::Ranged, self)
                    .is_some(),
                _ => true,
            })
            .collect();

        if let Some(profile) = self.role(character.role) {
            for id in &profile.abilities {
                let spent = self
                    .ability(id)
                    .map(|a| a.once_per_game && character.has_used(id))
                    .unwrap_or(true);
                if !spent {
                    actions.push(ActionKind::Ability(id.clone()));
                }
            }
        }

        if let Some(rules) = state_rules {
            for action in &rules.additional_actions {
                if !actions.contains(action) {
                    actions.push(action.clone());
                }
            }
        }

        actions
    }
}

/// Load tables from a TOML file
pub fn load_tables(path: &Path) -> Result<DomainTables> {
    let content = std::fs::read_to_string(path).map_err(|e| HeistError::TableLoad {
        name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    DomainTables::from_toml_str(&content)
}

// === GLOBAL TABLE ACCESS ===

static TABLES: OnceLock<DomainTables> = OnceLock::new();

/// Get the process-wide tables (builtin unless set at startup)
pub fn tables() -> &'static DomainTables {
    TABLES.get_or_init(DomainTables::builtin)
}

/// Install the process-wide tables (can only be called once)
pub fn set_tables(tables: DomainTables) -> std::result::Result<(), DomainTables> {
    TABLES.set(tables)
}

// === BUILTIN ROWS ===

fn stats(movement: u32, melee: i32, ballistic: i32, wounds: u32, defense: i32, hack: i32, con: i32) -> Stats {
    Stats {
        movement,
        melee_skill: melee,
        ballistic_skill: ballistic,
        wounds,
        max_wounds: wounds,
        defense,
        hack,
        con,
    }
}

fn builtin_roles() -> Vec<RoleProfile> {
    let row = |role, base_stats, abilities: &[&str], kit: &[&str]| RoleProfile {
        role,
        base_stats,
        abilities: abilities.iter().map(|a| AbilityId::new(*a)).collect(),
        starting_equipment: kit.iter().map(|e| EquipmentId::new(*e)).collect(),
    };

    vec![
        row(Role::Brain, stats(5, 0, 1, 3, 0, 3, 1), &["overclock"], &["silenced_pistol", "hacking_rig"]),
        row(Role::Face, stats(5, 0, 1, 3, 0, 1, 3), &["disguise"], &["silenced_pistol"]),
        row(Role::Muscle, stats(4, 3, 2, 5, 2, 0, 0), &["adrenaline"], &["shotgun"]),
        row(Role::Ninja, stats(6, 2, 1, 4, 1, 1, 1), &["vanish"], &["katana"]),
        row(Role::Spook, stats(5, 1, 3, 3, 1, 1, 1), &["shadow_step"], &["rifle"]),
    ]
}

fn builtin_states() -> Vec<StateRules> {
    vec![
        StateRules {
            state: CharacterState::Overt,
            additional_actions: vec![ActionKind::Ability(AbilityId::new("hide"))],
            exclusive: false,
        },
        StateRules {
            state: CharacterState::Hidden,
            additional_actions: vec![ActionKind::Ability(AbilityId::new("go_loud"))],
            exclusive: false,
        },
        StateRules {
            state: CharacterState::Disguised,
            additional_actions: vec![ActionKind::Ability(AbilityId::new("go_loud"))],
            exclusive: false,
        },
        StateRules {
            state: CharacterState::Stunned,
            additional_actions: vec![ActionKind::Recover],
            exclusive: true,
        },
        StateRules {
            state: CharacterState::Unconscious,
            additional_actions: vec![ActionKind::Recover],
            exclusive: true,
        },
    ]
}

fn builtin_core_actions() -> Vec<CoreActionDef> {
    let row = |kind, cost, description: &str| CoreActionDef {
        kind,
        cost,
        description: description.to_string(),
    };

    vec![
        row(ActionKind::Move, 1, "Move up to your movement in cells."),
        row(ActionKind::Hack, 1, "Roll 2d6 + Hack against an adjacent computer's security."),
        row(ActionKind::Charm, 1, "Roll 2d6 + Con against 7 + the target's Con."),
        row(ActionKind::Attack(AttackMode::Melee), 1, "Roll 2d6 + Melee against 7 + Defense of an adjacent target."),
        row(ActionKind::Attack(AttackMode::Ranged), 1, "Roll 2d6 + Ballistic against 7 + Defense of a target in range and sight."),
        row(ActionKind::Extract, 1, "Extract an adjacent info drop."),
        row(ActionKind::Recover, 2, "Shake off a condition: Unconscious to Stunned, Stunned to Overt."),
    ]
}

fn builtin_abilities() -> Vec<AbilityDef> {
    let row = |id: &str, name: &str, cost, once_per_game, effect, description: &str| AbilityDef {
        id: AbilityId::new(id),
        name: name.to_string(),
        cost,
        once_per_game,
        effect,
        description: description.to_string(),
    };

    vec![
        row(
            "go_loud",
            "Go Loud",
            1,
            false,
            AbilityEffect::EnterState { state: CharacterState::Overt },
            "Drop concealment and become Overt.",
        ),
        row(
            "hide",
            "Hide",
            2,
            false,
            AbilityEffect::EnterState { state: CharacterState::Hidden },
            "Slip out of sight and become Hidden.",
        ),
        row(
            "disguise",
            "Disguise",
            2,
            false,
            AbilityEffect::EnterState { state: CharacterState::Disguised },
            "Blend in with staff and become Disguised.",
        ),
        row(
            "vanish",
            "Vanish",
            1,
            true,
            AbilityEffect::EnterState { state: CharacterState::Hidden },
            "Once per game, become Hidden instantly.",
        ),
        row(
            "overclock",
            "Overclock",
            1,
            true,
            AbilityEffect::CheckBonus { amount: 2 },
            "Once per game, +2 to the next check this activation.",
        ),
        row(
            "adrenaline",
            "Adrenaline",
            1,
            true,
            AbilityEffect::ExtraMove { cells: 2 },
            "Once per game, move 2 extra cells.",
        ),
        row(
            "shadow_step",
            "Shadow Step",
            1,
            false,
            AbilityEffect::ExtraMove { cells: 3 },
            "Move up to 3 cells.",
        ),
    ]
}

fn builtin_enemies() -> Vec<EnemyStats> {
    let row = |kind, movement, melee_skill, ballistic_skill, wounds, defense, con, threat_range| EnemyStats {
        kind,
        movement,
        melee_skill,
        ballistic_skill,
        wounds,
        defense,
        con,
        threat_range,
    };

    vec![
        row(EnemyKind::Guard, 4, 1, 1, 1, 0, 0, 6),
        row(EnemyKind::Elite, 5, 2, 2, 2, 1, 1, 7),
        row(EnemyKind::Camera, 0, 0, 0, 1, 0, 0, 6),
        row(EnemyKind::Turret, 0, 0, 2, 2, 2, 0, 8),
    ]
}

fn builtin_equipment() -> Vec<Equipment> {
    let weapon = |id: &str, name: &str, mode, range, damage, loud| Equipment {
        id: EquipmentId::new(id),
        name: name.to_string(),
        weapon: Some(WeaponProfile {
            mode,
            range,
            damage,
            loud,
        }),
        movement_bonus: 0,
        hack_bonus: 0,
    };

    vec![
        weapon("knife", "Knife", AttackMode::Melee, 1, 1, false),
        weapon("katana", "Katana", AttackMode::Melee, 1, 2, false),
        weapon("pistol", "Pistol", AttackMode::Ranged, 7, 1, true),
        weapon("silenced_pistol", "Silenced Pistol", AttackMode::Ranged, 7, 1, false),
        weapon("shotgun", "Shotgun", AttackMode::Ranged, 4, 2, true),
        weapon("rifle", "Rifle", AttackMode::Ranged, 12, 2, true),
        Equipment {
            id: EquipmentId::new("sneakers"),
            name: "Sneakers".into(),
            weapon: None,
            movement_bonus: 1,
            hack_bonus: 0,
        },
        Equipment {
            id: EquipmentId::new("hacking_rig"),
            name: "Hacking Rig".into(),
            weapon: None,
            movement_bonus: 0,
            hack_bonus: 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CharacterId;
    use crate::spatial::Position;

    fn character(role: Role, state: CharacterState) -> CharacterToken {
        CharacterToken::from_role(
            CharacterId(1),
            "Test",
            1,
            role,
            Position::new(0, 0),
            &DomainTables::builtin(),
        )
        .with_state(state)
    }

    #[test]
    fn test_builtin_tables_validate() {
        assert!(DomainTables::builtin().validate().is_ok());
    }

    #[test]
    fn test_every_role_and_state_has_a_row() {
        let tables = DomainTables::builtin();
        for role in Role::all() {
            assert!(tables.role(role).is_some(), "missing {:?}", role);
        }
        for state in CharacterState::all() {
            assert!(tables.state_rules(state).is_some(), "missing {:?}", state);
        }
    }

    #[test]
    fn test_action_costs() {
        let tables = DomainTables::builtin();
        assert_eq!(tables.action_cost(&ActionKind::Move), 1);
        assert_eq!(tables.action_cost(&ActionKind::Recover), 2);
        assert_eq!(tables.action_cost_by_name("Hide").unwrap(), 2);
        assert_eq!(tables.action_cost_by_name("Go Loud").unwrap(), 1);
        assert!(tables.action_cost_by_name("Fly").is_err());
    }

    #[test]
    fn test_descriptions_cover_core_actions_and_abilities() {
        let tables = DomainTables::builtin();
        assert!(!tables.describe_action(&ActionKind::Hack).is_empty());
        assert!(!tables
            .describe_action(&ActionKind::Ability(AbilityId::new("go_loud")))
            .is_empty());
        assert!(tables
            .describe_action(&ActionKind::Ability(AbilityId::new("teleport")))
            .is_empty());
    }

    #[test]
    fn test_stunned_is_exclusive() {
        let tables = DomainTables::builtin();
        let stunned = character(Role::Muscle, CharacterState::Stunned);
        assert_eq!(tables.available_actions(&stunned), vec![ActionKind::Recover]);
    }

    #[test]
    fn test_hidden_gets_go_loud_and_role_ability() {
        let tables = DomainTables::builtin();
        let ninja = character(Role::Ninja, CharacterState::Hidden);
        let actions = tables.available_actions(&ninja);
        assert!(actions.contains(&ActionKind::Ability(AbilityId::new("go_loud"))));
        assert!(actions.contains(&ActionKind::Ability(AbilityId::new("vanish"))));
        assert!(!actions.contains(&ActionKind::Ability(AbilityId::new("hide"))));
        assert!(!actions.contains(&ActionKind::Recover));
    }

    #[test]
    fn test_spent_once_per_game_ability_unavailable() {
        let tables = DomainTables::builtin();
        let mut ninja = character(Role::Ninja, CharacterState::Overt);
        ninja.used_abilities.push(AbilityId::new("vanish"));
        let actions = tables.available_actions(&ninja);
        assert!(!actions.contains(&ActionKind::Ability(AbilityId::new("vanish"))));
    }

    #[test]
    fn test_ranged_attack_requires_gun() {
        let tables = DomainTables::builtin();
        let ninja = character(Role::Ninja, CharacterState::Overt);
        assert!(!tables
            .available_actions(&ninja)
            .contains(&ActionKind::Attack(AttackMode::Ranged)));
        let spook = character(Role::Spook, CharacterState::Overt);
        assert!(tables
            .available_actions(&spook)
            .contains(&ActionKind::Attack(AttackMode::Ranged)));
    }

    #[test]
    fn test_toml_override_keeps_other_tables() {
        let content = r#"
[[enemies]]
kind = "Guard"
movement = 3
melee_skill = 0
ballistic_skill = 0
wounds = 1
defense = 0
con = 0
threat_range = 4
"#;
        let tables = DomainTables::from_toml_str(content).expect("valid override");
        assert_eq!(tables.enemies.len(), 1);
        assert_eq!(tables.enemy(EnemyKind::Guard).map(|e| e.movement), Some(3));
        assert_eq!(tables.roles.len(), 5);
    }

    #[test]
    fn test_toml_with_dangling_ability_rejected() {
        let content = r#"
[[roles]]
role = "Brain"
abilities = ["time_travel"]

[roles.base_stats]
movement = 5
melee_skill = 0
ballistic_skill = 0
wounds = 3
max_wounds = 3
defense = 0
hack = 3
con = 0
"#;
        assert!(DomainTables::from_toml_str(content).is_err());
    }
}
