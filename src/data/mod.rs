//! Immutable domain tables: roles, states, actions, abilities, enemies, equipment
//!
//! Loaded once at startup (`tables()` / `set_tables()`), never mutated after.

pub mod actions;
pub mod enemies;
pub mod equipment;
pub mod roles;
pub mod states;
pub mod tables;

pub use actions::{AbilityDef, AbilityEffect, AbilityId, ActionKind, AttackMode};
pub use enemies::{EnemyKind, EnemyStats};
pub use equipment::{Equipment, EquipmentId, WeaponProfile};
pub use roles::{Role, RoleProfile};
pub use states::StateRules;
pub use tables::{load_tables, set_tables, tables, DomainTables};
