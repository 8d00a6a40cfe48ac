//! Board state: characters, map items, zones, turns, victory points and alert
//!
//! `MapState` is the single mutable aggregate of a session. Everything else in
//! this module either describes it or derives numbers from it.

pub mod alert;
pub mod character;
pub mod combat;
pub mod map_state;
pub mod scenario;
pub mod turn;
pub mod vp;

pub use alert::{compromised_count, compute_alert_level, AlertLevel};
pub use character::{CharacterState, CharacterToken, Stats};
pub use map_state::{MapItem, MapItemKind, MapState, Zone, ZoneKind};
pub use scenario::{demo_scenario, load_map};
pub use turn::{TurnPhase, TurnState};
pub use vp::{apply_vp, award_vp, calculate_team_vp, VpEvent, VpType};
