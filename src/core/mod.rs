pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, EngineConfig};
pub use error::{HeistError, Result};
pub use types::{CharacterId, EntryId, ItemId, PlayerNumber, TurnNumber};
