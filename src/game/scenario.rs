//! Starting boards
//!
//! A built-in demo heist for the CLI and tests, plus loading a board saved as
//! JSON by the hosting application.

use std::path::Path;

use crate::core::error::Result;
use crate::core::types::{CharacterId, ItemId};
use crate::data::enemies::EnemyKind;
use crate::data::roles::Role;
use crate::data::tables::DomainTables;
use crate::game::character::{CharacterState, CharacterToken};
use crate::game::map_state::{MapItem, MapItemKind, MapState, Zone, ZoneKind};
use crate::spatial::{Position, WallMap};

/// Two three-character crews on a 16x12 floor with a vault wall down the middle
pub fn demo_scenario(tables: &DomainTables) -> MapState {
    let mut walls = WallMap::new(16, 12);
    for y in 2..10 {
        if y != 5 && y != 6 {
            walls.add_wall(Position::new(8, y));
        }
    }
    let mut map = MapState::new(walls);

    let crew = [
        (1, "Cipher", 1, Role::Brain, Position::new(1, 2)),
        (2, "Kage", 1, Role::Ninja, Position::new(1, 5)),
        (3, "Tank", 1, Role::Muscle, Position::new(1, 8)),
        (4, "Velvet", 2, Role::Face, Position::new(14, 2)),
        (5, "Echo", 2, Role::Spook, Position::new(14, 5)),
        (6, "Brick", 2, Role::Muscle, Position::new(14, 8)),
    ];
    for (id, name, player, role, pos) in crew {
        map.characters.push(CharacterToken::from_role(
            CharacterId(id),
            name,
            player,
            role,
            pos,
            tables,
        ));
    }
    if let Some(face) = map.character_mut(CharacterId(4)) {
        face.state = CharacterState::Disguised;
    }

    let items = [
        (1, "Lobby Terminal", Position::new(5, 1), MapItemKind::Computer { security: 8 }),
        (2, "Vault Terminal", Position::new(10, 10), MapItemKind::Computer { security: 9 }),
        (3, "Ledger", Position::new(7, 6), MapItemKind::InfoDrop),
        (4, "Blueprints", Position::new(9, 3), MapItemKind::InfoDrop),
        (
            5,
            "Guard",
            Position::new(6, 9),
            MapItemKind::Enemy {
                kind: EnemyKind::Guard,
                knocked_out: false,
            },
        ),
        (
            6,
            "Camera",
            Position::new(11, 1),
            MapItemKind::Enemy {
                kind: EnemyKind::Camera,
                knocked_out: false,
            },
        ),
    ];
    for (id, name, pos, kind) in items {
        map.items.push(MapItem::new(ItemId(id), name, pos, kind));
    }

    let column = |x: i32| (0..12).map(|y| Position::new(x, y)).collect::<Vec<_>>();
    map.zones.push(Zone {
        name: "West Entrance".into(),
        kind: ZoneKind::Deployment,
        player: Some(1),
        cells: column(0),
    });
    map.zones.push(Zone {
        name: "East Entrance".into(),
        kind: ZoneKind::Deployment,
        player: Some(2),
        cells: column(15),
    });
    map.zones.push(Zone {
        name: "Loading Dock".into(),
        kind: ZoneKind::Escape,
        player: None,
        cells: (6..10).map(|x| Position::new(x, 11)).collect(),
    });

    map
}

/// Load a board saved as JSON
pub fn load_map(path: &Path) -> Result<MapState> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
