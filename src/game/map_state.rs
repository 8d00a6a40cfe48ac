//! The per-session board aggregate
//!
//! One `MapState` exists per game session. Whoever is currently acting (a human
//! action handler or the AI executor) holds it by exclusive reference.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, ItemId, PlayerNumber};
use crate::data::enemies::EnemyKind;
use crate::game::character::CharacterToken;
use crate::spatial::{GridType, Position, WallMap};

/// What a map item is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MapItemKind {
    /// Hackable terminal; `security` is the target number of the hack check
    Computer { security: i32 },
    /// Intel package that can be extracted
    InfoDrop,
    /// Teleporter linking to another portal
    SecurityPortal { link: Option<ItemId> },
    /// NPC guard, elite, camera or turret
    Enemy {
        kind: EnemyKind,
        #[serde(default)]
        knocked_out: bool,
    },
}

/// An object or NPC on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapItem {
    pub id: ItemId,
    pub name: String,
    pub position: Position,
    pub kind: MapItemKind,
}

impl MapItem {
    pub fn new(id: ItemId, name: impl Into<String>, position: Position, kind: MapItemKind) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            kind,
        }
    }

    pub fn is_info_drop(&self) -> bool {
        matches!(self.kind, MapItemKind::InfoDrop)
    }

    /// Enemy unit that has not been knocked out
    pub fn is_active_enemy(&self) -> bool {
        matches!(
            self.kind,
            MapItemKind::Enemy {
                knocked_out: false,
                ..
            }
        )
    }

    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match self.kind {
            MapItemKind::Enemy { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Zone purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Deployment,
    Escape,
}

/// Named region of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub kind: ZoneKind,
    /// Owning player, or None for a shared zone
    pub player: Option<PlayerNumber>,
    pub cells: Vec<Position>,
}

impl Zone {
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// Cell closest to the zone's centroid
    pub fn anchor(&self) -> Option<Position> {
        if self.cells.is_empty() {
            return None;
        }
        let n = self.cells.len() as f32;
        let cx = self.cells.iter().map(|c| c.x as f32).sum::<f32>() / n;
        let cy = self.cells.iter().map(|c| c.y as f32).sum::<f32>() / n;
        self.cells.iter().copied().min_by(|a, b| {
            let da = (a.x as f32 - cx).powi(2) + (a.y as f32 - cy).powi(2);
            let db = (b.x as f32 - cx).powi(2) + (b.y as f32 - cy).powi(2);
            da.total_cmp(&db)
        })
    }

    /// Zone cell nearest to `from`
    pub fn nearest_cell(&self, from: Position, grid: GridType) -> Option<Position> {
        self.cells
            .iter()
            .copied()
            .min_by_key(|c| crate::spatial::cell_distance(from, *c, grid))
    }
}

/// The mutable board aggregate for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapState {
    pub items: Vec<MapItem>,
    pub characters: Vec<CharacterToken>,
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub walls: WallMap,
    /// Characters that have been knocked out at least once this game
    #[serde(default)]
    pub knocked_down: Vec<CharacterId>,
}

impl MapState {
    pub fn new(walls: WallMap) -> Self {
        Self {
            walls,
            ..Self::default()
        }
    }

    pub fn character(&self, id: CharacterId) -> Option<&CharacterToken> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut CharacterToken> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&MapItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut MapItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Remove an item, returning it if it existed
    pub fn remove_item(&mut self, id: ItemId) -> Option<MapItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Characters owned by `player`
    pub fn team(&self, player: PlayerNumber) -> impl Iterator<Item = &CharacterToken> {
        self.characters.iter().filter(move |c| c.player == player)
    }

    /// Characters not owned by `player`
    pub fn opponents(&self, player: PlayerNumber) -> impl Iterator<Item = &CharacterToken> {
        self.characters.iter().filter(move |c| c.player != player)
    }

    /// Enemy NPCs still in play
    pub fn active_enemies(&self) -> impl Iterator<Item = &MapItem> {
        self.items.iter().filter(|i| i.is_active_enemy())
    }

    /// Escape zone for a player, falling back to their deployment zone
    pub fn escape_zone_for(&self, player: PlayerNumber) -> Option<&Zone> {
        let owned = |kind: ZoneKind| {
            self.zones
                .iter()
                .find(|z| z.kind == kind && z.player == Some(player))
        };
        owned(ZoneKind::Escape)
            .or_else(|| {
                self.zones
                    .iter()
                    .find(|z| z.kind == ZoneKind::Escape && z.player.is_none())
            })
            .or_else(|| owned(ZoneKind::Deployment))
    }

    /// Record a knockdown. Returns true the first time a character goes down.
    pub fn record_knockdown(&mut self, id: CharacterId) -> bool {
        if self.knocked_down.contains(&id) {
            return false;
        }
        self.knocked_down.push(id);
        true
    }

    /// Cells holding a character, an enemy unit or an object
    pub fn occupied_positions(&self) -> AHashSet<Position> {
        self.characters
            .iter()
            .map(|c| c.position)
            .chain(self.items.iter().map(|i| i.position))
            .collect()
    }

    /// Name of a character or item, for narration
    pub fn display_name_at(&self, character: Option<CharacterId>, item: Option<ItemId>) -> Option<String> {
        character
            .and_then(|id| self.character(id).map(|c| c.name.clone()))
            .or_else(|| item.and_then(|id| self.item(id).map(|i| i.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roles::Role;
    use crate::game::character::Stats;

    fn token(id: u32, player: PlayerNumber, pos: Position) -> CharacterToken {
        CharacterToken::new(
            CharacterId(id),
            format!("c{id}"),
            player,
            Role::Muscle,
            pos,
            Stats::default(),
        )
    }

    #[test]
    fn test_team_and_opponents() {
        let mut map = MapState::new(WallMap::new(10, 10));
        map.characters.push(token(1, 1, Position::new(0, 0)));
        map.characters.push(token(2, 1, Position::new(1, 0)));
        map.characters.push(token(3, 2, Position::new(5, 5)));

        assert_eq!(map.team(1).count(), 2);
        assert_eq!(map.opponents(1).count(), 1);
        assert_eq!(map.opponents(2).count(), 2);
    }

    #[test]
    fn test_escape_zone_falls_back_to_deployment() {
        let mut map = MapState::new(WallMap::new(10, 10));
        map.zones.push(Zone {
            name: "P1 Deploy".into(),
            kind: ZoneKind::Deployment,
            player: Some(1),
            cells: vec![Position::new(0, 0), Position::new(0, 1)],
        });
        assert_eq!(map.escape_zone_for(1).map(|z| z.name.as_str()), Some("P1 Deploy"));
        assert!(map.escape_zone_for(2).is_none());

        map.zones.push(Zone {
            name: "Rooftop".into(),
            kind: ZoneKind::Escape,
            player: None,
            cells: vec![Position::new(9, 9)],
        });
        assert_eq!(map.escape_zone_for(1).map(|z| z.name.as_str()), Some("Rooftop"));
        assert_eq!(map.escape_zone_for(2).map(|z| z.name.as_str()), Some("Rooftop"));
    }

    #[test]
    fn test_zone_anchor_is_member_cell() {
        let zone = Zone {
            name: "Z".into(),
            kind: ZoneKind::Escape,
            player: None,
            cells: vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
        };
        assert_eq!(zone.anchor(), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_remove_item() {
        let mut map = MapState::new(WallMap::new(10, 10));
        map.items.push(MapItem::new(
            ItemId(4),
            "Drop",
            Position::new(3, 3),
            MapItemKind::InfoDrop,
        ));
        assert!(map.remove_item(ItemId(4)).is_some());
        assert!(map.remove_item(ItemId(4)).is_none());
        assert!(map.items.is_empty());
    }

    #[test]
    fn test_first_knockdown_recorded_once() {
        let mut map = MapState::new(WallMap::new(10, 10));
        assert!(map.record_knockdown(CharacterId(2)));
        assert!(!map.record_knockdown(CharacterId(2)));
        assert!(map.record_knockdown(CharacterId(3)));
    }

    #[test]
    fn test_occupied_positions() {
        let mut map = MapState::new(WallMap::new(10, 10));
        map.characters.push(token(1, 1, Position::new(2, 2)));
        map.items.push(MapItem::new(
            ItemId(1),
            "Terminal",
            Position::new(4, 4),
            MapItemKind::Computer { security: 8 },
        ));
        let occupied = map.occupied_positions();
        assert!(occupied.contains(&Position::new(2, 2)));
        assert!(occupied.contains(&Position::new(4, 4)));
        assert_eq!(occupied.len(), 2);
    }
}
