//! Wall map with bounds and line of sight
//!
//! Walls occupy whole cells and are keyed by the canonical position string.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::spatial::grid::{line_between, GridType, Position, PositionKey};

/// Static board geometry for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallMap {
    pub width: u32,
    pub height: u32,
    walls: AHashSet<PositionKey>,
}

impl WallMap {
    /// Create an open board of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: AHashSet::new(),
        }
    }

    pub fn add_wall(&mut self, pos: Position) {
        self.walls.insert(pos.key());
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.contains(&pos.key())
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Check if a position is within board bounds
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// In bounds and not a wall
    pub fn is_passable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_wall(pos)
    }

    /// Check line of sight between two cells
    ///
    /// Only the cells strictly between the two ends can block.
    pub fn has_line_of_sight(&self, from: Position, to: Position, grid: GridType) -> bool {
        let line = line_between(from, to, grid);

        for pos in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            if self.is_wall(*pos) {
                return false;
            }
        }

        true
    }
}
