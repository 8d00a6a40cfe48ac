//! Grid topology and cell distances
//!
//! Hex grids use axial coordinates (x = q, y = r). Square grids allow
//! diagonal steps, so their distance is the Chebyshev distance.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::HeistError;

/// Board topology selected per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    Square,
    #[default]
    Hex,
}

impl GridType {
    /// Plural cell noun used in narrated messages
    pub fn cell_name(&self) -> &'static str {
        match self {
            GridType::Square => "squares",
            GridType::Hex => "hexes",
        }
    }
}

impl FromStr for GridType {
    type Err = HeistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(GridType::Square),
            "hex" => Ok(GridType::Hex),
            other => Err(HeistError::InvalidConfig(format!("unknown grid type {other}"))),
        }
    }
}

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Canonical string form of a position, used to key wall/occupancy lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Normalized `"x,y"` key
    pub fn key(&self) -> PositionKey {
        PositionKey(format!("{},{}", self.x, self.y))
    }

    /// Neighboring cells for the given topology
    pub fn neighbors(&self, grid: GridType) -> Vec<Position> {
        match grid {
            GridType::Hex => vec![
                Position::new(self.x + 1, self.y),
                Position::new(self.x + 1, self.y - 1),
                Position::new(self.x, self.y - 1),
                Position::new(self.x - 1, self.y),
                Position::new(self.x - 1, self.y + 1),
                Position::new(self.x, self.y + 1),
            ],
            GridType::Square => {
                let mut cells = Vec::with_capacity(8);
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        if dx != 0 || dy != 0 {
                            cells.push(Position::new(self.x + dx, self.y + dy));
                        }
                    }
                }
                cells
            }
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Distance in cells between two positions
pub fn cell_distance(a: Position, b: Position, grid: GridType) -> u32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    match grid {
        GridType::Square => dx.max(dy) as u32,
        GridType::Hex => {
            let ds = ((-a.x - a.y) - (-b.x - b.y)).abs();
            ((dx + dy + ds) / 2) as u32
        }
    }
}

/// Cells on the straight line from `from` to `to`, both ends included
pub fn line_between(from: Position, to: Position, grid: GridType) -> Vec<Position> {
    let n = cell_distance(from, to, grid) as i32;
    if n == 0 {
        return vec![from];
    }

    let mut results = Vec::with_capacity((n + 1) as usize);
    for i in 0..=n {
        let t = i as f32 / n as f32;
        let x = from.x as f32 + (to.x - from.x) as f32 * t;
        let y = from.y as f32 + (to.y - from.y) as f32 * t;
        let cell = match grid {
            GridType::Hex => hex_round(x, y),
            GridType::Square => Position::new(x.round() as i32, y.round() as i32),
        };
        results.push(cell);
    }
    results
}

/// Round a fractional axial coordinate to the nearest hex
fn hex_round(q: f32, r: f32) -> Position {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    Position::new(rq as i32, rr as i32)
}
