//! Spatial utilities: grid topology, distances, walls and line of sight
//!
//! Positions are plain integer cells. Whether two cells are adjacent (and so
//! how far apart they are) depends on the session's `GridType`.

pub mod grid;
pub mod pathfinding;
pub mod walls;

pub use grid::{cell_distance, line_between, GridType, Position, PositionKey};
pub use pathfinding::{find_path, path_length, step_toward};
pub use walls::WallMap;
