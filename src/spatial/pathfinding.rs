//! A* pathfinding over the wall map
//!
//! Every step costs one cell. Occupied cells may be passed in as extra
//! obstacles; the goal cell itself is always allowed so callers can path
//! toward an occupied target and stop short of it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use ahash::AHashSet;

use crate::spatial::grid::{cell_distance, GridType, Position};
use crate::spatial::walls::WallMap;

/// Node in the A* open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    pos: Position,
    f_cost: u32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; coordinates break ties so runs are reproducible
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.pos.x.cmp(&self.pos.x))
            .then_with(|| other.pos.y.cmp(&self.pos.y))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest path using A*
///
/// Returns the full path including `start` and `goal`, or None if the goal is
/// unreachable.
pub fn find_path(
    walls: &WallMap,
    start: Position,
    goal: Position,
    grid: GridType,
    blocked: &AHashSet<Position>,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !walls.is_passable(goal) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_scores: HashMap<Position, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        pos: start,
        f_cost: cell_distance(start, goal, grid),
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, current.pos));
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&u32::MAX);

        for neighbor in current.pos.neighbors(grid) {
            if !walls.is_passable(neighbor) {
                continue;
            }
            if neighbor != goal && blocked.contains(&neighbor) {
                continue;
            }

            let tentative_g = current_g.saturating_add(1);
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    pos: neighbor,
                    f_cost: tentative_g + cell_distance(neighbor, goal, grid),
                });
            }
        }
    }

    None
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &HashMap<Position, Position>, mut current: Position) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Number of steps on the shortest wall-avoiding path, ignoring occupancy
pub fn path_length(walls: &WallMap, from: Position, to: Position, grid: GridType) -> Option<u32> {
    find_path(walls, from, to, grid, &AHashSet::new()).map(|p| (p.len() - 1) as u32)
}

/// Walk up to `max_steps` cells along a shortest path toward `target`
///
/// Stops as soon as the walker is within `stop_within` cells of the target and
/// never ends on a blocked cell. Returns `from` when no progress is possible.
pub fn step_toward(
    walls: &WallMap,
    from: Position,
    target: Position,
    max_steps: u32,
    stop_within: u32,
    grid: GridType,
    blocked: &AHashSet<Position>,
) -> Position {
    if cell_distance(from, target, grid) <= stop_within {
        return from;
    }

    let Some(path) = find_path(walls, from, target, grid, blocked) else {
        return from;
    };

    let mut reached = from;
    for pos in path.iter().skip(1).take(max_steps as usize) {
        if !blocked.contains(pos) {
            reached = *pos;
        }
        if cell_distance(*pos, target, grid) <= stop_within {
            break;
        }
    }

    if blocked.contains(&reached) {
        from
    } else {
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathfind_straight_line() {
        let walls = WallMap::new(10, 10);
        let start = Position::new(0, 0);
        let goal = Position::new(5, 0);

        let path = find_path(&walls, start, goal, GridType::Hex, &AHashSet::new())
            .expect("open board has a path");
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_pathfind_around_wall() {
        let mut walls = WallMap::new(10, 10);
        walls.add_wall(Position::new(2, 0));
        walls.add_wall(Position::new(3, 0));

        let path = find_path(
            &walls,
            Position::new(0, 0),
            Position::new(5, 0),
            GridType::Square,
            &AHashSet::new(),
        )
        .expect("path exists around the wall");
        assert!(!path.contains(&Position::new(2, 0)));
        assert!(!path.contains(&Position::new(3, 0)));
    }

    #[test]
    fn test_pathfind_no_path() {
        let mut walls = WallMap::new(10, 10);
        let goal = Position::new(5, 5);
        for n in goal.neighbors(GridType::Hex) {
            walls.add_wall(n);
        }
        assert!(path_length(&walls, Position::new(0, 0), goal, GridType::Hex).is_none());
    }

    #[test]
    fn test_path_length_matches_distance_on_open_board() {
        let walls = WallMap::new(20, 20);
        let from = Position::new(2, 2);
        let to = Position::new(9, 4);
        assert_eq!(
            path_length(&walls, from, to, GridType::Square),
            Some(cell_distance(from, to, GridType::Square))
        );
    }

    #[test]
    fn test_step_toward_respects_budget_and_stop_distance() {
        let walls = WallMap::new(20, 20);
        let from = Position::new(0, 0);
        let target = Position::new(10, 0);

        let after = step_toward(&walls, from, target, 4, 1, GridType::Square, &AHashSet::new());
        assert_eq!(cell_distance(from, after, GridType::Square), 4);

        let near = Position::new(8, 0);
        let after = step_toward(&walls, near, target, 4, 1, GridType::Square, &AHashSet::new());
        assert_eq!(cell_distance(after, target, GridType::Square), 1);
    }

    #[test]
    fn test_step_toward_never_ends_on_blocked_cell() {
        let walls = WallMap::new(20, 20);
        let from = Position::new(0, 0);
        let target = Position::new(3, 0);
        let mut blocked = AHashSet::new();
        blocked.insert(target);

        let after = step_toward(&walls, from, target, 5, 0, GridType::Square, &blocked);
        assert_ne!(after, target);
    }
}
