//! Best-first search over the tile grid toward a predicate-defined goal.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::map::{ResourceKind, Tile, TileGrid, TilePos, DIRECTIONS};

/// Finds the step-by-step path from `start` (exclusive) to the nearest
/// tile satisfying `is_goal`, over the 8-connected grid with unit step
/// cost and a Manhattan heuristic anchored on `start`.
///
/// The predicate is evaluated when a cell is popped from the frontier,
/// so the first satisfying pop terminates the search. Returns
/// `Some(vec![])` when `start` itself satisfies the predicate (the
/// caller is already there) and `None` when no satisfying tile is
/// reachable. The two outcomes are deliberately distinct.
pub fn find_path<F>(grid: &TileGrid, start: TilePos, mut is_goal: F) -> Option<Vec<TilePos>>
where
    F: FnMut(TilePos, &Tile) -> bool,
{
    assert!(grid.in_bounds(start), "path search from outside the map: {start:?}");

    // Ties in priority are broken by insertion order.
    let mut open: BinaryHeap<Reverse<(i32, u64, TilePos)>> = BinaryHeap::new();
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut cost_so_far: HashMap<TilePos, i32> = HashMap::new();
    let mut sequence: u64 = 0;

    cost_so_far.insert(start, 0);
    open.push(Reverse((0, sequence, start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if is_goal(current, grid.tile(current)) {
            return Some(reconstruct(&came_from, current));
        }

        let current_cost = cost_so_far[&current];
        for (dx, dy) in DIRECTIONS {
            let next = TilePos::new(current.x + dx, current.y + dy);
            if !grid.in_bounds(next) {
                continue;
            }
            let new_cost = current_cost + 1;
            if cost_so_far.get(&next).map_or(true, |&known| new_cost < known) {
                cost_so_far.insert(next, new_cost);
                sequence += 1;
                open.push(Reverse((new_cost + next.manhattan(start), sequence, next)));
                came_from.insert(next, current);
            }
        }
    }

    None
}

/// Goal predicate matching any tile that carries `kind`.
pub fn resource_goal(kind: ResourceKind) -> impl FnMut(TilePos, &Tile) -> bool {
    move |_, tile| tile.resource == Some(kind)
}

fn reconstruct(came_from: &HashMap<TilePos, TilePos>, goal: TilePos) -> Vec<TilePos> {
    let mut path = Vec::new();
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(current);
        current = previous;
    }
    path.reverse();
    path
}
