//! Corridor pathfinding.
//!
//! Uniform-cost search over 4-directional adjacency with an A*-style
//! Manhattan heuristic and a small random jitter on each priority.
//! Stepping into an already-carved cell costs 0.1, into an uncarved cell
//! 1.0, so corridors snap onto existing dug space and merge instead of
//! running parallel. The jitter (bounded by the `variation` setting)
//! turns straight hallways into reproducible winding ones.
//!
//! Cells inside a foreign room (any room other than the connection's
//! endpoints) are never enqueued. Ties in priority resolve to the
//! first-enqueued entry, which keeps the search deterministic for a
//! fixed random stream.

use hashbrown::HashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::board::Board;
use crate::registry::RoomRegistry;
use crate::{manhattan, Cell, DIRECTIONS, GenRng};

/// Step cost into a cell that is already carved.
const CARVED_STEP_COST: f32 = 0.1;
/// Step cost into an uncarved cell.
const UNCARVED_STEP_COST: f32 = 1.0;

/// Frontier entry ordered as a min-heap on (priority, insertion order).
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    priority: f32,
    order: u64,
    cell: Cell,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert so the smallest priority pops
        // first, and among equals the earliest-enqueued entry wins.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Find the lowest-cost cell path from `start` to `goal`.
///
/// `endpoint_rooms` are registry indices whose interiors stay traversable;
/// every other room interior is impassable. The search stops the moment
/// the goal is dequeued. If the frontier drains first, reconstruction
/// walks the predecessor map as far back as it reaches and returns that
/// partial path with a warning instead of an error.
pub fn find_path(
    board: &Board,
    registry: &RoomRegistry,
    endpoint_rooms: &[usize],
    start: Cell,
    goal: Cell,
    variation: f32,
    rng: &mut GenRng,
) -> Vec<Cell> {
    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut cost: HashMap<Cell, f32> = HashMap::new();
    let mut order = 0u64;

    frontier.push(FrontierEntry {
        priority: 0.0,
        order,
        cell: start,
    });
    cost.insert(start, 0.0);

    while let Some(entry) = frontier.pop() {
        let current = entry.cell;
        if current == goal {
            break;
        }

        for dir in DIRECTIONS {
            let next = (current.0 + dir.0, current.1 + dir.1);
            if !board.in_bounds(next) {
                continue;
            }

            let in_endpoint = endpoint_rooms
                .iter()
                .any(|&idx| registry.rooms()[idx].contains(next));
            if !in_endpoint && registry.is_room_tile(next) {
                // Foreign room interior: pruned outright
                continue;
            }

            let step = if board.is_carved(next) {
                CARVED_STEP_COST
            } else {
                UNCARVED_STEP_COST
            };
            let next_cost = cost[&current] + step;
            if cost.get(&next).is_none_or(|&known| next_cost < known) {
                cost.insert(next, next_cost);
                let priority =
                    next_cost + manhattan(next, goal) as f32 + rng.uniform(variation);
                order += 1;
                frontier.push(FrontierEntry {
                    priority,
                    order,
                    cell: next,
                });
                came_from.insert(next, current);
            }
        }
    }

    reconstruct(start, goal, &came_from)
}

/// Walk the predecessor map backward from `goal` toward `start`.
fn reconstruct(start: Cell, goal: Cell, came_from: &HashMap<Cell, Cell>) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => {
                log::warn!(
                    "path reconstruction stalled at {current:?}; returning partial path \
                     from {start:?} toward {goal:?}"
                );
                break;
            }
        }
    }
    path.push(start);
    path.reverse();
    path
}

/// Stamp a path into the board. Cells that are already carved or sit
/// inside a room keep their stamps; everything else becomes corridor.
pub fn carve_path(board: &mut Board, registry: &RoomRegistry, path: &[Cell]) {
    for &cell in path {
        if !board.is_carved(cell) && !registry.is_room_tile(cell) {
            board.carve(cell);
        }
    }
}
