//! Placed rooms and the room registry.
//!
//! The registry owns every [`PlacedRoom`] for the current pass plus a
//! tile-membership cache rebuilt once after placement, giving O(1)
//! "is this cell inside any room" tests during pathfinding and
//! instantiation. Rooms are referred to by index; nothing holds a
//! reference back into the registry.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::catalog::{EdgeDirection, RoomTemplate};
use crate::spawn::ObjectHandle;
use crate::{manhattan, Cell};

/// A room placed on the board.
///
/// Position and size are fixed at placement; only `connection_count`
/// mutates afterwards, and only through the connectivity builder and
/// edge router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedRoom {
    /// Grid-cell origin (lowest x/y corner).
    pub position: Cell,
    /// Footprint in cells.
    pub size: (i32, i32),
    /// Interior center, integer division.
    pub center: Cell,
    /// Handle of the materialized room object, if any.
    pub handle: Option<ObjectHandle>,
    /// Corridors attached so far.
    pub connection_count: u32,
    /// Dead-end room: accepts at most one connection.
    pub single_connection_only: bool,
    /// Routed to a board edge after interior connectivity.
    pub connect_to_edge: bool,
    /// Edge preference for routing.
    pub edge_direction: EdgeDirection,
    /// Placed by the guaranteed-spawn pass.
    pub guaranteed: bool,
}

impl PlacedRoom {
    /// Build a room from a template at a board position.
    pub fn from_template(template: &RoomTemplate, position: Cell) -> Self {
        Self {
            position,
            size: (template.width, template.height),
            center: (
                position.0 + template.width / 2,
                position.1 + template.height / 2,
            ),
            handle: None,
            connection_count: 0,
            single_connection_only: template.single_connection_only,
            connect_to_edge: template.connect_to_edge,
            edge_direction: template.edge_direction,
            guaranteed: template.guaranteed_spawn,
        }
    }

    /// True if this room's padded box intersects the given padded box.
    pub fn overlaps(&self, other_pos: Cell, other_size: (i32, i32), spacing: i32) -> bool {
        !(self.position.0 - spacing >= other_pos.0 + other_size.0
            || other_pos.0 - spacing >= self.position.0 + self.size.0
            || self.position.1 - spacing >= other_pos.1 + other_size.1
            || other_pos.1 - spacing >= self.position.1 + self.size.1)
    }

    /// True if the cell lies in the room interior.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.0 >= self.position.0
            && cell.0 < self.position.0 + self.size.0
            && cell.1 >= self.position.1
            && cell.1 < self.position.1 + self.size.1
    }

    /// A `single_connection_only` room accepts only while unconnected.
    pub fn can_accept_connection(&self) -> bool {
        !self.single_connection_only || self.connection_count == 0
    }

    /// Record one attached corridor.
    pub fn add_connection(&mut self) {
        self.connection_count += 1;
    }

    /// True if this room connects only to a board edge, never interior.
    pub fn is_edge_only(&self) -> bool {
        self.connect_to_edge && self.single_connection_only
    }

    /// Boundary cell of this room closest to `target` by Manhattan
    /// distance. Edge-only rooms instead answer with the center of the
    /// wall facing the target, so their single corridor leaves cleanly.
    pub fn closest_edge_point(&self, target: Cell) -> Cell {
        if self.is_edge_only() {
            return self.wall_center_point(target);
        }
        let mut best = self.center;
        let mut best_dist = i32::MAX;
        for x in self.position.0..self.position.0 + self.size.0 {
            for y in self.position.1..self.position.1 + self.size.1 {
                let on_edge = x == self.position.0
                    || x == self.position.0 + self.size.0 - 1
                    || y == self.position.1
                    || y == self.position.1 + self.size.1 - 1;
                if !on_edge {
                    continue;
                }
                let dist = manhattan((x, y), target);
                if dist < best_dist {
                    best_dist = dist;
                    best = (x, y);
                }
            }
        }
        best
    }

    /// Center cell of the wall facing `target`.
    pub fn wall_center_point(&self, target: Cell) -> Cell {
        let diff = (target.0 - self.center.0, target.1 - self.center.1);
        if diff.0.abs() > diff.1.abs() {
            if diff.0 > 0 {
                (self.position.0 + self.size.0 - 1, self.center.1)
            } else {
                (self.position.0, self.center.1)
            }
        } else if diff.1 > 0 {
            (self.center.0, self.position.1 + self.size.1 - 1)
        } else {
            (self.center.0, self.position.1)
        }
    }
}

/// Owner of all placed rooms and the derived tile-membership cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomRegistry {
    rooms: Vec<PlacedRoom>,
    tile_cache: HashSet<Cell>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All placed rooms, in placement order.
    pub fn rooms(&self) -> &[PlacedRoom] {
        &self.rooms
    }

    /// Mutable access for connection-count updates.
    pub fn rooms_mut(&mut self) -> &mut [PlacedRoom] {
        &mut self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Add a room; the tile cache is stale until the next rebuild.
    pub fn push(&mut self, room: PlacedRoom) {
        self.rooms.push(room);
    }

    /// True if a placement at `pos`/`size` would violate the padded
    /// bounding-box invariant against any existing room.
    pub fn collides(&self, pos: Cell, size: (i32, i32), spacing: i32) -> bool {
        self.rooms
            .iter()
            .any(|room| room.overlaps(pos, size, spacing))
    }

    /// Rebuild the tile-membership cache from the current room set.
    /// Called once after placement finishes.
    pub fn rebuild_tile_cache(&mut self) {
        self.tile_cache.clear();
        for room in &self.rooms {
            for x in room.position.0..room.position.0 + room.size.0 {
                for y in room.position.1..room.position.1 + room.size.1 {
                    self.tile_cache.insert((x, y));
                }
            }
        }
    }

    /// O(1) test: does any room's interior cover this cell?
    pub fn is_room_tile(&self, cell: Cell) -> bool {
        self.tile_cache.contains(&cell)
    }

    /// Drop all rooms and the cache (start of a fresh pass).
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.tile_cache.clear();
    }
}
