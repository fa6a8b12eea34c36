//! Object materialization.
//!
//! The generator never touches a scene graph itself: it asks a
//! caller-supplied [`Materializer`] to instantiate or destroy objects
//! and only keeps opaque handles. World mapping is cell-centered:
//! grid `(x, y)` lands at `(x*tile + tile/2, 0, y*tile + tile/2)`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::registry::RoomRegistry;
use crate::{Cell, GenRng};

/// What kind of object a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Room,
    CorridorTile,
    Marker,
}

/// Opaque identity of a materialized object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

/// World-space placement for a materialized object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position (x, y, z); the board plane is xz.
    pub position: [f32; 3],
    /// Rotation around the world y axis, degrees.
    pub yaw_degrees: f32,
    /// Per-axis scale.
    pub scale: [f32; 3],
}

impl Transform {
    /// Identity scale and rotation at a position.
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            yaw_degrees: 0.0,
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// External collaborator that owns the actual scene objects.
///
/// `destroy` must tolerate handles that are already gone; the index is
/// rebuilt wholesale rather than diffed, so stale handles can outlive
/// their objects briefly.
pub trait Materializer {
    /// Create an object and return its handle.
    fn instantiate(&mut self, kind: ObjectKind, transform: Transform) -> ObjectHandle;

    /// Release an object.
    fn destroy(&mut self, handle: ObjectHandle);

    /// True while the object behind the handle exists.
    fn is_alive(&self, handle: ObjectHandle) -> bool;
}

/// In-memory materializer for tests and headless runs: records every
/// instantiation and tracks liveness.
#[derive(Debug, Default, Clone)]
pub struct RecordingMaterializer {
    next_id: u64,
    live: HashMap<ObjectHandle, (ObjectKind, Transform)>,
}

impl RecordingMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects of a kind.
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.live.values().filter(|(k, _)| *k == kind).count()
    }

    /// Transform of a live object.
    pub fn transform(&self, handle: ObjectHandle) -> Option<&Transform> {
        self.live.get(&handle).map(|(_, t)| t)
    }
}

impl Materializer for RecordingMaterializer {
    fn instantiate(&mut self, kind: ObjectKind, transform: Transform) -> ObjectHandle {
        self.next_id += 1;
        let handle = ObjectHandle(self.next_id);
        self.live.insert(handle, (kind, transform));
        handle
    }

    fn destroy(&mut self, handle: ObjectHandle) {
        self.live.remove(&handle);
    }

    fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.live.contains_key(&handle)
    }
}

/// World position of a cell's center on the board plane.
pub fn cell_to_world(cell: Cell, tile_size: f32) -> [f32; 3] {
    [
        cell.0 as f32 * tile_size + tile_size / 2.0,
        0.0,
        cell.1 as f32 * tile_size + tile_size / 2.0,
    ]
}

/// Transform for a placed room: positioned at the footprint's world
/// center, scaled to cover `size x size` tiles (y untouched).
pub fn room_transform(position: Cell, size: (i32, i32), tile_size: f32) -> Transform {
    Transform {
        position: [
            position.0 as f32 * tile_size + size.0 as f32 * tile_size / 2.0,
            0.0,
            position.1 as f32 * tile_size + size.1 as f32 * tile_size / 2.0,
        ],
        yaw_degrees: 0.0,
        scale: [size.0 as f32 * tile_size, 1.0, size.1 as f32 * tile_size],
    }
}

/// Emit one corridor-tile object per carved cell outside any room.
/// Returns the handles with their cells, in board walk order.
pub fn spawn_corridors(
    board: &Board,
    registry: &RoomRegistry,
    tile_size: f32,
    materializer: &mut impl Materializer,
) -> Vec<(ObjectHandle, Cell)> {
    let mut handles = Vec::new();
    for cell in board.carved_cells() {
        if registry.is_room_tile(cell) {
            continue;
        }
        let transform = Transform::at(cell_to_world(cell, tile_size));
        handles.push((
            materializer.instantiate(ObjectKind::CorridorTile, transform),
            cell,
        ));
    }
    handles
}

/// Scatter markers over a random subset of carved tiles.
///
/// Emits `min(marker_count, carved tiles)` markers, each with a random
/// yaw drawn from the generator stream so the layout stays reproducible.
/// Returns the handles with their cells.
pub fn spawn_markers(
    board: &Board,
    marker_count: usize,
    tile_size: f32,
    rng: &mut GenRng,
    materializer: &mut impl Materializer,
) -> Vec<(ObjectHandle, Cell)> {
    let mut tiles = board.carved_cells();
    rng.shuffle(&mut tiles);
    let count = marker_count.min(tiles.len());

    let mut handles = Vec::with_capacity(count);
    for &cell in tiles.iter().take(count) {
        let mut position = cell_to_world(cell, tile_size);
        position[1] = 0.5;
        let transform = Transform {
            position,
            yaw_degrees: rng.uniform(360.0),
            scale: [1.0, 1.0, 1.0],
        };
        handles.push((materializer.instantiate(ObjectKind::Marker, transform), cell));
    }
    handles
}
