//! delve-core: seeded room-and-corridor level generator
//!
//! Places weighted, variable-size room templates on a bounded integer
//! board, connects every room into a single reachable graph with
//! cost-biased corridors, optionally routes rooms to the board edges,
//! scatters collectible markers, and buckets every materialized object
//! into a coarse spatial index for proximity queries.
//!
//! The crate is pure logic: the only side effects are `log` records and
//! calls into a caller-supplied [`Materializer`]. One full generation
//! pass runs to completion on the calling thread; all state is rebuilt
//! from scratch on every pass.

pub mod board;
pub mod catalog;
pub mod config;
pub mod connect;
pub mod generator;
pub mod path;
pub mod placer;
pub mod registry;
pub mod spatial;
pub mod spawn;
pub mod stats;

mod rng;

pub use board::Board;
pub use catalog::{EdgeDirection, RoomTemplate};
pub use config::{ConfigError, GenConfig};
pub use generator::Generator;
pub use registry::{PlacedRoom, RoomRegistry};
pub use rng::GenRng;
pub use spatial::{SpatialEntry, SpatialIndex};
pub use spawn::{Materializer, ObjectHandle, ObjectKind, RecordingMaterializer, Transform};
pub use stats::GenerationStats;

/// Grid cell coordinate, signed so neighbor arithmetic never underflows.
pub type Cell = (i32, i32);

/// 4-directional grid adjacency, in expansion order.
pub const DIRECTIONS: [Cell; 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Manhattan distance between two cells.
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan((0, 0), (3, 4)), 7);
        assert_eq!(manhattan((3, 4), (0, 0)), 7);
        assert_eq!(manhattan((-2, 1), (2, -1)), 6);
        assert_eq!(manhattan((5, 5), (5, 5)), 0);
    }
}
