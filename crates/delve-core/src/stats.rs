//! Per-pass generation statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Summary of one completed generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Seed the pass ran with.
    pub seed: u64,
    /// Rooms placed (guaranteed and weighted).
    pub rooms_placed: usize,
    /// Of those, rooms placed from guaranteed templates.
    pub guaranteed_rooms_placed: u32,
    /// Corridor-tile objects materialized.
    pub corridor_tiles: usize,
    /// Markers scattered.
    pub markers_placed: usize,
    /// Links that needed the single-connection relaxation.
    pub relaxed_connections: u32,
    /// Wall-clock duration of the pass.
    pub generation_time: Duration,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed {}: {} rooms ({} guaranteed), {} corridor tiles, {} markers, \
             {} relaxed links, {:.2?}",
            self.seed,
            self.rooms_placed,
            self.guaranteed_rooms_placed,
            self.corridor_tiles,
            self.markers_placed,
            self.relaxed_connections,
            self.generation_time,
        )
    }
}
