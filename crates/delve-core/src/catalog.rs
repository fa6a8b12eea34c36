//! Room templates and weighted selection.
//!
//! A catalog is a list of [`RoomTemplate`]s; the placer draws from it by
//! weight. Templates are immutable after load.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::GenRng;

/// Board edge a room can be routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum EdgeDirection {
    /// No preference; the router picks an edge at random.
    #[default]
    None,
    North,
    South,
    East,
    West,
}

impl EdgeDirection {
    /// The four concrete edges, in declaration order.
    pub fn cardinal() -> impl Iterator<Item = EdgeDirection> {
        EdgeDirection::iter().filter(|e| *e != EdgeDirection::None)
    }
}

/// A placeable room shape with selection weight and constraint flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Display name, used in logs.
    pub name: String,
    /// Footprint width in board cells.
    pub width: i32,
    /// Footprint height in board cells.
    pub height: i32,
    /// Weighted-selection weight; must be positive.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Place exactly one instance before weighted placement begins.
    #[serde(default)]
    pub guaranteed_spawn: bool,
    /// Dead-end room: accepts at most one corridor connection.
    #[serde(default)]
    pub single_connection_only: bool,
    /// Route this room to a board edge after interior connectivity.
    #[serde(default)]
    pub connect_to_edge: bool,
    /// Which edge to route to; `None` means choose randomly.
    #[serde(default)]
    pub edge_direction: EdgeDirection,
}

fn default_weight() -> u32 {
    1
}

impl RoomTemplate {
    /// Create an ordinary template with weight 1 and no constraints.
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            weight: 1,
            guaranteed_spawn: false,
            single_connection_only: false,
            connect_to_edge: false,
            edge_direction: EdgeDirection::None,
        }
    }

    /// Footprint area in cells.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Pick a template by weighted random selection.
///
/// Draws a uniform integer in `[0, total_weight)` and walks the candidate
/// list accumulating weights; the first candidate whose cumulative weight
/// exceeds the draw wins. Guaranteed templates whose index is in
/// `exclude` (already placed in the guaranteed pass) are not candidates;
/// guaranteed templates that failed that pass remain eligible.
///
/// Returns `None` if no candidate remains or the candidate weights sum
/// to zero.
pub fn pick_weighted(
    templates: &[RoomTemplate],
    exclude: &[bool],
    rng: &mut GenRng,
) -> Option<usize> {
    debug_assert_eq!(templates.len(), exclude.len());

    let total: u64 = templates
        .iter()
        .zip(exclude)
        .filter(|&(_, &excluded)| !excluded)
        .map(|(t, _)| t.weight as u64)
        .sum();
    if total == 0 {
        return None;
    }

    let draw = rng.rn2(total as u32) as u64;
    let mut cumulative = 0u64;
    for (idx, template) in templates.iter().enumerate() {
        if exclude[idx] {
            continue;
        }
        cumulative += template.weight as u64;
        if draw < cumulative {
            return Some(idx);
        }
    }
    None
}
