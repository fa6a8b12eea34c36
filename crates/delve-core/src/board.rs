//! Board occupancy grid.
//!
//! A cell holds 0 while uncarved; the first carve stamps it with the
//! next value of a strictly increasing counter. Stamps are never reset
//! or reused within a pass, so they record the order in which the level
//! was dug, for tracing only, never for cost.

use serde::{Deserialize, Serialize};

use crate::registry::RoomRegistry;
use crate::Cell;

/// Square occupancy grid of carve-order stamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    size: i32,
    cells: Vec<Vec<u32>>,
    next_stamp: u32,
}

impl Board {
    /// Create an all-uncarved board of `size x size` cells.
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0);
        Self {
            size,
            cells: vec![vec![0; size as usize]; size as usize],
            next_stamp: 0,
        }
    }

    /// Board edge length in cells.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// True if the cell lies within `[0, size) x [0, size)`.
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.0 >= 0 && cell.0 < self.size && cell.1 >= 0 && cell.1 < self.size
    }

    /// Carve-order stamp at a cell; 0 means uncarved. Out-of-bounds reads 0.
    pub fn stamp(&self, cell: Cell) -> u32 {
        if !self.in_bounds(cell) {
            return 0;
        }
        self.cells[cell.0 as usize][cell.1 as usize]
    }

    /// True if the cell has been carved (traversable).
    pub fn is_carved(&self, cell: Cell) -> bool {
        self.stamp(cell) > 0
    }

    /// Stamp a cell with the next carve-order value.
    ///
    /// A cell already carved keeps its original stamp; the counter still
    /// advances only on a fresh carve.
    pub fn carve(&mut self, cell: Cell) {
        if !self.in_bounds(cell) {
            return;
        }
        let slot = &mut self.cells[cell.0 as usize][cell.1 as usize];
        if *slot == 0 {
            self.next_stamp += 1;
            *slot = self.next_stamp;
        }
    }

    /// Number of carved cells.
    pub fn carved_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|col| col.iter())
            .filter(|&&s| s > 0)
            .count()
    }

    /// All carved cells, column-major (x outer, y inner), the order the
    /// instantiator walks the board in.
    pub fn carved_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for x in 0..self.size {
            for y in 0..self.size {
                if self.cells[x as usize][y as usize] > 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Debug rendering: `#` room interior, `.` corridor, space uncarved.
    /// Row 0 prints last so north is up.
    pub fn render_ascii(&self, registry: &RoomRegistry) -> String {
        let mut out = String::with_capacity((self.size as usize + 1) * self.size as usize);
        for y in (0..self.size).rev() {
            for x in 0..self.size {
                let cell = (x, y);
                let ch = if !self.is_carved(cell) {
                    ' '
                } else if registry.is_room_tile(cell) {
                    '#'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
