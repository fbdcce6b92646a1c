//! The well: landed terrain and per-column stack heights
//!
//! Landed blocks are an append-only log for the whole session. Nothing is
//! ever removed; the camera simply scrolls past old rows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::state::Block;
use crate::consts::WELL_WIDTH;

/// Row occupied by the pre-filled floor
pub const FLOOR_ROW: i32 = 0;

/// Landed terrain of the well
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Well {
    /// Landed blocks in landing order (floor first)
    landed: Vec<Block>,
    /// One past the topmost occupied row of each column
    tops: [i32; WELL_WIDTH as usize],
    /// (column, row) of every landed block for crossing checks
    occupied: BTreeSet<(i32, i32)>,
}

impl Default for Well {
    fn default() -> Self {
        Self::new()
    }
}

impl Well {
    /// Create a well whose floor row is filled across every column
    pub fn new() -> Self {
        let mut well = Self {
            landed: Vec::with_capacity(WELL_WIDTH as usize * 8),
            tops: [FLOOR_ROW; WELL_WIDTH as usize],
            occupied: BTreeSet::new(),
        };
        for x in 0..WELL_WIDTH {
            well.push(Block::new(x, FLOOR_ROW as f32, 0, 0));
        }
        well
    }

    /// Height of the stack in column `x`: one past its topmost landed row
    ///
    /// Columns outside the well report `i32::MAX` so they never admit a piece.
    pub fn top_of_column(&self, x: i32) -> i32 {
        if (0..WELL_WIDTH).contains(&x) {
            self.tops[x as usize]
        } else {
            i32::MAX
        }
    }

    /// Stack heights of every column
    pub fn tops(&self) -> &[i32; WELL_WIDTH as usize] {
        &self.tops
    }

    /// All landed blocks, oldest first
    pub fn landed(&self) -> &[Block] {
        &self.landed
    }

    /// Whether a landed block occupies `row` of column `x`
    pub fn is_occupied(&self, x: i32, row: i32) -> bool {
        self.occupied.contains(&(x, row))
    }

    /// True if every column in `left..left + width` is stacked no higher than `max_y`
    pub fn span_fits(&self, left: i32, width: i32, max_y: i32) -> bool {
        (left..left + width).all(|x| self.top_of_column(x) <= max_y)
    }

    /// How far a block in column `x` that dropped from `from_row` down to
    /// `to_row` must be pushed back up to rest on the stack.
    ///
    /// Scans the rows crossed this tick (`to_row..from_row`) top-down and
    /// returns the deepest overlap, or 0 when nothing was crossed.
    pub fn landing_depth(&self, x: i32, from_row: i32, to_row: i32) -> i32 {
        (to_row..from_row)
            .rev()
            .filter(|&row| self.is_occupied(x, row))
            .map(|row| row - to_row + 1)
            .max()
            .unwrap_or(0)
    }

    /// Merge a landed piece into the stack
    ///
    /// Each block comes to rest at `prev_y + rise`. All blocks are merged in
    /// one step; returns the highest resting row.
    pub fn merge(&mut self, piece: impl IntoIterator<Item = Block>, rise: i32) -> i32 {
        let mut highest = i32::MIN;
        for mut block in piece {
            let row = block.prev_y + rise;
            block.prev_y = row;
            block.y = row as f32;
            highest = highest.max(row);
            self.push(block);
        }
        highest
    }

    fn push(&mut self, block: Block) {
        let row = block.prev_y;
        if let Some(top) = usize::try_from(block.x)
            .ok()
            .and_then(|x| self.tops.get_mut(x))
        {
            *top = (*top).max(row + 1);
        }
        self.occupied.insert((block.x, row));
        self.landed.push(block);
    }
}
