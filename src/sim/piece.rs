//! Procedural piece generation
//!
//! A piece is a connected cluster grown by a random walk from a local
//! origin. Each attempt either yields a piece that fits the well and can be
//! reached by the player, or is discarded. Attempts are bounded; when they
//! run out the caller leaves the stuck timer running.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Block;
use super::well::Well;
use crate::consts::*;

/// Walk directions: right, up, left, down
const DIRECTIONS: [IVec2; 4] = [IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y];

/// Difficulty scalar: the most cells a piece may have at this score
pub fn level_for_score(score: i32) -> i32 {
    4 + score / 10
}

/// Tallest cluster the player can still get over with `jumps` jumps
pub fn max_cluster_height(jumps: u32) -> i32 {
    2 * jumps as i32
}

/// Highest stack a piece of `height` rows may be dropped onto
pub fn spawn_row_limit(score: i32, jumps: u32, height: i32) -> i32 {
    (score + 1 + 2 * (jumps as i32 - 1) - height).max(0)
}

/// Tile variant and palette index shared by all cells of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceStyle {
    pub shape: u8,
    pub color: u8,
}

impl PieceStyle {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            shape: rng.random_range(0..SHAPE_COUNT),
            color: rng.random_range(1..COLOR_COUNT),
        }
    }
}

/// Cells of a cluster in local coordinates with their bounding box
///
/// Bounds are half-open: cells span `left..right` and `bottom..top`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub cells: Vec<IVec2>,
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
    pub top: i32,
}

impl Cluster {
    /// A lone cell at the local origin
    pub fn single() -> Self {
        Self {
            cells: vec![IVec2::ZERO],
            left: 0,
            right: 1,
            bottom: 0,
            top: 1,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.top - self.bottom
    }

    fn height_with(&self, cell: IVec2) -> i32 {
        self.top.max(cell.y + 1) - self.bottom.min(cell.y)
    }

    fn add(&mut self, cell: IVec2) {
        self.left = self.left.min(cell.x);
        self.right = self.right.max(cell.x + 1);
        self.bottom = self.bottom.min(cell.y);
        self.top = self.top.max(cell.y + 1);
        self.cells.push(cell);
    }
}

/// Grow a connected cluster of `num_cells` cells no taller than `max_height`
///
/// The walker moves one step in a random direction each iteration. Vertical
/// steps that would make the cluster too tall are rejected in place; steps
/// onto a cell the cluster already has move the walker without adding a cell.
pub fn grow_cluster(rng: &mut impl Rng, num_cells: usize, max_height: i32) -> Cluster {
    let mut cluster = Cluster::single();
    let mut cursor = IVec2::ZERO;
    while cluster.cells.len() < num_cells {
        let step = DIRECTIONS[rng.random_range(0..DIRECTIONS.len())];
        let next = cursor + step;
        if step.y != 0 && cluster.height_with(next) > max_height {
            continue;
        }
        cursor = next;
        if cluster.cells.contains(&next) {
            continue;
        }
        cluster.add(next);
    }
    cluster
}

/// Find the left column for a cluster of `width` whose columns all sit at or
/// below `max_y`
///
/// Starts at a random offset and rotates through the legal offsets; the
/// first fit in rotation order wins so spawns spread across the well.
pub fn find_spawn_column(rng: &mut impl Rng, well: &Well, width: i32, max_y: i32) -> Option<i32> {
    let spawn_width = WELL_WIDTH - width + 1;
    if spawn_width <= 0 {
        return None;
    }
    let start = rng.random_range(0..spawn_width);
    (0..WELL_WIDTH)
        .map(|retry| (start + retry) % spawn_width)
        .find(|&left| well.span_fits(left, width, max_y))
}

/// A piece ready to fall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub blocks: Vec<Block>,
    /// Leftmost well column covered
    pub column: i32,
    pub width: i32,
    pub height: i32,
    /// Stack limit the piece was validated against
    pub max_y: i32,
}

/// One generation attempt
///
/// Returns `None` when the cluster is too wide for the well or no column
/// run is low enough. On success the blocks are placed above the camera
/// at `scroll`.
pub fn try_generate_piece(
    rng: &mut impl Rng,
    well: &Well,
    style: PieceStyle,
    score: i32,
    jumps: u32,
    scroll: f32,
) -> Option<Piece> {
    let level = level_for_score(score);
    let num_cells = rng.random_range(1..=level) as usize;
    let cluster = grow_cluster(rng, num_cells, max_cluster_height(jumps));
    place_cluster(rng, well, &cluster, style, score, jumps, scroll)
}

/// Validate a cluster against the well and translate it into well space
pub fn place_cluster(
    rng: &mut impl Rng,
    well: &Well,
    cluster: &Cluster,
    style: PieceStyle,
    score: i32,
    jumps: u32,
    scroll: f32,
) -> Option<Piece> {
    if cluster.width() > WELL_WIDTH - SPAWN_WIDTH_MARGIN {
        return None;
    }

    let height = cluster.height();
    let max_y = spawn_row_limit(score, jumps, height);
    let column = find_spawn_column(rng, well, cluster.width(), max_y)?;

    let lift = scroll + VIEW_HALF as f32 + height as f32;
    let blocks = cluster
        .cells
        .iter()
        .map(|cell| {
            Block::new(
                cell.x - cluster.left + column,
                cell.y as f32 + lift,
                style.shape,
                style.color,
            )
        })
        .collect();

    Some(Piece {
        blocks,
        column,
        width: cluster.width(),
        height,
        max_y,
    })
}

/// Up to `SPAWN_ATTEMPTS` generation attempts sharing one style
pub fn generate_piece(
    rng: &mut impl Rng,
    well: &Well,
    score: i32,
    jumps: u32,
    scroll: f32,
) -> Option<Piece> {
    let style = PieceStyle::random(rng);
    (0..SPAWN_ATTEMPTS).find_map(|_| try_generate_piece(rng, well, style, score, jumps, scroll))
}
