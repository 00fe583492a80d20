//! Random Grid Layout
//!
//! Produces the initial arrangement for a phrase: letters are shuffled and
//! packed into a centered sub-grid of the container, each nudged by a small
//! random offset so the result does not look rigid.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Layout, TileState};
use crate::geometry::{Coords, Point};

/// Grid cell geometry used for random placement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Edge length of one grid cell in pixels
    pub cell_edge: i32,
    /// Edge length of a rendered tile; the jitter keeps a tile inside its cell
    pub tile_edge: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_edge: 120,
            tile_edge: 80,
        }
    }
}

impl GridConfig {
    /// Maximum per-axis jitter (exclusive)
    #[must_use]
    pub fn jitter_span(&self) -> i32 {
        (self.cell_edge - self.tile_edge).max(0)
    }
}

/// Size of the occupied sub-grid, in cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    /// Columns
    pub cols: usize,
    /// Rows
    pub rows: usize,
}

impl GridSize {
    /// Number of cells
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }

    /// Scale a container grid down to the smallest block that holds `count`
    ///
    /// Both axes shrink by the same ratio. Flooring can leave the block short,
    /// in which case the larger container axis grows by one (rows on a tie),
    /// then the other axis if it is still short.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn fit(count: usize, grid_width: usize, grid_height: usize) -> Self {
        let grid_width = grid_width.max(1);
        let grid_height = grid_height.max(1);
        let ratio = (count as f64 / (grid_width * grid_height) as f64).sqrt();
        let mut size = Self {
            cols: (ratio * grid_width as f64).floor() as usize,
            rows: (ratio * grid_height as f64).floor() as usize,
        };
        let wide = grid_width > grid_height;
        if size.capacity() < count {
            if wide {
                size.cols += 1;
            } else {
                size.rows += 1;
            }
        }
        if size.capacity() < count {
            if wide {
                size.rows += 1;
            } else {
                size.cols += 1;
            }
        }
        size
    }
}

/// Letters of a phrase with whitespace removed
#[must_use]
pub fn phrase_letters(phrase: &str) -> Vec<char> {
    phrase.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Build a random layout for `phrase` inside the container behind `coords`
///
/// The layout's bounding box is the container's current box and it holds
/// exactly one tile per non-whitespace character.
///
/// # Panics
///
/// Panics if the number of placed letters differs from the number of input
/// letters, which would mean the grid sizing is broken.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn random_layout<R: Rng + ?Sized>(
    phrase: &str,
    coords: &Coords,
    grid: &GridConfig,
    rng: &mut R,
) -> Layout {
    let mut letters = phrase_letters(phrase);
    letters.shuffle(rng);

    let rect = coords.bounding_box();
    let cell = grid.cell_edge.max(1);
    let grid_width = (rect.width() / cell).max(0) as usize;
    let grid_height = (rect.height() / cell).max(0) as usize;
    let size = GridSize::fit(letters.len(), grid_width, grid_height);

    let start_col = (grid_width.max(1) as i64 - size.cols as i64).div_euclid(2);
    let start_row = (grid_height.max(1) as i64 - size.rows as i64).div_euclid(2);
    let span = grid.jitter_span();

    let mut states = Vec::with_capacity(letters.len());
    for (index, value) in letters.iter().copied().enumerate().take(size.capacity()) {
        let row = (index / size.cols) as i64;
        let col = (index % size.cols) as i64;
        let (dx, dy) = if span > 0 {
            (rng.gen_range(0..span), rng.gen_range(0..span))
        } else {
            (0, 0)
        };
        let position = Point::new(
            ((start_col + col) * i64::from(cell)) as i32 + dx,
            ((start_row + row) * i64::from(cell)) as i32 + dy,
        );
        states.push(TileState::new(value, position));
    }

    if states.len() != letters.len() {
        tracing::error!(
            placed = states.len(),
            letters = letters.len(),
            cols = size.cols,
            rows = size.rows,
            "Random layout dropped letters"
        );
        panic!("random_layout: layout invariant violated");
    }

    tracing::debug!(
        letters = states.len(),
        cols = size.cols,
        rows = size.rows,
        "Generated random layout"
    );

    Layout::new(rect, states)
}
