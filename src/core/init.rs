//! Board initializer - random fill plus the match scrub
//!
//! Playable cells get random kinds, then every cell still participating
//! in a match is rewritten until none does. Each rewrite excludes the
//! kinds already tried at that cell; once the pool is exhausted the cell
//! is left empty. Every rule-out comes from one of the four orthogonal
//! neighbors, so boards with five or more kinds never exhaust and stay
//! completely full.

use tracing::debug;

use crate::core::grid::Grid;
use crate::core::matching;
use crate::core::rng::SimpleRng;
use crate::types::{Cell, Layout, Point};

/// Build a scrubbed board: random content with no pre-existing match
pub fn initialize(layout: &Layout, kinds: u8, rng: &mut SimpleRng) -> Grid {
    let mut grid = Grid::new(layout);

    // Random fill, row by row
    for y in 0..grid.height() as i8 {
        for x in 0..grid.width() as i8 {
            let p = Point::new(x, y);
            if grid.get(p) == Cell::Empty {
                grid.set(p, Cell::Tile(rng.tile_kind(kinds)));
            }
        }
    }

    scrub(&mut grid, kinds, rng);
    grid
}

/// Rewrite matching cells, column by column, until the board is clean
pub fn scrub(grid: &mut Grid, kinds: u8, rng: &mut SimpleRng) {
    let mut tried = vec![false; kinds as usize];
    let mut rewrites = 0u32;

    for x in 0..grid.width() as i8 {
        for y in 0..grid.height() as i8 {
            let p = Point::new(x, y);
            if !grid.is_tile(p) {
                continue;
            }

            tried.fill(false);
            while !matching::detect(grid, p, true).is_empty() {
                if let Some(kind) = grid.get(p).kind() {
                    tried[(kind.value() - 1) as usize] = true;
                }
                let cell = match rng.tile_kind_excluding(kinds, &tried) {
                    Some(kind) => Cell::Tile(kind),
                    None => Cell::Empty,
                };
                grid.set(p, cell);
                rewrites += 1;

                // An emptied cell cannot match; the loop ends next pass
            }
        }
    }

    if rewrites > 0 {
        debug!(rewrites, "scrubbed initial matches off the board");
    }
}
