//! Grid module - board cell storage
//!
//! The board is a width x height grid where a cell is a hole, empty, or a
//! tile of some kind. Flat Vec storage in row-major order for cache
//! locality. Coordinates: (x, y) with x 0..width (left to right) and
//! y 0..height (top to bottom). Reads outside the board report
//! `Cell::Hole`, so neighbor scans need no bounds branches of their own.

use std::fmt;

use crate::types::{Cell, Layout, Point, TileKind};

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every playable cell empty and layout holes dead
    pub fn new(layout: &Layout) -> Self {
        let width = layout.width();
        let height = layout.height();
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(if layout.is_hole(x, y) {
                    Cell::Hole
                } else {
                    Cell::Empty
                });
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Parse from rows of `#` (hole), `.` (empty) and base-36 kind digits
    /// (`1`..`9`, `a`..). Returns None for ragged or invalid input.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || width > u8::MAX as usize || height > u8::MAX as usize {
            return None;
        }

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return None;
            }
            for ch in row.chars() {
                let cell = match ch {
                    '#' => Cell::Hole,
                    '.' => Cell::Empty,
                    _ => {
                        let digit = ch.to_digit(36)?;
                        if digit == 0 {
                            return None;
                        }
                        Cell::Tile(TileKind::new(digit as u8))
                    }
                };
                cells.push(cell);
            }
        }

        Some(Self {
            width: width as u8,
            height: height as u8,
            cells,
        })
    }

    /// Calculate flat index from coordinates
    #[inline(always)]
    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.x >= self.width as i8 || p.y < 0 || p.y >= self.height as i8 {
            return None;
        }
        Some((p.y as usize) * (self.width as usize) + (p.x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Cell at `p`. Out-of-bounds reads report `Cell::Hole`.
    pub fn get(&self, p: Point) -> Cell {
        match self.index(p) {
            Some(idx) => self.cells[idx],
            None => Cell::Hole,
        }
    }

    /// Write `cell` at `p`. Returns false (writing nothing) out of bounds.
    /// Callers keep holes intact by contract; the grid does not check.
    pub fn set(&mut self, p: Point, cell: Cell) -> bool {
        match self.index(p) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// True when the cell holds a tile (false for empty, holes, and OOB)
    pub fn is_tile(&self, p: Point) -> bool {
        self.get(p).is_tile()
    }

    /// Get a reference to the internal cells slice
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Count of cells currently holding a tile
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_tile()).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.get(Point::new(x as i8, y as i8)) {
                    Cell::Hole => '#',
                    Cell::Empty => '.',
                    Cell::Tile(kind) => {
                        char::from_digit(kind.value() as u32, 36).unwrap_or('?')
                    }
                };
                write!(f, "{}", ch)?;
            }
            if y + 1 < self.height {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layout;

    #[test]
    fn test_grid_from_open_layout() {
        let grid = Grid::new(&Layout::open(4, 3));
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.cells().iter().all(|&c| c == Cell::Empty));
    }

    #[test]
    fn test_grid_layout_holes() {
        let mut layout = Layout::open(3, 3);
        layout.set_hole(1, 1, true);
        let grid = Grid::new(&layout);
        assert_eq!(grid.get(Point::new(1, 1)), Cell::Hole);
        assert_eq!(grid.get(Point::new(0, 1)), Cell::Empty);
    }

    #[test]
    fn test_out_of_bounds_reads_as_hole() {
        let grid = Grid::new(&Layout::open(3, 3));
        assert_eq!(grid.get(Point::new(-1, 0)), Cell::Hole);
        assert_eq!(grid.get(Point::new(0, -1)), Cell::Hole);
        assert_eq!(grid.get(Point::new(3, 0)), Cell::Hole);
        assert_eq!(grid.get(Point::new(0, 3)), Cell::Hole);
    }

    #[test]
    fn test_out_of_bounds_write_rejected() {
        let mut grid = Grid::new(&Layout::open(3, 3));
        assert!(!grid.set(Point::new(3, 0), Cell::Tile(TileKind::new(1))));
        assert!(!grid.set(Point::new(0, -1), Cell::Empty));
        assert!(grid.set(Point::new(2, 2), Cell::Tile(TileKind::new(2))));
        assert_eq!(grid.get(Point::new(2, 2)), Cell::Tile(TileKind::new(2)));
    }

    #[test]
    fn test_from_rows_round_trip() {
        let rows = ["12#", ".31", "2.1"];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.get(Point::new(0, 0)), Cell::Tile(TileKind::new(1)));
        assert_eq!(grid.get(Point::new(2, 0)), Cell::Hole);
        assert_eq!(grid.get(Point::new(0, 1)), Cell::Empty);
        assert_eq!(format!("{}", grid), "12#\n.31\n2.1");
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Grid::from_rows(&[]).is_none());
        assert!(Grid::from_rows(&["12", "123"]).is_none());
        assert!(Grid::from_rows(&["1!2"]).is_none());
        assert!(Grid::from_rows(&["102"]).is_none()); // 0 is not a kind
    }

    #[test]
    fn test_tile_count() {
        let grid = Grid::from_rows(&["1.#", "..2"]).unwrap();
        assert_eq!(grid.tile_count(), 2);
    }
}
