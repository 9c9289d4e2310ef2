//! Swap resolution
//!
//! Exchanges two adjacent cells on request and hands back a record of the
//! applied swap, so the controller can confirm or revert it once both
//! tiles settle. Reverts run the same exchange without leaving a record.

use crate::core::arena::{PieceArena, PieceId};
use crate::core::grid::Grid;
use crate::types::Point;

/// An applied swap awaiting confirmation: the unordered pair of exchanged
/// pieces. A piece belongs to at most one outstanding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRecord {
    pub a: PieceId,
    pub b: PieceId,
}

impl SwapRecord {
    pub fn contains(&self, id: PieceId) -> bool {
        self.a == id || self.b == id
    }

    /// The partner of `id`, or None when `id` is not part of the record
    pub fn other(&self, id: PieceId) -> Option<PieceId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Outcome of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Cells exchanged; both pieces move toward their new cells
    Applied(SwapRecord),
    /// Destination holds no tile; the source piece springs back instead
    Rejected { reset: PieceId },
    /// Source holds no tile, or the cells are not orthogonal neighbors
    Ignored,
}

/// Attempt to exchange the tiles at `a` and `b`.
///
/// The source must hold a tile and the cells must be orthogonally
/// adjacent, otherwise the request is ignored outright. A destination
/// without a tile (empty or hole) rejects the swap and reports the source
/// piece for a spring-back animation.
pub fn try_swap(grid: &mut Grid, arena: &mut PieceArena, a: Point, b: Point) -> SwapOutcome {
    if !grid.is_tile(a) || !a.is_adjacent(b) {
        return SwapOutcome::Ignored;
    }

    if grid.is_tile(b) {
        match exchange(grid, arena, a, b) {
            Some((id_a, id_b)) => SwapOutcome::Applied(SwapRecord { a: id_a, b: id_b }),
            None => SwapOutcome::Ignored,
        }
    } else {
        match arena.piece_at(a) {
            Some(reset) => SwapOutcome::Rejected { reset },
            None => SwapOutcome::Ignored,
        }
    }
}

/// Exchange back after a failed match. Leaves no record.
pub fn revert_swap(grid: &mut Grid, arena: &mut PieceArena, a: Point, b: Point) -> bool {
    if !grid.is_tile(a) || !grid.is_tile(b) {
        return false;
    }
    exchange(grid, arena, a, b).is_some()
}

/// Swap cell contents and reassign both pieces to their new cells
fn exchange(
    grid: &mut Grid,
    arena: &mut PieceArena,
    a: Point,
    b: Point,
) -> Option<(PieceId, PieceId)> {
    let id_a = arena.piece_at(a)?;
    let id_b = arena.piece_at(b)?;

    let cell_a = grid.get(a);
    let cell_b = grid.get(b);
    grid.set(a, cell_b);
    grid.set(b, cell_a);

    if let Some(piece) = arena.get_mut(id_a) {
        piece.cell = b;
    }
    if let Some(piece) = arena.get_mut(id_b) {
        piece.cell = a;
    }

    Some((id_a, id_b))
}
