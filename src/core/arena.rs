//! Piece arena - stable identities for tiles in motion
//!
//! The controller tracks animating tiles by id rather than by cell, since
//! a tile's cell changes while it moves. Removed pieces leave their slot
//! behind for reuse; the generation counter makes stale ids detectable
//! instead of silently resolving to the slot's next occupant.

use crate::types::{Point, TileKind};

/// Handle to a live piece. Carries the slot's generation at allocation
/// time; lookups fail once the slot has been freed or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId {
    index: u32,
    generation: u32,
}

/// A live tile: kind, the cell it occupies (or is moving toward), and
/// whether it is falling under gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: TileKind,
    pub cell: Point,
    pub falling: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    piece: Option<Piece>,
}

/// Slot-reusing piece store
#[derive(Debug, Clone, Default)]
pub struct PieceArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl PieceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a piece at `cell`, reusing a freed slot when available
    pub fn alloc(&mut self, kind: TileKind, cell: Point) -> PieceId {
        let piece = Piece {
            kind,
            cell,
            falling: false,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.piece = Some(piece);
            return PieceId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            piece: Some(piece),
        });
        PieceId {
            index,
            generation: 0,
        }
    }

    /// Free a piece. Its id, and every copy of it, goes stale.
    /// Returns false for ids that are already stale.
    pub fn free(&mut self, id: PieceId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation || slot.piece.is_none() {
            return false;
        }

        slot.piece = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        true
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.piece.as_ref()
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.piece.as_mut()
    }

    /// Piece currently assigned to `cell`, if any
    pub fn piece_at(&self, cell: Point) -> Option<PieceId> {
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(piece) = &slot.piece {
                if piece.cell == cell {
                    return Some(PieceId {
                        index: index as u32,
                        generation: slot.generation,
                    });
                }
            }
        }
        None
    }

    /// Iterate live pieces with their ids
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.piece.as_ref().map(|piece| {
                (
                    PieceId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    piece,
                )
            })
        })
    }

    /// Number of live pieces
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.piece.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
