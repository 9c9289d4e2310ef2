//! Scoring module - match points and end-of-round bonuses
//!
//! Every tile removed in one match step earns the same amount, scaled by
//! the capped combo level. Budget left over when the round closes pays
//! out as a lump-sum bonus.

use crate::types::{BONUS_PER_UNIT, COMBO_CAP, POINTS_PER_PIECE};

/// Points one removed tile earns at the given combo level.
/// The multiplier grows with the combo and caps at `COMBO_CAP + 1`.
pub fn match_points(combo: u32) -> u32 {
    (combo.min(COMBO_CAP) + 1) * POINTS_PER_PIECE
}

/// Bonus for unused time: whole remaining seconds at the unit rate
pub fn time_bonus(remaining_ms: u32) -> u32 {
    (remaining_ms / 1000) * BONUS_PER_UNIT
}

/// Bonus for unused moves
pub fn move_bonus(remaining_moves: u32) -> u32 {
    remaining_moves * BONUS_PER_UNIT
}
