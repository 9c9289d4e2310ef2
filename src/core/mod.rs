//! Core module - pure board simulation with no host dependencies
//!
//! Everything under here is deterministic: the same config, swap requests,
//! and tick cadence produce the same round. Hosts plug in through the
//! traits in `crate::hooks`.

pub mod arena;
pub mod gravity;
pub mod grid;
pub mod init;
pub mod matching;
pub mod rng;
pub mod round;
pub mod scoring;
pub mod snapshot;
pub mod swap;

// Re-export commonly used types
pub use arena::{Piece, PieceArena, PieceId};
pub use grid::Grid;
pub use matching::{detect, has_any_match, MatchSet};
pub use rng::SimpleRng;
pub use round::RoundController;
pub use scoring::{match_points, move_bonus, time_bonus};
pub use snapshot::RoundSnapshot;
pub use swap::{SwapOutcome, SwapRecord};
