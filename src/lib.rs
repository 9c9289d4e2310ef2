//! Deterministic match-3 board simulation core
//!
//! This crate is the game logic half of a tile-matching puzzle: board
//! state, match detection, gravity, scoring, and the round lifecycle.
//! It draws nothing and owns no clock; a host embeds it, feeds it swap
//! requests and ticks, and mirrors the results through the collaborator
//! traits in [`hooks`].
//!
//! - **Deterministic**: the same config and input sequence replays the
//!   same round, tile for tile
//! - **Host-agnostic**: terminal, GUI, and headless hosts all drive the
//!   same controller
//! - **Testable**: every rule is exercised without a frontend
//!
//! # Module Structure
//!
//! - `core::grid`: cell storage with holes and edge-tolerant reads
//! - `core::matching`: run, straddle, and block detection with chained
//!   expansion across the board
//! - `core::init`: board seeding and the match-free scrub
//! - `core::gravity`: column compaction and refill planning
//! - `core::swap`: provisional tile exchanges
//! - `core::round`: the round controller - phases, budgets, cascades,
//!   and the closing payout
//! - `hooks`: traits a host implements to observe the round
//! - `types`: shared data types and tuning constants
//!
//! # Match Rules
//!
//! Three or more tiles of one kind in a straight line match, and so do
//! 2x2 blocks. Matches found while tiles settle chain outward, so one
//! landing can clear several connected groups at once. Broken tiles
//! score per piece, multiplied by a capped combo that grows with every
//! match and resets only when a swap fails.
//!
//! # Example
//!
//! ```
//! use gemfall::{NullHooks, Phase, Point, RoundConfig, RoundController};
//!
//! let mut round = RoundController::new(RoundConfig::default()).unwrap();
//! let mut hooks = NullHooks;
//! round.start(&mut hooks);
//!
//! // Ask for a swap; the round resolves it over the following ticks.
//! round.request_swap(Point::new(3, 4), Point::new(3, 5), &mut hooks);
//! for _ in 0..240 {
//!     round.tick(16, &mut hooks);
//! }
//!
//! assert_eq!(round.phase(), Phase::Started);
//! assert_eq!(round.snapshot().board.len(), 12);
//! ```
//!
//! # Timing
//!
//! The controller is tick-driven and does cooperative work per tick:
//! poll the host for settled pieces, resolve at most one match wave, and
//! advance the budget clock. Call [`RoundController::tick`] every frame
//! with the elapsed milliseconds; [`TICK_MS`](types::TICK_MS) is the
//! cadence the tuning constants assume.

pub mod core;
pub mod hooks;
pub mod types;

pub use crate::core::round::RoundController;
pub use crate::core::snapshot::RoundSnapshot;
pub use crate::core::swap::SwapOutcome;
pub use hooks::{NullHooks, RoundClock, RoundHooks, Scoreboard, SoundBank, TileView};
pub use types::{Budget, ConfigError, Layout, Phase, Point, RoundConfig};
