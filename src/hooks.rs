//! Host collaborator traits.
//!
//! The round controller never draws, plays audio, or keeps a score total.
//! It reports everything that happens through these traits and asks the
//! host one question back: is a given piece still animating? Every method
//! has a no-op default so a host only implements the surfaces it cares
//! about; [`NullHooks`] accepts all defaults and settles pieces instantly,
//! which is what headless simulation and tests want.

use crate::core::arena::PieceId;
use crate::types::{AudioCue, Point, TileKind};

/// Score sink. `update_combo` also carries the remaining budget so a
/// combo widget can show both without a second callback.
pub trait Scoreboard {
    fn add_points(&mut self, _points: u32) {}
    fn update_combo(&mut self, _combo: u32, _remaining: u32) {}
}

/// Countdown display. `set_remaining` reports milliseconds in timed
/// rounds and whole moves in move-limited rounds.
pub trait RoundClock {
    fn set_remaining(&mut self, _remaining: u32, _limit: u32) {}
    fn round_ended(&mut self) {}
}

pub trait SoundBank {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Visual piece lifecycle. `origin` on spawn is where the host should
/// start the piece: equal to `cell` for the initial board, above the top
/// edge for gravity refills. `piece_updating` is polled every tick; a
/// piece counts as settled once it returns false.
pub trait TileView {
    fn piece_spawned(&mut self, _id: PieceId, _kind: TileKind, _cell: Point, _origin: Point) {}
    fn piece_moved(&mut self, _id: PieceId, _cell: Point, _falling: bool) {}
    fn piece_reset(&mut self, _id: PieceId, _cell: Point) {}
    fn piece_removed(&mut self, _id: PieceId, _cell: Point, _points: u32) {}
    fn piece_updating(&mut self, _id: PieceId) -> bool {
        false
    }
}

/// Everything the controller needs from a host, as one bound.
pub trait RoundHooks: Scoreboard + RoundClock + SoundBank + TileView {}

impl<T: Scoreboard + RoundClock + SoundBank + TileView> RoundHooks for T {}

/// Ignores every callback. Pieces settle on the tick after they move.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl Scoreboard for NullHooks {}
impl RoundClock for NullHooks {}
impl SoundBank for NullHooks {}
impl TileView for NullHooks {}
