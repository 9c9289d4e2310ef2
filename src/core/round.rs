//! Round controller - drives a board through one playable round
//!
//! Owns the grid, the piece arena, and the rng, and advances the round on
//! a fixed tick. All side effects flow through the [`RoundHooks`]
//! collaborators; the controller itself is deterministic for a given
//! config and input sequence.
//!
//! A round moves through four phases, one way:
//!
//! - `Ready`: built, pieces not yet announced to the host
//! - `Started`: swaps accepted whenever the board is at rest
//! - `Closing`: budget exhausted or [`close`] called; in-flight cascades
//!   run out, then any unused budget pays out as bonus score
//! - `Ended`: terminal, ticks are no-ops
//!
//! [`close`]: RoundController::close

use std::mem;

use tracing::{debug, info};

use crate::core::arena::{PieceArena, PieceId};
use crate::core::gravity::{self, FallPlan};
use crate::core::grid::Grid;
use crate::core::init;
use crate::core::matching::{self, MatchSet};
use crate::core::rng::SimpleRng;
use crate::core::scoring;
use crate::core::snapshot::RoundSnapshot;
use crate::core::swap::{self, SwapOutcome, SwapRecord};
use crate::hooks::RoundHooks;
use crate::types::{
    AudioCue, Budget, Cell, ConfigError, Layout, Phase, Point, RoundConfig, GRAVITY_LOCK_MS,
    MAX_BOARD_DIM, PAYOUT_DELAY_MS, PAYOUT_DRAIN_MS,
};

/// Board settling handshake after a gravity pass.
///
/// A pass locks the board for [`GRAVITY_LOCK_MS`]; when the lock runs out
/// the state parks on `Await` for one tick before returning to `Idle`, so
/// settled pieces are never resolved on the same tick the lock expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GravityState {
    Idle,
    Locked,
    Await,
}

/// Bonus payout in progress: a short delay, then the displayed budget
/// drains to zero over [`PAYOUT_DRAIN_MS`] before the points land.
#[derive(Debug, Clone, Copy)]
struct Payout {
    bonus: u32,
    drained_from: u32,
    delay_ms: u32,
    drain_ms: u32,
}

/// One playable round over a match board.
pub struct RoundController {
    config: RoundConfig,
    grid: Grid,
    arena: PieceArena,
    rng: SimpleRng,
    phase: Phase,
    combo: u32,
    remaining: u32,
    limit: u32,
    /// Pieces the host is still animating
    in_flight: Vec<PieceId>,
    /// Pieces that settled and await match resolution
    pending: Vec<PieceId>,
    /// Applied swaps waiting for both their pieces to settle
    swaps: Vec<SwapRecord>,
    /// Per-column count of refill spawns not yet resolved
    fills: Vec<u8>,
    gravity: GravityState,
    gravity_lock_ms: u32,
    payout: Option<Payout>,
}

impl RoundController {
    /// Build a round on a fully open board.
    pub fn new(config: RoundConfig) -> Result<Self, ConfigError> {
        let layout = Layout::open(config.width, config.height);
        Self::with_layout(config, &layout)
    }

    /// Build a round on `layout`, seeding and scrubbing the board so it
    /// starts full (where playable) and match-free.
    pub fn with_layout(config: RoundConfig, layout: &Layout) -> Result<Self, ConfigError> {
        let limit = Self::validate(&config)?;
        if layout.width() != config.width || layout.height() != config.height {
            return Err(ConfigError::LayoutMismatch);
        }

        let mut rng = SimpleRng::new(config.seed);
        let grid = init::initialize(layout, config.kinds, &mut rng);
        let arena = Self::arena_for(&grid);
        debug!(
            width = config.width,
            height = config.height,
            kinds = config.kinds,
            seed = config.seed,
            "round built"
        );
        Ok(Self::assemble(config, grid, arena, rng, limit))
    }

    /// Build a round over a prepared board, for scripted and puzzle
    /// setups. The grid is taken as-is: matches already on it sit inert
    /// until nearby tiles settle, so callers normally hand in a
    /// match-free board. Refills still draw from `1..=config.kinds`.
    pub fn with_grid(config: RoundConfig, grid: Grid) -> Result<Self, ConfigError> {
        let limit = Self::validate(&config)?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(ConfigError::LayoutMismatch);
        }

        let rng = SimpleRng::new(config.seed);
        let arena = Self::arena_for(&grid);
        Ok(Self::assemble(config, grid, arena, rng, limit))
    }

    fn validate(config: &RoundConfig) -> Result<u32, ConfigError> {
        if config.kinds == 0 {
            return Err(ConfigError::NoKinds);
        }
        if config.width == 0 || config.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if config.width > MAX_BOARD_DIM || config.height > MAX_BOARD_DIM {
            return Err(ConfigError::OversizedBoard);
        }
        let limit = match config.budget {
            Budget::Timed { limit_ms } => limit_ms,
            Budget::Moves { limit } => limit,
        };
        if limit == 0 {
            return Err(ConfigError::EmptyBudget);
        }
        Ok(limit)
    }

    fn arena_for(grid: &Grid) -> PieceArena {
        let mut arena = PieceArena::new();
        for y in 0..grid.height() as i8 {
            for x in 0..grid.width() as i8 {
                let cell = Point::new(x, y);
                if let Some(kind) = grid.get(cell).kind() {
                    arena.alloc(kind, cell);
                }
            }
        }
        arena
    }

    fn assemble(
        config: RoundConfig,
        grid: Grid,
        arena: PieceArena,
        rng: SimpleRng,
        limit: u32,
    ) -> Self {
        let fills = vec![0u8; grid.width() as usize];
        Self {
            config,
            grid,
            arena,
            rng,
            phase: Phase::Ready,
            combo: 0,
            remaining: limit,
            limit,
            in_flight: Vec::new(),
            pending: Vec::new(),
            swaps: Vec::new(),
            fills,
            gravity: GravityState::Idle,
            gravity_lock_ms: 0,
            payout: None,
        }
    }

    /// Announce every board piece to the host and open play.
    /// Does nothing unless the round is still `Ready`.
    pub fn start(&mut self, hooks: &mut impl RoundHooks) {
        if self.phase != Phase::Ready {
            return;
        }
        for (id, piece) in self.arena.iter() {
            hooks.piece_spawned(id, piece.kind, piece.cell, piece.cell);
        }
        hooks.set_remaining(self.remaining, self.limit);
        hooks.update_combo(0, self.remaining);
        self.phase = Phase::Started;
        info!(limit = self.limit, "round started");
    }

    /// Stop accepting swaps and wind the round down. The closing
    /// sequence still waits for the board to come to rest, then pays
    /// out the unused budget.
    pub fn close(&mut self) {
        if self.phase == Phase::Started {
            self.phase = Phase::Closing;
            info!(remaining = self.remaining, "round closing");
        }
    }

    /// Ask to exchange the tiles at `a` and `b`.
    ///
    /// Accepted only while the round is started and the board is at
    /// rest. An applied swap stays provisional: once both pieces settle
    /// it either breaks a match or swaps back.
    pub fn request_swap(
        &mut self,
        a: Point,
        b: Point,
        hooks: &mut impl RoundHooks,
    ) -> SwapOutcome {
        if !self.is_movable() {
            return SwapOutcome::Ignored;
        }

        let outcome = swap::try_swap(&mut self.grid, &mut self.arena, a, b);
        match outcome {
            SwapOutcome::Applied(record) => {
                for id in [record.a, record.b] {
                    if let Some(piece) = self.arena.get(id) {
                        hooks.piece_moved(id, piece.cell, false);
                    }
                    self.in_flight.push(id);
                }
                self.swaps.push(record);
                hooks.play(AudioCue::FlipTry);
                debug!(?a, ?b, "swap applied");
            }
            SwapOutcome::Rejected { reset } => {
                if let Some(piece) = self.arena.get(reset) {
                    hooks.piece_reset(reset, piece.cell);
                }
                self.in_flight.push(reset);
                debug!(?a, ?b, "swap rejected, resetting source");
            }
            SwapOutcome::Ignored => {}
        }
        outcome
    }

    /// Advance the round by `elapsed_ms`.
    ///
    /// One tick: advance the budget clock, step the gravity handshake,
    /// poll the host for pieces that finished animating, and once the
    /// board is quiet resolve settled swaps and match waves. A swapped
    /// pair resolves as a unit; a cascade wave resolves as one combined
    /// match, so simultaneous landings score exactly once.
    pub fn tick(&mut self, elapsed_ms: u32, hooks: &mut impl RoundHooks) {
        match self.phase {
            Phase::Ready | Phase::Ended => return,
            Phase::Started => self.advance_clock(elapsed_ms, hooks),
            Phase::Closing => {
                if self.payout.is_some() {
                    self.tick_payout(elapsed_ms, hooks);
                    return;
                }
            }
        }

        match self.gravity {
            GravityState::Await => self.gravity = GravityState::Idle,
            GravityState::Locked => {
                self.gravity_lock_ms = self.gravity_lock_ms.saturating_sub(elapsed_ms);
                if self.gravity_lock_ms == 0 {
                    self.gravity = GravityState::Await;
                }
            }
            GravityState::Idle => {}
        }

        self.poll_in_flight(hooks);

        if self.gravity == GravityState::Idle {
            self.process_settled(hooks);
        }

        self.finish_if_at_rest(hooks);
    }

    /// True when a swap request would be considered: round started,
    /// nothing animating, nothing awaiting resolution.
    pub fn is_movable(&self) -> bool {
        self.phase == Phase::Started
            && self.in_flight.is_empty()
            && self.pending.is_empty()
            && self.swaps.is_empty()
            && self.gravity == GravityState::Idle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Remaining budget: milliseconds in timed rounds, moves otherwise
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Write the observable round state into `out`, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut RoundSnapshot) {
        out.board.clear();
        for y in 0..self.grid.height() as i8 {
            let mut row = Vec::with_capacity(self.grid.width() as usize);
            for x in 0..self.grid.width() as i8 {
                row.push(self.grid.get(Point::new(x, y)).as_i8());
            }
            out.board.push(row);
        }
        out.phase = self.phase;
        out.combo = self.combo;
        out.remaining = self.remaining;
        out.limit = self.limit;
        out.in_flight = self.in_flight.len() + self.pending.len();
        out.movable = self.is_movable();
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut out = RoundSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    fn advance_clock(&mut self, elapsed_ms: u32, hooks: &mut impl RoundHooks) {
        let Budget::Timed { .. } = self.config.budget else {
            return;
        };
        self.remaining = self.remaining.saturating_sub(elapsed_ms);
        hooks.set_remaining(self.remaining, self.limit);
        if self.remaining == 0 {
            self.phase = Phase::Closing;
            info!("time over, round closing");
        }
    }

    /// Move settled pieces out of flight. A falling piece takes one
    /// extra tick: its fall flag clears first and it settles on the
    /// following poll.
    fn poll_in_flight(&mut self, hooks: &mut impl RoundHooks) {
        let mut index = 0;
        while index < self.in_flight.len() {
            let id = self.in_flight[index];
            if hooks.piece_updating(id) {
                index += 1;
                continue;
            }
            if let Some(piece) = self.arena.get_mut(id) {
                if piece.falling {
                    piece.falling = false;
                    index += 1;
                    continue;
                }
            }
            self.in_flight.swap_remove(index);
            self.pending.push(id);
        }
    }

    fn process_settled(&mut self, hooks: &mut impl RoundHooks) {
        self.process_swap_pairs(hooks);
        self.process_wave(hooks);
    }

    /// Resolve swaps whose pieces have both settled.
    fn process_swap_pairs(&mut self, hooks: &mut impl RoundHooks) {
        loop {
            let ready = self.swaps.iter().position(|record| {
                self.pending.contains(&record.a) && self.pending.contains(&record.b)
            });
            let Some(slot) = ready else {
                return;
            };

            let record = self.swaps.remove(slot);
            self.pending.retain(|&id| !record.contains(id));
            self.resolve_swap(record, hooks);
        }
    }

    fn resolve_swap(&mut self, record: SwapRecord, hooks: &mut impl RoundHooks) {
        self.consume_fill(record.a);
        self.consume_fill(record.b);

        let mut connected = MatchSet::new();
        for id in [record.a, record.b] {
            if let Some(cell) = self.arena.get(id).map(|p| p.cell) {
                connected.merge(&matching::detect(&self.grid, cell, true));
            }
        }

        if connected.is_empty() {
            self.revert(record, hooks);
            return;
        }

        self.spend_move(hooks);
        self.apply_match(&connected, hooks);
    }

    /// Swap the pair back after a failed match. The combo chain breaks
    /// here and nowhere else.
    fn revert(&mut self, record: SwapRecord, hooks: &mut impl RoundHooks) {
        let cell_a = self.arena.get(record.a).map(|p| p.cell);
        let cell_b = self.arena.get(record.b).map(|p| p.cell);
        if let (Some(cell_a), Some(cell_b)) = (cell_a, cell_b) {
            if swap::revert_swap(&mut self.grid, &mut self.arena, cell_a, cell_b) {
                hooks.piece_moved(record.a, cell_b, false);
                hooks.piece_moved(record.b, cell_a, false);
                self.in_flight.push(record.a);
                self.in_flight.push(record.b);
            }
        }

        self.combo = 0;
        hooks.update_combo(0, self.remaining);
        hooks.play(AudioCue::MatchFail);
        debug!("swap failed, reverting");
    }

    /// Resolve every piece that landed this wave as one combined match.
    /// Held back until the whole wave is down, so pieces landing one
    /// tick apart cannot score the same cells twice.
    fn process_wave(&mut self, hooks: &mut impl RoundHooks) {
        if self.pending.is_empty() || !self.in_flight.is_empty() {
            return;
        }

        let wave = mem::take(&mut self.pending);
        let mut connected = MatchSet::new();
        for &id in &wave {
            if let Some(cell) = self.arena.get(id).map(|p| p.cell) {
                connected.merge(&matching::detect(&self.grid, cell, true));
            }
            self.consume_fill(id);
        }

        if connected.is_empty() {
            debug!(settled = wave.len(), "wave came to rest");
            return;
        }

        self.apply_match(&connected, hooks);
    }

    /// Break the connected cells, credit the score, bump the combo, and
    /// run a gravity pass over the gaps.
    fn apply_match(&mut self, connected: &MatchSet, hooks: &mut impl RoundHooks) {
        let earned = scoring::match_points(self.combo);
        let mut broken = 0u32;

        for cell in connected.iter() {
            if let Some(id) = self.arena.piece_at(cell) {
                self.arena.free(id);
                hooks.piece_removed(id, cell, earned);
            }
            self.grid.set(cell, Cell::Empty);
            broken += 1;
        }

        hooks.add_points(earned * broken);
        self.combo += 1;
        hooks.update_combo(self.combo, self.remaining);
        hooks.play(AudioCue::MatchSuccess);
        debug!(
            broken,
            combo = self.combo,
            points = earned * broken,
            "match broke tiles"
        );

        let plan = gravity::resolve(
            &mut self.grid,
            &mut self.fills,
            self.config.kinds,
            &mut self.rng,
        );
        self.apply_plan(&plan, hooks);
    }

    fn apply_plan(&mut self, plan: &FallPlan, hooks: &mut impl RoundHooks) {
        for mv in &plan.moves {
            let Some(id) = self.arena.piece_at(mv.from) else {
                continue;
            };
            if let Some(piece) = self.arena.get_mut(id) {
                piece.cell = mv.to;
                piece.falling = true;
            }
            hooks.piece_moved(id, mv.to, true);
            self.in_flight.push(id);
        }

        for spawn in &plan.spawns {
            let id = self.arena.alloc(spawn.kind, spawn.cell);
            if let Some(piece) = self.arena.get_mut(id) {
                piece.falling = true;
            }
            hooks.piece_spawned(id, spawn.kind, spawn.cell, spawn.origin);
            self.in_flight.push(id);
        }

        if !plan.is_empty() {
            self.gravity = GravityState::Locked;
            self.gravity_lock_ms = GRAVITY_LOCK_MS;
        }
    }

    /// Confirmed swaps spend a move in move-limited rounds. Failed
    /// swaps and cascade matches never do.
    fn spend_move(&mut self, hooks: &mut impl RoundHooks) {
        let Budget::Moves { .. } = self.config.budget else {
            return;
        };
        if self.remaining == 0 {
            return;
        }

        self.remaining -= 1;
        hooks.set_remaining(self.remaining, self.limit);
        if self.remaining == 0 {
            self.phase = Phase::Closing;
            info!("moves spent, round closing");
        }
    }

    fn consume_fill(&mut self, id: PieceId) {
        let Some(piece) = self.arena.get(id) else {
            return;
        };
        let x = piece.cell.x;
        if x >= 0 && (x as usize) < self.fills.len() {
            self.fills[x as usize] = self.fills[x as usize].saturating_sub(1);
        }
    }

    /// Once a closing round is fully at rest, report the end of play
    /// and start paying out the unused budget. A zero bonus skips the
    /// payout sequence entirely.
    fn finish_if_at_rest(&mut self, hooks: &mut impl RoundHooks) {
        if self.phase != Phase::Closing || self.payout.is_some() {
            return;
        }
        if !self.in_flight.is_empty()
            || !self.pending.is_empty()
            || self.gravity != GravityState::Idle
        {
            return;
        }

        hooks.play(AudioCue::GameOver);
        hooks.round_ended();

        let bonus = match self.config.budget {
            Budget::Timed { .. } => scoring::time_bonus(self.remaining),
            Budget::Moves { .. } => scoring::move_bonus(self.remaining),
        };
        if bonus == 0 {
            self.phase = Phase::Ended;
            info!("round ended");
            return;
        }

        self.payout = Some(Payout {
            bonus,
            drained_from: self.remaining,
            delay_ms: PAYOUT_DELAY_MS,
            drain_ms: PAYOUT_DRAIN_MS,
        });
        debug!(bonus, "paying out unused budget");
    }

    fn tick_payout(&mut self, elapsed_ms: u32, hooks: &mut impl RoundHooks) {
        let Some(payout) = &mut self.payout else {
            return;
        };

        if payout.delay_ms > 0 {
            payout.delay_ms = payout.delay_ms.saturating_sub(elapsed_ms);
            return;
        }

        payout.drain_ms = payout.drain_ms.saturating_sub(elapsed_ms);
        if payout.drain_ms > 0 {
            let shown = (payout.drained_from as u64 * payout.drain_ms as u64
                / PAYOUT_DRAIN_MS as u64) as u32;
            hooks.set_remaining(shown, self.limit);
            return;
        }

        let bonus = payout.bonus;
        self.payout = None;
        self.remaining = 0;
        hooks.set_remaining(0, self.limit);
        hooks.add_points(bonus);
        self.phase = Phase::Ended;
        info!(bonus, "round ended");
    }
}
