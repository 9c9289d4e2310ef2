//! Round controller scenarios - full swap/match/gravity/cascade cycles
//! driven through the public API

use gemfall::core::{detect, has_any_match, Grid, PieceId};
use gemfall::hooks::{RoundClock, Scoreboard, SoundBank, TileView};
use gemfall::types::{AudioCue, Cell, Point, TileKind, TICK_MS};
use gemfall::{Budget, Phase, RoundConfig, RoundController, SwapOutcome};

/// Full-surface recording host. Pieces settle on the tick after they
/// move, like `NullHooks`.
#[derive(Default)]
struct Host {
    points: u32,
    combos: Vec<u32>,
    cues: Vec<AudioCue>,
    removed: Vec<(Point, u32)>,
    ended: bool,
}

impl Host {
    fn cue_count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|&&c| c == cue).count()
    }

    fn removed_at(&self, cell: Point, points: u32) -> usize {
        self.removed
            .iter()
            .filter(|&&(c, p)| c == cell && p == points)
            .count()
    }
}

impl Scoreboard for Host {
    fn add_points(&mut self, points: u32) {
        self.points += points;
    }
    fn update_combo(&mut self, combo: u32, _remaining: u32) {
        self.combos.push(combo);
    }
}

impl RoundClock for Host {
    fn round_ended(&mut self) {
        self.ended = true;
    }
}

impl SoundBank for Host {
    fn play(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

impl TileView for Host {
    fn piece_removed(&mut self, _id: PieceId, cell: Point, points: u32) {
        self.removed.push((cell, points));
    }
}

fn config(width: u8, height: u8, budget: Budget) -> RoundConfig {
    RoundConfig {
        width,
        height,
        kinds: 5,
        budget,
        seed: 11,
    }
}

fn settle(round: &mut RoundController, host: &mut Host) {
    for _ in 0..10_000 {
        if round.is_movable() || round.phase() != Phase::Started {
            return;
        }
        round.tick(TICK_MS, host);
    }
    panic!("board never came to rest");
}

fn run_to_end(round: &mut RoundController, host: &mut Host) {
    for _ in 0..100_000 {
        if round.phase() == Phase::Ended {
            return;
        }
        round.tick(TICK_MS, host);
    }
    panic!("round never ended");
}

/// No matches, and no swap of two equal tiles possible anywhere.
const NO_MATCH_BOARD: [&str; 4] = ["1234", "2143", "1324", "3412"];

/// Swapping (1,3) with (2,3) completes a vertical 4-run of kind 5 in
/// column 2. The tile above the cleared column then falls to the bottom
/// row and completes a horizontal 3-run of kind 3 - a guaranteed
/// cascade, independent of what refills from above.
const CASCADE_BOARD: [&str; 5] = ["12341", "21512", "34523", "45134", "13532"];

#[test]
fn test_failed_swap_reverts_resets_combo_and_fails_once() {
    let grid = Grid::from_rows(&NO_MATCH_BOARD).unwrap();
    let mut round =
        RoundController::with_grid(config(4, 4, Budget::Moves { limit: 15 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);
    let before = round.grid().clone();

    let outcome = round.request_swap(Point::new(0, 3), Point::new(1, 3), &mut host);
    assert!(matches!(outcome, SwapOutcome::Applied(_)));
    assert_eq!(host.cue_count(AudioCue::FlipTry), 1);

    settle(&mut round, &mut host);

    // Both tiles are back where they started and nothing was spent
    assert_eq!(*round.grid(), before);
    assert_eq!(host.points, 0);
    assert_eq!(round.combo(), 0);
    assert_eq!(round.remaining(), 15);
    assert_eq!(host.cue_count(AudioCue::MatchFail), 1);
    assert_eq!(host.cue_count(AudioCue::MatchSuccess), 0);
    assert!(host.removed.is_empty());
    assert!(host.combos.contains(&0));
}

#[test]
fn test_four_in_a_row_breaks_refills_and_cascades() {
    let grid = Grid::from_rows(&CASCADE_BOARD).unwrap();
    assert!(!has_any_match(&grid));

    let mut round =
        RoundController::with_grid(config(5, 5, Budget::Moves { limit: 15 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    let outcome = round.request_swap(Point::new(1, 3), Point::new(2, 3), &mut host);
    assert!(matches!(outcome, SwapOutcome::Applied(_)));

    // First tick resolves the swap: the whole column-2 run of 5s breaks
    // at the combo-0 rate
    round.tick(TICK_MS, &mut host);
    assert_eq!(round.combo(), 1);
    assert_eq!(host.points, 4 * 25);
    assert_eq!(round.remaining(), 14);
    for y in 1..=4 {
        assert_eq!(host.removed_at(Point::new(2, y), 25), 1, "y {}", y);
    }

    settle(&mut round, &mut host);

    // The fallen 3 completed the bottom-row run, scored one combo step
    // higher: 50 per piece
    assert!(round.combo() >= 2, "no cascade fired");
    assert!(host.cue_count(AudioCue::MatchSuccess) >= 2);
    assert!(host.cue_count(AudioCue::MatchFail) == 0);
    assert_eq!(host.removed_at(Point::new(1, 4), 50), 1);
    assert_eq!(host.removed_at(Point::new(3, 4), 50), 1);
    assert_eq!(host.removed_at(Point::new(2, 4), 50), 1);
    assert!(host.points >= 4 * 25 + 3 * 50);

    // Only the player swap spent a move; cascades ride free
    assert_eq!(round.remaining(), 14);

    // The board refilled completely and came to rest clean
    assert_eq!(round.grid().tile_count(), 25);
    assert!(!has_any_match(round.grid()));
}

#[test]
fn test_cascade_waves_score_one_combo_step_each() {
    let grid = Grid::from_rows(&CASCADE_BOARD).unwrap();
    let mut round =
        RoundController::with_grid(config(5, 5, Budget::Moves { limit: 15 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    round.request_swap(Point::new(1, 3), Point::new(2, 3), &mut host);
    settle(&mut round, &mut host);

    // Per-piece prices only ever come from the combo ladder, one rung
    // per wave
    let mut prices: Vec<u32> = host.removed.iter().map(|&(_, p)| p).collect();
    prices.sort_unstable();
    prices.dedup();
    for (i, &price) in prices.iter().enumerate() {
        assert_eq!(price, 25 * (i as u32 + 1));
    }
    assert!(prices.len() >= 2);
}

#[test]
fn test_scrubbed_default_round_accepts_probed_swaps_to_exhaustion() {
    // Play a whole move-limited round: probe the live board for a swap
    // that would match, play it, and repeat until the moves run out
    let mut round = RoundController::new(RoundConfig {
        seed: 3,
        budget: Budget::Moves { limit: 3 },
        ..RoundConfig::default()
    })
    .unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    while round.phase() == Phase::Started {
        let Some((a, b)) = find_matching_swap(round.grid()) else {
            round.close();
            break;
        };
        let outcome = round.request_swap(a, b, &mut host);
        assert!(matches!(outcome, SwapOutcome::Applied(_)), "{:?}->{:?}", a, b);
        settle(&mut round, &mut host);
    }

    run_to_end(&mut round, &mut host);
    assert!(host.ended);
    assert_eq!(host.cue_count(AudioCue::GameOver), 1);
    assert!(host.points > 0);
    assert!(!has_any_match(round.grid()));
    assert_eq!(round.grid().tile_count(), 9 * 12);
}

#[test]
fn test_move_round_pays_bonus_for_unused_moves() {
    let grid = Grid::from_rows(&NO_MATCH_BOARD).unwrap();
    let mut round =
        RoundController::with_grid(config(4, 4, Budget::Moves { limit: 10 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    round.close();
    run_to_end(&mut round, &mut host);

    assert!(host.ended);
    assert_eq!(host.points, 10 * 100);
    assert_eq!(host.cue_count(AudioCue::GameOver), 1);
}

#[test]
fn test_timed_round_pays_bonus_for_unused_time() {
    let grid = Grid::from_rows(&NO_MATCH_BOARD).unwrap();
    let mut round = RoundController::with_grid(
        config(4, 4, Budget::Timed { limit_ms: 60_000 }),
        grid,
    )
    .unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    for _ in 0..10 {
        round.tick(TICK_MS, &mut host);
    }
    let remaining = round.remaining();
    round.close();
    run_to_end(&mut round, &mut host);

    assert!(host.ended);
    assert_eq!(host.points, (remaining / 1000) * 100);
    assert_eq!(round.remaining(), 0);
}

/// Scan the board for an adjacent pair whose exchange creates a match.
/// Tries the exchange on a scratch copy, never on the live grid.
fn find_matching_swap(grid: &Grid) -> Option<(Point, Point)> {
    for y in 0..grid.height() as i8 {
        for x in 0..grid.width() as i8 {
            let a = Point::new(x, y);
            if !grid.is_tile(a) {
                continue;
            }
            for b in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if !grid.is_tile(b) {
                    continue;
                }
                let mut probe = grid.clone();
                let (cell_a, cell_b) = (probe.get(a), probe.get(b));
                if cell_a == cell_b {
                    continue;
                }
                probe.set(a, cell_b);
                probe.set(b, cell_a);
                if !detect(&probe, a, false).is_empty() || !detect(&probe, b, false).is_empty() {
                    return Some((a, b));
                }
            }
        }
    }
    None
}

#[test]
fn test_rejected_and_ignored_swaps_leave_state_alone() {
    let grid = Grid::from_rows(&["12#", "214", "132"]).unwrap();
    let mut round =
        RoundController::with_grid(config(3, 3, Budget::Moves { limit: 15 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);
    let before = round.grid().clone();

    // Into a hole: rejected, the source springs back silently
    let outcome = round.request_swap(Point::new(1, 0), Point::new(2, 0), &mut host);
    assert!(matches!(outcome, SwapOutcome::Rejected { .. }));
    settle(&mut round, &mut host);

    // Out of range and non-adjacent: ignored outright
    for (a, b) in [
        (Point::new(5, 5), Point::new(5, 6)),
        (Point::new(0, 0), Point::new(2, 2)),
    ] {
        assert_eq!(round.request_swap(a, b, &mut host), SwapOutcome::Ignored);
    }

    assert_eq!(*round.grid(), before);
    assert_eq!(host.points, 0);
    assert_eq!(round.remaining(), 15);
    assert!(host.cues.is_empty());
    assert!(round.is_movable());
}

#[test]
fn test_hole_cell_in_snapshot_and_board_stays_fixed() {
    let grid = Grid::from_rows(&["1#2", "321", "213"]).unwrap();
    let mut round =
        RoundController::with_grid(config(3, 3, Budget::Moves { limit: 5 }), grid).unwrap();
    let mut host = Host::default();
    round.start(&mut host);

    let snap = round.snapshot();
    assert_eq!(snap.board[0], vec![1, -1, 2]);
    assert_eq!(round.grid().get(Point::new(1, 0)), Cell::Hole);
    assert_ne!(
        round.grid().get(Point::new(1, 0)),
        Cell::Tile(TileKind::new(1))
    );
}
