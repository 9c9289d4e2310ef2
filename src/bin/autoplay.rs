//! Headless autoplayer.
//!
//! Builds a round, probes random adjacent swaps whenever the board is at
//! rest, and ticks the simulation until the round ends. Useful for
//! eyeballing cascade behavior and for soak-testing determinism from the
//! command line. With `--json`, every return to rest emits one snapshot
//! line, so the output can be piped into other tooling.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info};

use gemfall::core::SimpleRng;
use gemfall::hooks::{RoundClock, Scoreboard, SoundBank, TileView};
use gemfall::types::{AudioCue, TICK_MS};
use gemfall::{Budget, Phase, Point, RoundConfig, RoundController, SwapOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AutoplayConfig {
    round: RoundConfig,
    swaps: u32,
    max_ticks: u64,
    json: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            swaps: u32::MAX,
            max_ticks: 200_000,
            json: false,
        }
    }
}

fn parse_args(args: &[String]) -> Result<AutoplayConfig> {
    let mut config = AutoplayConfig::default();
    let mut budget: Option<Budget> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                config.round.seed = parse_value(args, &mut i, "--seed")?;
            }
            "--width" => {
                config.round.width = parse_value(args, &mut i, "--width")?;
            }
            "--height" => {
                config.round.height = parse_value(args, &mut i, "--height")?;
            }
            "--kinds" => {
                config.round.kinds = parse_value(args, &mut i, "--kinds")?;
            }
            "--moves" => {
                if budget.is_some() {
                    bail!("autoplay: --moves and --time are mutually exclusive");
                }
                let limit = parse_value(args, &mut i, "--moves")?;
                budget = Some(Budget::Moves { limit });
            }
            "--time" => {
                if budget.is_some() {
                    bail!("autoplay: --moves and --time are mutually exclusive");
                }
                let limit_ms = parse_value(args, &mut i, "--time")?;
                budget = Some(Budget::Timed { limit_ms });
            }
            "--swaps" => {
                config.swaps = parse_value(args, &mut i, "--swaps")?;
            }
            "--max-ticks" => {
                config.max_ticks = parse_value(args, &mut i, "--max-ticks")?;
            }
            "--json" => {
                config.json = true;
            }
            other => {
                return Err(anyhow!("autoplay: unknown argument: {}", other));
            }
        }
        i += 1;
    }

    if let Some(budget) = budget {
        config.round.budget = budget;
    }
    Ok(config)
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T> {
    *i += 1;
    let v = args
        .get(*i)
        .ok_or_else(|| anyhow!("autoplay: missing value for {}", flag))?;
    v.parse::<T>()
        .map_err(|_| anyhow!("autoplay: invalid {} value: {}", flag, v))
}

/// Tracks the score the way a frontend would, and logs the rest.
#[derive(Default)]
struct ConsoleHooks {
    score: u32,
    best_combo: u32,
    matches: u32,
    fails: u32,
}

impl Scoreboard for ConsoleHooks {
    fn add_points(&mut self, points: u32) {
        self.score += points;
        debug!(points, total = self.score, "points");
    }
    fn update_combo(&mut self, combo: u32, _remaining: u32) {
        self.best_combo = self.best_combo.max(combo);
    }
}

impl RoundClock for ConsoleHooks {
    fn round_ended(&mut self) {
        info!(score = self.score, "round over");
    }
}

impl SoundBank for ConsoleHooks {
    fn play(&mut self, cue: AudioCue) {
        match cue {
            AudioCue::MatchSuccess => self.matches += 1,
            AudioCue::MatchFail => self.fails += 1,
            _ => {}
        }
        debug!(cue = cue.as_str(), "cue");
    }
}

impl TileView for ConsoleHooks {}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_args(&args)?;

    let mut round = RoundController::new(config.round)
        .map_err(|e| anyhow!("autoplay: bad round config: {}", e))?;
    let mut hooks = ConsoleHooks::default();
    round.start(&mut hooks);
    info!(
        seed = config.round.seed,
        width = config.round.width,
        height = config.round.height,
        "autoplay started"
    );

    // Separate stream from the round's own rng, so probing does not
    // disturb the board replay for a given seed
    let mut picker = SimpleRng::new(config.round.seed ^ 0x9e37_79b9);
    let mut swaps_left = config.swaps;
    let mut ticks: u64 = 0;
    let mut was_movable = false;

    while round.phase() != Phase::Ended {
        if ticks >= config.max_ticks {
            round.close();
        }

        if round.is_movable() {
            if !was_movable && config.json {
                println!("{}", serde_json::to_string(&round.snapshot())?);
            }
            was_movable = true;

            if swaps_left == 0 {
                round.close();
            } else if ticks < config.max_ticks {
                let a = random_cell(&mut picker, &config.round);
                let b = a + random_direction(&mut picker);
                if let SwapOutcome::Applied(_) = round.request_swap(a, b, &mut hooks) {
                    swaps_left -= 1;
                    was_movable = false;
                }
            }
        } else {
            was_movable = false;
        }

        round.tick(TICK_MS, &mut hooks);
        ticks += 1;
    }

    if config.json {
        println!("{}", serde_json::to_string(&round.snapshot())?);
    } else {
        println!("{}", round.grid());
        println!(
            "score {}  best combo {}  matches {}  fails {}  ticks {}",
            hooks.score, hooks.best_combo, hooks.matches, hooks.fails, ticks
        );
    }
    Ok(())
}

fn random_cell(picker: &mut SimpleRng, config: &RoundConfig) -> Point {
    let x = picker.next_range(config.width as u32) as i8;
    let y = picker.next_range(config.height as u32) as i8;
    Point::new(x, y)
}

fn random_direction(picker: &mut SimpleRng) -> Point {
    gemfall::types::DIRECTIONS[picker.next_range(4) as usize]
}
