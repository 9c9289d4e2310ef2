//! Core types shared across the simulation
//! Pure data types plus the tuning constants for board size and timing

use std::fmt;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Default board dimensions
pub const BOARD_WIDTH: u8 = 9;
pub const BOARD_HEIGHT: u8 = 12;

/// Upper bound on configurable board dimensions. Match scans look up to
/// two cells past a coordinate, so everything must stay inside `i8`.
pub const MAX_BOARD_DIM: u8 = 125;

/// Default number of distinct tile kinds
pub const TILE_KINDS: u8 = 5;

/// Default move allowance for move-limited rounds
pub const DEFAULT_MOVES: u32 = 15;

/// Simulation timing constants (in milliseconds)
pub const TICK_MS: u32 = 16;
pub const GRAVITY_LOCK_MS: u32 = 300;
pub const PAYOUT_DELAY_MS: u32 = 500;
pub const PAYOUT_DRAIN_MS: u32 = 1000;

/// Scoring constants
pub const POINTS_PER_PIECE: u32 = 25;
pub const COMBO_CAP: u32 = 8;
pub const BONUS_PER_UNIT: u32 = 100;

/// Grid coordinate. `x` grows rightward, `y` grows downward; negative `y`
/// is the staging area above the board where refill tiles spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i8,
    pub y: i8,
}

impl Point {
    pub const UP: Point = Point::new(0, -1);
    pub const RIGHT: Point = Point::new(1, 0);
    pub const DOWN: Point = Point::new(0, 1);
    pub const LEFT: Point = Point::new(-1, 0);

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// True when the points differ by exactly one step on exactly one axis
    pub fn is_adjacent(self, other: Point) -> bool {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        dx + dy == 1
    }
}

/// The four orthogonal directions. Order matters: the 2x2 block check
/// pairs each direction with its clockwise neighbor.
pub const DIRECTIONS: [Point; 4] = [Point::UP, Point::RIGHT, Point::DOWN, Point::LEFT];

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<i8> for Point {
    type Output = Point;

    fn mul(self, rhs: i8) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Tile kind identifier, valid in `1..=kinds` for the configured kind count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKind(u8);

impl TileKind {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Contents of one board cell.
///
/// `Hole` marks a dead cell that never holds a tile. Out-of-bounds reads
/// also report `Hole`, so edge scans fall through without bounds branches
/// at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Hole,
    Empty,
    Tile(TileKind),
}

impl Cell {
    /// Numeric encoding: -1 hole, 0 empty, k > 0 tile kind
    pub fn as_i8(self) -> i8 {
        match self {
            Cell::Hole => -1,
            Cell::Empty => 0,
            Cell::Tile(kind) => kind.value() as i8,
        }
    }

    pub fn from_i8(value: i8) -> Cell {
        match value {
            v if v < 0 => Cell::Hole,
            0 => Cell::Empty,
            v => Cell::Tile(TileKind::new(v as u8)),
        }
    }

    pub fn is_tile(self) -> bool {
        matches!(self, Cell::Tile(_))
    }

    pub fn kind(self) -> Option<TileKind> {
        match self {
            Cell::Tile(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Sound events the round raises toward the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    FlipTry,
    MatchFail,
    MatchSuccess,
    GameOver,
}

impl AudioCue {
    /// Convert to string (for host-side clip lookup)
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::FlipTry => "flipTry",
            AudioCue::MatchFail => "matchFail",
            AudioCue::MatchSuccess => "matchSuccess",
            AudioCue::GameOver => "gameOver",
        }
    }
}

/// Round lifecycle phase. Transitions are one-way:
/// Ready -> Started -> Closing -> Ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ready,
    Started,
    Closing,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Started => "started",
            Phase::Closing => "closing",
            Phase::Ended => "ended",
        }
    }
}

/// Round budget: a wall-clock time limit or a move allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Timed { limit_ms: u32 },
    Moves { limit: u32 },
}

/// Level layout: which cells are playable and which are holes.
/// Row-major, `holes[y * width + x]` true for dead cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    width: u8,
    height: u8,
    holes: Vec<bool>,
}

impl Layout {
    /// Fully playable rectangle with no holes
    pub fn open(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            holes: vec![false; width as usize * height as usize],
        }
    }

    /// Parse from rows of `.` (playable) and `#` (hole).
    /// Returns None for empty input, ragged rows, or other characters.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || width > u8::MAX as usize || height > u8::MAX as usize {
            return None;
        }

        let mut holes = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return None;
            }
            for ch in row.chars() {
                match ch {
                    '.' => holes.push(false),
                    '#' => holes.push(true),
                    _ => return None,
                }
            }
        }

        Some(Self {
            width: width as u8,
            height: height as u8,
            holes,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// True for dead cells; out-of-range coordinates also read as holes
    pub fn is_hole(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.holes[y as usize * self.width as usize + x as usize]
    }

    pub fn set_hole(&mut self, x: u8, y: u8, hole: bool) {
        if x < self.width && y < self.height {
            self.holes[y as usize * self.width as usize + x as usize] = hole;
        }
    }

    /// Number of playable cells
    pub fn playable_cells(&self) -> usize {
        self.holes.iter().filter(|&&h| !h).count()
    }
}

/// Round configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub width: u8,
    pub height: u8,
    pub kinds: u8,
    pub budget: Budget,
    pub seed: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            kinds: TILE_KINDS,
            budget: Budget::Moves {
                limit: DEFAULT_MOVES,
            },
            seed: 1,
        }
    }
}

/// Configuration errors reported by round construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NoKinds,
    ZeroDimension,
    OversizedBoard,
    LayoutMismatch,
    EmptyBudget,
}

impl ConfigError {
    pub fn code(self) -> &'static str {
        match self {
            ConfigError::NoKinds => "no_kinds",
            ConfigError::ZeroDimension
            | ConfigError::OversizedBoard
            | ConfigError::LayoutMismatch
            | ConfigError::EmptyBudget => "invalid_config",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfigError::NoKinds => "tile kind count must be at least 1",
            ConfigError::ZeroDimension => "board dimensions must be positive",
            ConfigError::OversizedBoard => "board dimensions are limited to 125",
            ConfigError::LayoutMismatch => "layout dimensions do not match the config",
            ConfigError::EmptyBudget => "budget must allow at least one move or millisecond",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ConfigError {}
