use serde::Serialize;

use crate::types::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
    pub board: Vec<Vec<i8>>,
    pub phase: Phase,
    pub combo: u32,
    pub remaining: u32,
    pub limit: u32,
    pub in_flight: usize,
    pub movable: bool,
}

impl RoundSnapshot {
    pub fn clear(&mut self) {
        self.board.clear();
        self.phase = Phase::Ready;
        self.combo = 0;
        self.remaining = 0;
        self.limit = 0;
        self.in_flight = 0;
        self.movable = false;
    }

    pub fn at_rest(&self) -> bool {
        self.in_flight == 0
    }
}

impl Default for RoundSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: Vec::new(),
            phase: Phase::Ready,
            combo: 0,
            remaining: 0,
            limit: 0,
            in_flight: 0,
            movable: false,
        };
        s.clear();
        s
    }
}
