//! Match detection
//!
//! A cell participates in a match when it heads a straight run of three,
//! sits in the middle of one, or completes a 2x2 block. Detection runs
//! outward from one origin cell; chained mode then closes the result over
//! every matched cell, so a single call collects the whole connected
//! group. The origin itself enters the set through that closure (matched
//! neighbors report it back), never directly.

use arrayvec::ArrayVec;

use crate::core::grid::Grid;
use crate::types::{Point, DIRECTIONS};

/// Deduplicated set of matched coordinates, insertion ordered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSet {
    points: Vec<Point>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Insert without duplicating. Returns true when the point was new.
    pub fn insert(&mut self, p: Point) -> bool {
        if self.points.contains(&p) {
            return false;
        }
        self.points.push(p);
        true
    }

    pub fn contains(&self, p: Point) -> bool {
        self.points.contains(&p)
    }

    pub fn merge(&mut self, other: &MatchSet) {
        for &p in &other.points {
            self.insert(p);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Collect every cell matching with `origin`.
///
/// Non-chained calls report only the cells discovered from `origin`
/// (excluding `origin`). Chained calls expand each discovered cell in
/// turn until the set stops growing, which folds connected runs and
/// blocks into one group and re-includes the origin.
///
/// Origins holding `Empty` or `Hole` (or out of bounds) yield an empty set.
pub fn detect(grid: &Grid, origin: Point, chained: bool) -> MatchSet {
    let mut connected = MatchSet::new();
    if !grid.is_tile(origin) {
        return connected;
    }

    collect(grid, origin, &mut connected);
    if !chained {
        return connected;
    }

    // Worklist closure over the growing set. Each expansion is
    // non-chained, so dedup insertion guarantees termination.
    let mut i = 0;
    while i < connected.len() {
        let next = connected.points()[i];
        let mut sub = MatchSet::new();
        collect(grid, next, &mut sub);
        connected.merge(&sub);
        i += 1;
    }

    connected
}

/// One-origin scan: runs of three, middle-of-run, and 2x2 blocks
fn collect(grid: &Grid, origin: Point, out: &mut MatchSet) {
    let val = grid.get(origin);

    // Two or more same cells straight out in one direction
    for dir in DIRECTIONS {
        let mut line: ArrayVec<Point, 2> = ArrayVec::new();
        for step in 1..=2i8 {
            let check = origin + dir * step;
            if grid.get(check) == val {
                line.push(check);
            }
        }
        if line.len() > 1 {
            for &p in &line {
                out.insert(p);
            }
        }
    }

    // Origin in the middle of a vertical or horizontal run
    for i in 0..2 {
        let mut line: ArrayVec<Point, 2> = ArrayVec::new();
        for check in [origin + DIRECTIONS[i], origin + DIRECTIONS[i + 2]] {
            if grid.get(check) == val {
                line.push(check);
            }
        }
        if line.len() > 1 {
            for &p in &line {
                out.insert(p);
            }
        }
    }

    // 2x2 block: each direction paired with its clockwise neighbor,
    // all three remaining corners must hold the same kind
    for i in 0..4 {
        let next = (i + 1) % 4;
        let corners = [
            origin + DIRECTIONS[i],
            origin + DIRECTIONS[next],
            origin + DIRECTIONS[i] + DIRECTIONS[next],
        ];
        let mut square: ArrayVec<Point, 3> = ArrayVec::new();
        for check in corners {
            if grid.get(check) == val {
                square.push(check);
            }
        }
        if square.len() > 2 {
            for &p in &square {
                out.insert(p);
            }
        }
    }
}

/// True when any cell on the board currently participates in a match
pub fn has_any_match(grid: &Grid) -> bool {
    for y in 0..grid.height() as i8 {
        for x in 0..grid.width() as i8 {
            let p = Point::new(x, y);
            if !grid.is_tile(p) {
                continue;
            }
            if !detect(grid, p, false).is_empty() {
                return true;
            }
        }
    }
    false
}
