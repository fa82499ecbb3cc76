//! Match detection - runs of three or more equal keys
//!
//! Two passes over the grid: every horizontal triple, then every vertical triple.
//! When all three slots are occupied and share a key, the three coordinates join
//! the result. Runs longer than three fall out of overlapping triples, so a row
//! of five yields all five coordinates. The result is a `BTreeSet`, which both
//! deduplicates cells that sit on a horizontal and a vertical run and iterates in
//! ascending `(x, y)` order.

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::types::{Coord, Gem, MIN_RUN};

/// Coordinates of every cell taking part in a run, keyed by `key`
pub fn find_matches_by<T, K, F>(grid: &Grid<T>, key: F) -> BTreeSet<Coord>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut matches = BTreeSet::new();
    let (w, h) = (grid.width(), grid.height());

    let mut check = |cells: [Coord; 3]| {
        let mut keys = cells.iter().map(|c| grid.get_at(*c).map(&key));
        let (Some(Some(a)), Some(Some(b)), Some(Some(c))) = (keys.next(), keys.next(), keys.next())
        else {
            return;
        };
        if a == b && b == c {
            matches.extend(cells);
        }
    };

    // Horizontal
    for y in 0..h {
        for x in 0..(w - (MIN_RUN - 1)) {
            check([Coord::new(x, y), Coord::new(x + 1, y), Coord::new(x + 2, y)]);
        }
    }

    // Vertical
    for x in 0..w {
        for y in 0..(h - (MIN_RUN - 1)) {
            check([Coord::new(x, y), Coord::new(x, y + 1), Coord::new(x, y + 2)]);
        }
    }

    matches
}

/// Coordinates of every gem taking part in a same-kind run
pub fn find_matches(grid: &Grid<Gem>) -> BTreeSet<Coord> {
    find_matches_by(grid, |gem| gem.kind)
}
