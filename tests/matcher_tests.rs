use std::collections::BTreeSet;

use gem_crush::core::{find_matches_by, Grid};
use gem_crush::types::{Coord, WorldPos};
use proptest::prelude::*;

fn grid_from(rows: &[Vec<Option<u8>>]) -> Grid<u8> {
    let h = rows.len() as i32;
    let w = rows.first().map(|r| r.len()).unwrap_or(0) as i32;
    let mut grid = Grid::vertical(w, h, 1.0, WorldPos::default());
    for (y, row) in rows.iter().enumerate() {
        for (x, v) in row.iter().enumerate() {
            grid.set(x as i32, y as i32, *v);
        }
    }
    grid
}

/// Run lengths through each cell, measured outward in both directions
fn reference_matches(grid: &Grid<u8>) -> BTreeSet<Coord> {
    let mut out = BTreeSet::new();
    for c in grid.coords() {
        let Some(&v) = grid.get_at(c) else { continue };
        let run = |dx: i32, dy: i32| {
            let mut n = 0;
            let mut p = c.offset(dx, dy);
            while grid.get_at(p) == Some(&v) {
                n += 1;
                p = p.offset(dx, dy);
            }
            n
        };
        if run(1, 0) + run(-1, 0) + 1 >= 3 || run(0, 1) + run(0, -1) + 1 >= 3 {
            out.insert(c);
        }
    }
    out
}

#[test]
fn row_of_five_yields_all_five() {
    let grid = grid_from(&[
        vec![Some(1), Some(1), Some(1), Some(1), Some(1)],
        vec![Some(2), Some(3), Some(2), Some(3), Some(2)],
    ]);
    let found = find_matches_by(&grid, |v| *v);
    let expected: BTreeSet<Coord> = (0..5).map(|x| Coord::new(x, 0)).collect();
    assert_eq!(found, expected);
}

#[test]
fn crossing_runs_share_their_corner_once() {
    let grid = grid_from(&[
        vec![Some(1), Some(1), Some(1)],
        vec![Some(1), Some(2), Some(3)],
        vec![Some(1), Some(3), Some(2)],
    ]);
    let found = find_matches_by(&grid, |v| *v);
    assert_eq!(found.len(), 5);
    assert!(found.contains(&Coord::new(0, 0)));
}

#[test]
fn checkerboard_has_no_match() {
    let grid = grid_from(&[
        vec![Some(1), Some(2), Some(1), Some(2)],
        vec![Some(2), Some(1), Some(2), Some(1)],
        vec![Some(1), Some(2), Some(1), Some(2)],
    ]);
    assert!(find_matches_by(&grid, |v| *v).is_empty());
}

#[test]
fn empty_slots_break_runs() {
    let grid = grid_from(&[vec![Some(1), None, Some(1), Some(1)]]);
    assert!(find_matches_by(&grid, |v| *v).is_empty());
}

#[test]
fn boards_narrower_than_a_run_are_fine() {
    let grid = grid_from(&[vec![Some(1), Some(1)]]);
    assert!(find_matches_by(&grid, |v| *v).is_empty());
}

proptest! {
    #[test]
    fn triple_scan_agrees_with_run_lengths(
        rows in (1usize..7, 1usize..7).prop_flat_map(|(w, h)| {
            prop::collection::vec(
                prop::collection::vec(prop::option::weighted(0.9, 0u8..3), w),
                h,
            )
        })
    ) {
        let grid = grid_from(&rows);
        prop_assert_eq!(find_matches_by(&grid, |v| *v), reference_matches(&grid));
    }
}
