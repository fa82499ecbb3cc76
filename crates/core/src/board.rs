//! Board module - the gem grid and its mutations
//!
//! The board owns a `Grid<Gem>` plus the [`GemSource`] that creates new gems.
//! It exposes the building blocks of a turn (swap, explode, collapse, refill) as
//! plain synchronous operations; sequencing and pacing live in the engine.
//!
//! Coordinates: `(x, y)`, `x` from the left, `y` from the bottom. Gravity pulls
//! towards `y = 0`.

use std::collections::BTreeSet;

use log::debug;

use crate::config::{BoardConfig, ConfigError};
use crate::grid::{Grid, ObserverId};
use crate::matcher::find_matches;
use crate::rng::GemSource;
use crate::types::{Cell, Coord, Gem, GemKind, WorldPos};

/// One gem moved by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub gem: Gem,
    pub from: Coord,
    pub to: Coord,
}

#[derive(Debug)]
pub struct Board {
    grid: Grid<Gem>,
    source: GemSource,
}

impl Board {
    /// Create a fully populated board
    pub fn new(config: &BoardConfig) -> Result<Self, ConfigError> {
        let mut board = Self::empty(config)?;
        board.populate();
        Ok(board)
    }

    /// Create a board with every slot empty
    pub fn empty(config: &BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: Grid::vertical(config.width, config.height, config.cell_size, config.origin),
            source: GemSource::new(config.palette.clone(), config.seed),
        })
    }

    /// Create a board from an explicit layout
    ///
    /// `rows[y][x]`, row 0 is the bottom. Width and height come from the layout;
    /// palette, seed, cell size and origin from `config`. Refills still draw from
    /// the configured palette.
    pub fn from_kinds(
        config: &BoardConfig,
        rows: &[Vec<Option<GemKind>>],
    ) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(ConfigError::RaggedLayout {
                    row,
                    found: cells.len(),
                    expected: width,
                });
            }
        }

        let shaped = BoardConfig {
            width: width as i32,
            height: height as i32,
            ..config.clone()
        };
        let mut board = Self::empty(&shaped)?;
        for (y, cells) in rows.iter().enumerate() {
            for (x, kind) in cells.iter().enumerate() {
                if let Some(kind) = kind {
                    let gem = board.source.gem_of(*kind);
                    board.grid.set(x as i32, y as i32, Some(gem));
                }
            }
        }
        Ok(board)
    }

    pub fn grid(&self) -> &Grid<Gem> {
        &self.grid
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn palette(&self) -> &[GemKind] {
        self.source.palette()
    }

    /// RNG state; a board built with this seed continues the same refill stream
    pub fn seed(&self) -> u32 {
        self.source.seed()
    }

    pub fn get(&self, c: Coord) -> Cell {
        self.grid.get_at(c).copied()
    }

    pub fn kind_at(&self, c: Coord) -> Option<GemKind> {
        self.grid.get_at(c).map(|g| g.kind)
    }

    pub fn is_in_bounds(&self, c: Coord) -> bool {
        self.grid.is_in_bounds(c.x, c.y)
    }

    /// In bounds and occupied
    pub fn is_selectable(&self, c: Coord) -> bool {
        self.grid.get_at(c).is_some()
    }

    pub fn world_to_grid(&self, pos: WorldPos) -> Coord {
        self.grid.world_to_grid(pos)
    }

    pub fn grid_to_world_center(&self, c: Coord) -> WorldPos {
        self.grid.grid_to_world_center(c.x, c.y)
    }

    /// Register a cell-change observer on the underlying grid
    pub fn subscribe(&mut self, observer: impl FnMut(Coord, Option<&Gem>) + 'static) -> ObserverId {
        self.grid.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.grid.unsubscribe(id)
    }

    /// Place a freshly generated gem at `c`
    ///
    /// Returns `None` when `c` is out of bounds.
    pub fn spawn_gem(&mut self, c: Coord) -> Option<Gem> {
        if !self.is_in_bounds(c) {
            return None;
        }
        let gem = self.source.next_gem();
        self.grid.set_at(c, Some(gem));
        Some(gem)
    }

    /// Fill every slot with a new gem, column by column, bottom to top
    pub fn populate(&mut self) {
        for c in self.grid.coords().collect::<Vec<_>>() {
            self.spawn_gem(c);
        }
    }

    /// Clear the board and repopulate it from `seed`
    pub fn reset(&mut self, seed: u32) {
        self.grid.clear();
        self.source.reseed(seed);
        self.populate();
    }

    /// Exchange two slots; false when either is out of bounds
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        self.grid.swap(a, b)
    }

    /// Coordinates of every gem in a run, ascending `(x, y)`
    pub fn find_matches(&self) -> BTreeSet<Coord> {
        find_matches(&self.grid)
    }

    /// Remove the gems at `coords`, in iteration order
    ///
    /// Empty or out-of-bounds coordinates are skipped.
    pub fn explode<I>(&mut self, coords: I) -> Vec<(Coord, Gem)>
    where
        I: IntoIterator<Item = Coord>,
    {
        coords
            .into_iter()
            .filter_map(|c| self.grid.take(c.x, c.y).map(|gem| (c, gem)))
            .collect()
    }

    /// Let gems fall into empty slots below them
    ///
    /// Columns left to right, slots bottom to top. Each empty slot pulls down the
    /// nearest gem above it, so the relative order inside a column never changes
    /// and afterwards every empty slot sits above every gem of its column.
    pub fn collapse(&mut self) -> Vec<Fall> {
        let mut falls = Vec::new();
        let (w, h) = (self.width(), self.height());

        for x in 0..w {
            for y in 0..h {
                if !self.grid.is_empty_at(x, y) {
                    continue;
                }
                for above in (y + 1)..h {
                    if let Some(gem) = self.grid.take(x, above) {
                        self.grid.set(x, y, Some(gem));
                        falls.push(Fall {
                            gem,
                            from: Coord::new(x, above),
                            to: Coord::new(x, y),
                        });
                        break;
                    }
                }
            }
        }

        if !falls.is_empty() {
            debug!("[Board] collapse moved {} gems", falls.len());
        }
        falls
    }

    /// Spawn a new gem into every empty slot, column by column, bottom to top
    pub fn refill(&mut self) -> Vec<(Coord, Gem)> {
        let empty: Vec<Coord> = self
            .grid
            .coords()
            .filter(|c| self.grid.is_empty_at(c.x, c.y))
            .collect();

        empty
            .into_iter()
            .filter_map(|c| self.spawn_gem(c).map(|gem| (c, gem)))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.grid.is_full()
    }

    /// Kinds per cell, row-major (`y * width + x`)
    pub fn write_kinds(&self, out: &mut Vec<Option<GemKind>>) {
        out.clear();
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.push(self.grid.get(x, y).map(|g| g.kind));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GemKind::{Blue as B, Red as R};

    fn config() -> BoardConfig {
        BoardConfig {
            palette: vec![R, B],
            ..BoardConfig::default()
        }
    }

    #[test]
    fn test_new_board_is_full() {
        let board = Board::new(&config()).unwrap();
        assert!(board.is_full());
        assert_eq!(board.width(), 8);
        assert_eq!(board.height(), 8);
    }

    #[test]
    fn test_same_seed_same_board() {
        let a = Board::new(&config()).unwrap();
        let b = Board::new(&config()).unwrap();
        let (mut ka, mut kb) = (Vec::new(), Vec::new());
        a.write_kinds(&mut ka);
        b.write_kinds(&mut kb);
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_from_kinds_rejects_ragged_rows() {
        let err = Board::from_kinds(&config(), &[vec![Some(R), Some(B)], vec![Some(R)]]);
        assert!(matches!(
            err,
            Err(ConfigError::RaggedLayout { row: 1, found: 1, expected: 2 })
        ));
    }

    #[test]
    fn test_collapse_pulls_nearest_gem_down() {
        // column 0 bottom to top: R, _, _, B
        let mut board = Board::from_kinds(
            &config(),
            &[vec![Some(R)], vec![None], vec![None], vec![Some(B)]],
        )
        .unwrap();

        let falls = board.collapse();
        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].from, Coord::new(0, 3));
        assert_eq!(falls[0].to, Coord::new(0, 1));
        assert_eq!(board.kind_at(Coord::new(0, 1)), Some(B));
        assert_eq!(board.kind_at(Coord::new(0, 3)), None);
    }

    #[test]
    fn test_refill_fills_only_empty_slots() {
        let mut board = Board::from_kinds(&config(), &[vec![Some(R), None], vec![None, Some(B)]]).unwrap();
        let before = board.get(Coord::new(0, 0));

        let spawned = board.refill();
        assert_eq!(
            spawned.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            vec![Coord::new(0, 1), Coord::new(1, 0)]
        );
        assert!(board.is_full());
        assert_eq!(board.get(Coord::new(0, 0)), before);
    }

    #[test]
    fn test_explode_skips_empty_and_out_of_bounds() {
        let mut board = Board::from_kinds(&config(), &[vec![Some(R), None]]).unwrap();
        let removed = board.explode([Coord::new(0, 0), Coord::new(1, 0), Coord::new(9, 9)]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, Coord::new(0, 0));
        assert!(!board.is_selectable(Coord::new(0, 0)));
    }
}
