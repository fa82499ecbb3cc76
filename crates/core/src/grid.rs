//! Grid module - fixed-size 2D container with world-space mapping
//!
//! A `Grid<T>` stores `width × height` optional values in a flat vector.
//! Out-of-range reads return `None` and out-of-range writes are ignored, so callers
//! never have to bounds-check before probing a neighbour.
//!
//! The mapping between grid coordinates and world positions goes through a
//! [`CoordinateConverter`]. Only [`VerticalConverter`] (plain axis-aligned 2D with
//! `y` pointing up) ships; other projections plug in through [`Grid::with_converter`].
//!
//! Every write notifies the registered observers with the coordinate and the new
//! value. Presentation layers subscribe to keep visuals in sync.

use std::fmt;

use crate::types::{Coord, WorldPos};

/// Mapping between grid coordinates and world space.
pub trait CoordinateConverter {
    /// World position of the cell's lower-left corner
    fn grid_to_world(&self, x: i32, y: i32, cell_size: f32, origin: WorldPos) -> WorldPos;

    /// World position of the cell's midpoint
    fn grid_to_world_center(&self, x: i32, y: i32, cell_size: f32, origin: WorldPos) -> WorldPos;

    /// Grid coordinate containing `pos` (may be out of bounds)
    fn world_to_grid(&self, pos: WorldPos, cell_size: f32, origin: WorldPos) -> Coord;
}

/// Axis-aligned 2D projection: one world unit per `cell_size`, `y` up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalConverter;

impl CoordinateConverter for VerticalConverter {
    fn grid_to_world(&self, x: i32, y: i32, cell_size: f32, origin: WorldPos) -> WorldPos {
        WorldPos::new(
            x as f32 * cell_size + origin.x,
            y as f32 * cell_size + origin.y,
        )
    }

    fn grid_to_world_center(&self, x: i32, y: i32, cell_size: f32, origin: WorldPos) -> WorldPos {
        let half = cell_size * 0.5;
        WorldPos::new(
            x as f32 * cell_size + half + origin.x,
            y as f32 * cell_size + half + origin.y,
        )
    }

    fn world_to_grid(&self, pos: WorldPos, cell_size: f32, origin: WorldPos) -> Coord {
        let gx = (pos.x - origin.x) / cell_size;
        let gy = (pos.y - origin.y) / cell_size;
        Coord::new(floor_to_cell(gx), floor_to_cell(gy))
    }
}

/// NaN lands far out of bounds instead of on 0
fn floor_to_cell(v: f32) -> i32 {
    if v.is_nan() {
        return i32::MIN;
    }
    v.floor() as i32
}

/// Handle returned by [`Grid::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer<T> = Box<dyn FnMut(Coord, Option<&T>)>;

/// Fixed-size 2D grid of optional values
pub struct Grid<T> {
    width: i32,
    height: i32,
    cell_size: f32,
    origin: WorldPos,
    /// Flat storage, row-major order (y * width + x)
    cells: Vec<Option<T>>,
    converter: Box<dyn CoordinateConverter>,
    observers: Vec<(ObserverId, Observer<T>)>,
    next_observer: u64,
}

impl<T> Grid<T> {
    /// Create an empty grid using the vertical (axis-aligned) projection
    pub fn vertical(width: i32, height: i32, cell_size: f32, origin: WorldPos) -> Self {
        Self::with_converter(width, height, cell_size, origin, Box::new(VerticalConverter))
    }

    /// Create an empty grid with a custom projection
    ///
    /// Negative dimensions are treated as zero.
    pub fn with_converter(
        width: i32,
        height: i32,
        cell_size: f32,
        origin: WorldPos,
        converter: Box<dyn CoordinateConverter>,
    ) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width as usize) * (height as usize);
        let mut cells = Vec::with_capacity(len);
        cells.resize_with(len, || None);

        Self {
            width,
            height,
            cell_size,
            origin,
            cells,
            converter,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.is_in_bounds(x, y) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Value at `(x, y)`, `None` when empty or out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.index(x, y).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_at(&self, c: Coord) -> Option<&T> {
        self.get(c.x, c.y)
    }

    /// True for empty in-bounds slots and for every out-of-bounds coordinate
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none()
    }

    /// Write `value` into `(x, y)`
    ///
    /// Returns false (and changes nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, value: Option<T>) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        self.cells[i] = value;
        self.notify(Coord::new(x, y), i);
        true
    }

    pub fn set_at(&mut self, c: Coord, value: Option<T>) -> bool {
        self.set(c.x, c.y, value)
    }

    /// Remove and return the value at `(x, y)`
    pub fn take(&mut self, x: i32, y: i32) -> Option<T> {
        let i = self.index(x, y)?;
        let old = self.cells[i].take();
        if old.is_some() {
            self.notify(Coord::new(x, y), i);
        }
        old
    }

    /// Exchange the contents of two slots
    ///
    /// Returns false when either coordinate is out of bounds.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a.x, a.y), self.index(b.x, b.y)) else {
            return false;
        };
        if ia == ib {
            return true;
        }
        self.cells.swap(ia, ib);
        self.notify(a, ia);
        self.notify(b, ib);
        true
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        for c in self.coords().collect::<Vec<_>>() {
            if self.get(c.x, c.y).is_some() {
                self.set(c.x, c.y, None);
            }
        }
    }

    /// Grid coordinate containing the world position
    pub fn world_to_grid(&self, pos: WorldPos) -> Coord {
        self.converter.world_to_grid(pos, self.cell_size, self.origin)
    }

    /// World position of the center of `(x, y)`
    pub fn grid_to_world_center(&self, x: i32, y: i32) -> WorldPos {
        self.converter
            .grid_to_world_center(x, y, self.cell_size, self.origin)
    }

    /// World position of the lower-left corner of `(x, y)`
    pub fn grid_to_world(&self, x: i32, y: i32) -> WorldPos {
        self.converter.grid_to_world(x, y, self.cell_size, self.origin)
    }

    pub fn get_world(&self, pos: WorldPos) -> Option<&T> {
        self.get_at(self.world_to_grid(pos))
    }

    pub fn set_world(&mut self, pos: WorldPos, value: Option<T>) -> bool {
        let c = self.world_to_grid(pos);
        self.set(c.x, c.y, value)
    }

    /// Every in-bounds coordinate, column by column, bottom to top
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |x| (0..h).map(move |y| Coord::new(x, y)))
    }

    /// Occupied slots in [`coords`](Self::coords) order
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, &T)> + '_ {
        self.coords()
            .filter_map(move |c| self.get(c.x, c.y).map(|v| (c, v)))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Register a change observer, called after every write with the new value
    pub fn subscribe(&mut self, observer: impl FnMut(Coord, Option<&T>) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, at: Coord, index: usize) {
        let value = self.cells[index].as_ref();
        for (_, observer) in self.observers.iter_mut() {
            observer(at, value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cell_size", &self.cell_size)
            .field("origin", &self.origin)
            .field("cells", &self.cells)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_grid_index_calculation() {
        let grid: Grid<u8> = Grid::vertical(4, 3, 1.0, WorldPos::default());
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(3, 0), Some(3));
        assert_eq!(grid.index(0, 1), Some(4));
        assert_eq!(grid.index(3, 2), Some(11));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(4, 0), None);
        assert_eq!(grid.index(0, 3), None);
    }

    #[test]
    fn test_non_finite_world_positions_are_out_of_bounds() {
        let grid: Grid<u8> = Grid::vertical(4, 4, 1.0, WorldPos::default());
        for pos in [
            WorldPos::new(f32::NAN, f32::NAN),
            WorldPos::new(f32::NAN, 1.5),
            WorldPos::new(1.5, f32::INFINITY),
            WorldPos::new(f32::NEG_INFINITY, 0.5),
        ] {
            let c = grid.world_to_grid(pos);
            assert!(!grid.is_in_bounds(c.x, c.y), "{:?} -> {:?}", pos, c);
        }
        assert_eq!(grid.world_to_grid(WorldPos::new(f32::NAN, 0.5)).x, i32::MIN);
    }

    #[test]
    fn test_out_of_bounds_write_is_ignored() {
        let mut grid: Grid<u8> = Grid::vertical(2, 2, 1.0, WorldPos::default());
        assert!(!grid.set(2, 0, Some(7)));
        assert!(!grid.set(0, -1, Some(7)));
        assert_eq!(grid.get(2, 0), None);
        assert!(grid.occupied().next().is_none());
    }

    #[test]
    fn test_world_center_is_cell_midpoint() {
        let grid: Grid<u8> = Grid::vertical(5, 5, 2.0, WorldPos::new(-5.0, 1.0));
        assert_eq!(grid.grid_to_world(0, 0), WorldPos::new(-5.0, 1.0));
        assert_eq!(grid.grid_to_world_center(0, 0), WorldPos::new(-4.0, 2.0));
        assert_eq!(grid.grid_to_world_center(2, 3), WorldPos::new(0.0, 8.0));
    }

    #[test]
    fn test_world_to_grid_floors() {
        let grid: Grid<u8> = Grid::vertical(5, 5, 2.0, WorldPos::new(-5.0, 1.0));
        assert_eq!(grid.world_to_grid(WorldPos::new(-4.0, 2.0)), Coord::new(0, 0));
        assert_eq!(grid.world_to_grid(WorldPos::new(-3.01, 2.99)), Coord::new(0, 0));
        assert_eq!(grid.world_to_grid(WorldPos::new(-3.0, 3.0)), Coord::new(1, 1));
        // Left of / below the origin maps to negative cells.
        assert_eq!(grid.world_to_grid(WorldPos::new(-5.5, 0.5)), Coord::new(-1, -1));
    }

    #[test]
    fn test_center_round_trips_through_world_to_grid() {
        let grid: Grid<u8> = Grid::vertical(6, 4, 0.75, WorldPos::new(3.0, -2.0));
        for c in grid.coords().collect::<Vec<_>>() {
            let w = grid.grid_to_world_center(c.x, c.y);
            assert_eq!(grid.world_to_grid(w), c);
        }
    }

    #[test]
    fn test_observer_sees_every_write() {
        let mut grid: Grid<u8> = Grid::vertical(3, 3, 1.0, WorldPos::default());
        let seen: Rc<RefCell<Vec<(Coord, Option<u8>)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        grid.subscribe(move |c, v| sink.borrow_mut().push((c, v.copied())));

        grid.set(1, 1, Some(4));
        grid.set(5, 5, Some(9)); // out of bounds: no notification
        grid.swap(Coord::new(1, 1), Coord::new(0, 2));
        assert_eq!(grid.take(0, 2), Some(4));

        assert_eq!(
            *seen.borrow(),
            vec![
                (Coord::new(1, 1), Some(4)),
                (Coord::new(1, 1), None),
                (Coord::new(0, 2), Some(4)),
                (Coord::new(0, 2), None),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut grid: Grid<u8> = Grid::vertical(2, 2, 1.0, WorldPos::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = grid.subscribe(move |_, _| *sink.borrow_mut() += 1);

        grid.set(0, 0, Some(1));
        assert!(grid.unsubscribe(id));
        assert!(!grid.unsubscribe(id));
        grid.set(0, 1, Some(1));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(grid.observer_count(), 0);
    }

    #[test]
    fn test_coords_are_column_major() {
        let grid: Grid<u8> = Grid::vertical(2, 2, 1.0, WorldPos::default());
        let coords: Vec<_> = grid.coords().collect();
        assert_eq!(
            coords,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1)
            ]
        );
    }
}
