#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake Pilot navigation engine.
//!
//! This crate defines the value types that flow between the external game
//! loop and the engine systems. The game loop owns the snake and the food; on
//! every tick it hands the engine a read-only body snapshot (head first) and
//! the target [`Cell`], and receives a single [`Direction`] back. Grid
//! dimensions are described by [`GridSize`] and never change for the lifetime
//! of an engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: u32,
    y: u32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Cell reached by taking one step in `direction`, if it stays on the grid.
    #[must_use]
    pub fn step(self, direction: Direction, grid: GridSize) -> Option<Cell> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        let next = Cell::new(x, y);
        grid.contains(next).then_some(next)
    }
}

/// Cardinal movement directions available to the snake head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction, in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset applied to a cell as `(dx, dy)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction of the unit step from `from` to `to`.
    ///
    /// Returns `None` unless the two cells are 4-adjacent.
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<Direction> {
        if !from.is_adjacent(to) {
            return None;
        }

        if to.x() > from.x() {
            Some(Self::Right)
        } else if to.x() < from.x() {
            Some(Self::Left)
        } else if to.y() > from.y() {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Dimensions of the playable grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.checked_mul(height).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Row-major offset of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        if index >= self.cell_count() {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let x = u32::try_from(index % width).ok()?;
        let y = u32::try_from(index / width).ok()?;
        Some(Cell::new(x, y))
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
    }

    /// In-bounds 4-adjacent cells, yielded as up, right, down, left.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> NeighborIter {
        let mut neighbors = NeighborIter::default();

        for direction in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            if let Some(next) = cell.step(direction, *self) {
                neighbors.push(next);
            }
        }

        neighbors
    }
}

/// Fixed-capacity iterator over at most four neighbouring cells.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<Cell>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: Cell) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Policy that produced a navigation decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionSource {
    /// A certified A* path toward the target.
    Planner,
    /// The next cell along the Hamiltonian tour, or the first free neighbour.
    CycleFollower,
    /// A bounded shortcut across the Hamiltonian tour.
    Shortcut,
}

/// Single-tick answer produced by the navigation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decision {
    direction: Direction,
    source: DecisionSource,
}

impl Decision {
    /// Creates a decision for the provided direction and source.
    #[must_use]
    pub const fn new(direction: Direction, source: DecisionSource) -> Self {
        Self { direction, source }
    }

    /// Direction the head should move this tick.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Policy that chose the direction.
    #[must_use]
    pub const fn source(&self) -> DecisionSource {
        self.source
    }
}

/// Reasons a body or target snapshot is rejected before any planning happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// The body contains no segments, so there is no head to steer.
    #[error("body snapshot is empty")]
    EmptyBody,
    /// A body segment lies outside the grid.
    #[error("body segment {cell:?} lies outside the grid")]
    SegmentOutOfBounds {
        /// Offending segment.
        cell: Cell,
    },
    /// Two body segments occupy the same cell.
    #[error("body segment {cell:?} appears more than once")]
    DuplicateSegment {
        /// Cell occupied twice.
        cell: Cell,
    },
    /// The target cell lies outside the grid.
    #[error("target {cell:?} lies outside the grid")]
    TargetOutOfBounds {
        /// Offending target.
        cell: Cell,
    },
}

/// Failures surfaced by a navigation decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum NavigationError {
    /// Every neighbour of the head is blocked; the episode is lost.
    #[error("no legal move is available")]
    NoSafeMove,
    /// The snapshot handed to the engine was malformed.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::{Cell, Direction, GridSize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = Cell::new(3, 3);
        assert_eq!(
            Direction::between(origin, Cell::new(3, 2)),
            Some(Direction::Up)
        );
        assert_eq!(
            Direction::between(origin, Cell::new(4, 3)),
            Some(Direction::Right)
        );
        assert_eq!(
            Direction::between(origin, Cell::new(3, 4)),
            Some(Direction::Down)
        );
        assert_eq!(
            Direction::between(origin, Cell::new(2, 3)),
            Some(Direction::Left)
        );
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, Cell::new(4, 4)), None);
    }

    #[test]
    fn offsets_and_opposites_agree() {
        let grid = GridSize::new(5, 5);
        let center = Cell::new(2, 2);
        for direction in Direction::ALL {
            let next = center.step(direction, grid).expect("center has four neighbours");
            assert_eq!(Direction::between(center, next), Some(direction));
            assert_eq!(next.step(direction.opposite(), grid), Some(center));
        }
    }

    #[test]
    fn step_refuses_to_leave_the_grid() {
        let grid = GridSize::new(3, 2);
        assert_eq!(Cell::new(0, 0).step(Direction::Up, grid), None);
        assert_eq!(Cell::new(0, 0).step(Direction::Left, grid), None);
        assert_eq!(Cell::new(2, 1).step(Direction::Right, grid), None);
        assert_eq!(Cell::new(2, 1).step(Direction::Down, grid), None);
        assert_eq!(
            Cell::new(2, 1).step(Direction::Up, grid),
            Some(Cell::new(2, 0))
        );
    }

    #[test]
    fn neighbors_are_clipped_at_corners() {
        let grid = GridSize::new(4, 3);
        let corner: Vec<_> = grid.neighbors(Cell::new(0, 0)).collect();
        assert_eq!(corner, vec![Cell::new(1, 0), Cell::new(0, 1)]);

        let interior: Vec<_> = grid.neighbors(Cell::new(1, 1)).collect();
        assert_eq!(
            interior,
            vec![
                Cell::new(1, 0),
                Cell::new(2, 1),
                Cell::new(1, 2),
                Cell::new(0, 1),
            ]
        );
    }

    #[test]
    fn row_major_indexing_round_trips() {
        let grid = GridSize::new(4, 3);
        assert_eq!(grid.cell_count(), 12);
        assert_eq!(grid.index_of(Cell::new(3, 2)), Some(11));
        assert_eq!(grid.cell_at(5), Some(Cell::new(1, 1)));
        assert_eq!(grid.index_of(Cell::new(4, 0)), None);
        assert_eq!(grid.cell_at(12), None);
        assert_eq!(grid.cells().count(), 12);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        let cell = Cell::new(5, 7);
        let bytes = bincode::serialize(&cell).expect("serialize");
        let restored: Cell = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, cell);
    }
}
