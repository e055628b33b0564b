#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid occupancy model and free-space queries for the navigation engine.
//!
//! [`Occupancy`] turns the body snapshot received each tick into a dense
//! per-cell lookup so that the planner, flood fills and fallback policies can
//! test cells in constant time. [`ReachabilityChecker`] answers connectivity
//! questions over the free cells of an occupancy.

pub mod reachability;

pub use reachability::ReachabilityChecker;

use snake_pilot_core::{Cell, GridSize, SnapshotError};

/// Dense occupancy of the grid by the snake body for a single tick.
///
/// The body is stored head first. The tail is tracked separately because it
/// vacates its cell when the head advances without eating, so several queries
/// treat it as passable.
#[derive(Clone, Debug)]
pub struct Occupancy {
    grid: GridSize,
    occupied: Vec<bool>,
    head: Cell,
    tail: Cell,
    len: usize,
}

impl Occupancy {
    /// Captures the occupancy described by a head-first body snapshot.
    ///
    /// Fails when the body is empty, leaves the grid, or repeats a cell.
    pub fn from_body(grid: GridSize, body: &[Cell]) -> Result<Self, SnapshotError> {
        let (&head, _) = body.split_first().ok_or(SnapshotError::EmptyBody)?;
        let (&tail, _) = body.split_last().ok_or(SnapshotError::EmptyBody)?;

        let mut occupied = vec![false; grid.cell_count()];
        for &segment in body {
            let index = grid
                .index_of(segment)
                .ok_or(SnapshotError::SegmentOutOfBounds { cell: segment })?;
            if occupied[index] {
                return Err(SnapshotError::DuplicateSegment { cell: segment });
            }
            occupied[index] = true;
        }

        Ok(Self {
            grid,
            occupied,
            head,
            tail,
            len: body.len(),
        })
    }

    /// Grid the occupancy was captured on.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Cell occupied by the head.
    #[must_use]
    pub const fn head(&self) -> Cell {
        self.head
    }

    /// Cell occupied by the last body segment.
    #[must_use]
    pub const fn tail(&self) -> Cell {
        self.tail
    }

    /// Number of body segments, head and tail included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; an occupancy cannot be built from an empty body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of grid cells not covered by the body.
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.grid.cell_count().saturating_sub(self.len)
    }

    /// Reports whether any body segment, tail included, covers the cell.
    ///
    /// Cells outside the grid are reported as unoccupied; combine with
    /// [`GridSize::contains`] when bounds matter.
    #[must_use]
    pub fn is_body(&self, cell: Cell) -> bool {
        self.grid
            .index_of(cell)
            .and_then(|index| self.occupied.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether moving the head onto the cell next tick would collide.
    ///
    /// Out-of-bounds cells always block. The tail does not, since it moves
    /// out of the way on the same tick.
    #[must_use]
    pub fn blocks_step(&self, cell: Cell) -> bool {
        if !self.grid.contains(cell) {
            return true;
        }

        self.is_body(cell) && cell != self.tail
    }

    /// Reports whether the cell is inside the grid and not covered by the body.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        self.grid.contains(cell) && !self.is_body(cell)
    }
}
