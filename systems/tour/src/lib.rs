#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hamiltonian tour construction and cycle-relative distances.
//!
//! A [`HamiltonianTour`] is a closed walk over every grid cell, built once at
//! startup by a [`HamiltonianCycleBuilder`]. Following the tour forever can
//! never collide, so every fallback policy measures progress in tour
//! positions via [`cycle_distance`].

mod backtrack;
mod lanes;
mod maze;

use serde::{Deserialize, Serialize};
use snake_pilot_core::{Cell, GridSize};
use thiserror::Error;
use tracing::info;

/// Frame pushes allowed to the backtracking search before it gives up.
pub const DEFAULT_BACKTRACK_STEPS: usize = 1_000_000;

/// Forward distance from `from` to `to` around a cycle of `cycle_length`.
///
/// Counts the positions strictly between the two indices: a distance of zero
/// means `to` immediately follows `from`, and `cycle_distance(i, i, n)` is
/// `n - 1`. Indices are reduced modulo the cycle length. An empty cycle yields
/// zero.
#[must_use]
pub fn cycle_distance(from: usize, to: usize, cycle_length: usize) -> usize {
    if cycle_length == 0 {
        return 0;
    }

    let from = from % cycle_length;
    let to = to % cycle_length;
    (to + cycle_length - from - 1) % cycle_length
}

/// Algorithm used to lay the Hamiltonian cycle over the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum TourStrategy {
    /// Closed-form back-and-forth lanes; linear time, needs one even dimension.
    Boustrophedon,
    /// Depth-first backtracking from `(0, 0)` with a fixed direction order.
    Backtracking {
        /// Frame pushes allowed before the search reports exhaustion.
        #[serde(default = "default_backtrack_steps")]
        max_steps: usize,
    },
    /// Walk around a seeded random spanning tree of 2x2 blocks.
    Maze {
        /// Seed for the spanning-tree generator.
        seed: u64,
    },
}

impl Default for TourStrategy {
    fn default() -> Self {
        Self::Boustrophedon
    }
}

fn default_backtrack_steps() -> usize {
    DEFAULT_BACKTRACK_STEPS
}

/// Reasons tour construction can fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TourError {
    /// The grid admits no closed tour through every cell.
    #[error("a {width}x{height} grid has no Hamiltonian cycle")]
    NoCycleFound {
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// The backtracking search ran out of steps before closing the cycle.
    #[error("backtracking gave up on a {width}x{height} grid after {max_steps} steps")]
    SearchExhausted {
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
        /// Step limit that was reached.
        max_steps: usize,
    },
    /// The maze strategy needs both dimensions to be even.
    #[error("maze tours need even dimensions, got {width}x{height}")]
    MazeNeedsEvenDimensions {
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// A cell sequence did not form a closed tour over the grid.
    #[error("invalid tour at position {position}: {reason}")]
    InvalidTour {
        /// Tour position where the defect was detected.
        position: usize,
        /// Description of the defect.
        reason: &'static str,
    },
}

/// Builds Hamiltonian tours with a fixed [`TourStrategy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HamiltonianCycleBuilder {
    strategy: TourStrategy,
}

impl HamiltonianCycleBuilder {
    /// Creates a builder that uses the provided strategy.
    #[must_use]
    pub const fn new(strategy: TourStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy applied by [`build`](Self::build).
    #[must_use]
    pub const fn strategy(&self) -> TourStrategy {
        self.strategy
    }

    /// Constructs a closed tour over every cell of the grid.
    ///
    /// Fails with [`TourError::NoCycleFound`] when either dimension is below
    /// two or both are odd, since a bipartite grid with an odd cell count has
    /// no Hamiltonian cycle.
    pub fn build(&self, grid: GridSize) -> Result<HamiltonianTour, TourError> {
        let (width, height) = (grid.width(), grid.height());
        if width < 2 || height < 2 || (width % 2 == 1 && height % 2 == 1) {
            return Err(TourError::NoCycleFound { width, height });
        }

        let order = match self.strategy {
            TourStrategy::Boustrophedon => lanes::lane_tour(grid),
            TourStrategy::Backtracking { max_steps } => backtrack::backtrack_tour(grid, max_steps)?,
            TourStrategy::Maze { seed } => {
                if width % 2 == 1 || height % 2 == 1 {
                    return Err(TourError::MazeNeedsEvenDimensions { width, height });
                }
                maze::maze_tour(grid, seed)
            }
        };

        info!(
            strategy = ?self.strategy,
            width,
            height,
            "constructed hamiltonian tour"
        );
        HamiltonianTour::from_cells(grid, order)
    }
}

/// Closed walk visiting every grid cell exactly once.
///
/// Position `i` and `i + 1` are always 4-adjacent, and so are the last and the
/// first position. The tour is immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HamiltonianTour {
    grid: GridSize,
    order: Vec<Cell>,
    positions: Vec<usize>,
}

impl HamiltonianTour {
    /// Validates a cell sequence and wraps it as a tour.
    pub fn from_cells(grid: GridSize, order: Vec<Cell>) -> Result<Self, TourError> {
        let cell_count = grid.cell_count();
        if order.len() != cell_count {
            return Err(TourError::InvalidTour {
                position: order.len().min(cell_count),
                reason: "tour length differs from the cell count",
            });
        }

        let mut positions = vec![usize::MAX; cell_count];
        for (position, &cell) in order.iter().enumerate() {
            let Some(index) = grid.index_of(cell) else {
                return Err(TourError::InvalidTour {
                    position,
                    reason: "cell lies outside the grid",
                });
            };
            if positions[index] != usize::MAX {
                return Err(TourError::InvalidTour {
                    position,
                    reason: "cell visited twice",
                });
            }
            positions[index] = position;

            let next = order[(position + 1) % cell_count];
            if !cell.is_adjacent(next) {
                return Err(TourError::InvalidTour {
                    position,
                    reason: "successor is not adjacent",
                });
            }
        }

        Ok(Self {
            grid,
            order,
            positions,
        })
    }

    /// Grid covered by the tour.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Number of positions in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether the tour has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tour position of the cell.
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.grid
            .index_of(cell)
            .and_then(|index| self.positions.get(index).copied())
    }

    /// Cell visited at the tour position.
    #[must_use]
    pub fn cell_at(&self, position: usize) -> Option<Cell> {
        self.order.get(position).copied()
    }

    /// Position following `position`, wrapping to zero after the last one.
    #[must_use]
    pub fn successor(&self, position: usize) -> usize {
        if self.order.is_empty() {
            return 0;
        }
        (position + 1) % self.order.len()
    }

    /// Cell that follows `cell` along the tour.
    #[must_use]
    pub fn successor_cell(&self, cell: Cell) -> Option<Cell> {
        let position = self.index_of(cell)?;
        self.cell_at(self.successor(position))
    }

    /// Forward distance between two positions, see [`cycle_distance`].
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> usize {
        cycle_distance(from, to, self.order.len())
    }

    /// Forward distance between the positions of two cells.
    #[must_use]
    pub fn distance_between(&self, from: Cell, to: Cell) -> Option<usize> {
        Some(self.distance(self.index_of(from)?, self.index_of(to)?))
    }

    /// Cells in tour order, starting at position zero.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.order.iter().copied()
    }
}
