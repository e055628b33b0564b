//! Flood-fill connectivity queries over the free cells of an occupancy.

use std::collections::VecDeque;

use snake_pilot_core::{Cell, GridSize};

use crate::Occupancy;

/// Reusable flood-fill workspace answering reachability questions.
///
/// The checker owns its visited buffer and frontier queue so repeated queries
/// within a tick do not allocate. Each query clears the buffer before use and
/// leaves no state behind that affects the next call.
#[derive(Clone, Debug, Default)]
pub struct ReachabilityChecker {
    visited: Vec<bool>,
    queue: VecDeque<Cell>,
}

impl ReachabilityChecker {
    /// Creates an empty checker; buffers are sized lazily on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells reachable from `from` without crossing the body.
    ///
    /// Every body segment blocks, the tail included. A blocked or
    /// out-of-bounds starting cell reaches nothing.
    pub fn reachable_count(&mut self, from: Cell, occupancy: &Occupancy) -> usize {
        self.flood(occupancy.grid(), from, None, |cell| occupancy.is_body(cell))
            .count
    }

    /// Share of the empty cells that are reachable from `from`.
    ///
    /// Computed as [`reachable_count`](Self::reachable_count) divided by the
    /// number of cells not covered by the body. A grid with no empty cells
    /// yields `0.0`.
    pub fn reachable_fraction(&mut self, from: Cell, occupancy: &Occupancy) -> f32 {
        let empty = occupancy.free_cells();
        if empty == 0 {
            return 0.0;
        }

        let reachable = self.reachable_count(from, occupancy);
        reachable as f32 / empty as f32
    }

    /// Reports whether the tail can be reached from `from` through free cells.
    ///
    /// The tail is treated as passable because it vacates its cell next tick;
    /// every other segment blocks.
    pub fn can_reach_tail(&mut self, from: Cell, occupancy: &Occupancy) -> bool {
        let tail = occupancy.tail();
        if from == tail {
            return true;
        }

        self.flood(occupancy.grid(), from, Some(tail), |cell| {
            cell != tail && occupancy.is_body(cell)
        })
        .reached_goal
    }

    fn flood<F>(&mut self, grid: GridSize, from: Cell, goal: Option<Cell>, is_blocked: F) -> Flood
    where
        F: Fn(Cell) -> bool,
    {
        let cell_count = grid.cell_count();
        if self.visited.len() != cell_count {
            self.visited = vec![false; cell_count];
        } else {
            self.visited.fill(false);
        }
        self.queue.clear();

        let mut outcome = Flood::default();
        let Some(start) = grid.index_of(from) else {
            return outcome;
        };
        if is_blocked(from) {
            return outcome;
        }

        self.visited[start] = true;
        self.queue.push_back(from);

        while let Some(cell) = self.queue.pop_front() {
            outcome.count += 1;
            if goal == Some(cell) {
                outcome.reached_goal = true;
                break;
            }

            for neighbor in grid.neighbors(cell) {
                let Some(index) = grid.index_of(neighbor) else {
                    continue;
                };
                if self.visited[index] || is_blocked(neighbor) {
                    continue;
                }

                self.visited[index] = true;
                self.queue.push_back(neighbor);
            }
        }

        outcome
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Flood {
    count: usize,
    reached_goal: bool,
}
