#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest-path planner that only accepts routes leaving enough free space.
//!
//! The planner runs a best-first A* search from the head to the target over
//! cells not covered by the body. Reaching the target is not enough: every
//! candidate route is handed to an acceptance filter, and a rejected arrival
//! makes the search keep popping the open set for an arrival through a
//! different predecessor instead of giving up.

use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Deserialize, Serialize};
use snake_pilot_core::{Cell, GridSize};
use snake_pilot_grid::{Occupancy, ReachabilityChecker};
use tracing::trace;

/// Cost of a single grid step.
pub const STEP_COST: u32 = 20;

/// Default share of empty cells that must stay reachable from the target.
pub const DEFAULT_MIN_REACHABLE_FRACTION: f32 = 0.8;

/// Tuning knobs for [`AStarPlanner`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Minimum share of empty cells reachable from the end of an accepted path.
    pub min_reachable_fraction: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_reachable_fraction: DEFAULT_MIN_REACHABLE_FRACTION,
        }
    }
}

/// A* search workspace reused across ticks.
#[derive(Debug, Default)]
pub struct AStarPlanner {
    config: PlannerConfig,
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    arrivals: Vec<Arrival>,
    best_cost: Vec<u32>,
    came_from: Vec<Option<Cell>>,
    closed: Vec<bool>,
    sequence: u64,
}

/// Search node: a cell reached at a cumulative cost from a predecessor.
#[derive(Clone, Copy, Debug)]
struct Arrival {
    cell: Cell,
    cost: u32,
    predecessor: Option<Cell>,
}

impl AStarPlanner {
    /// Creates a planner with the provided configuration.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration applied by [`plan`](Self::plan).
    #[must_use]
    pub const fn config(&self) -> PlannerConfig {
        self.config
    }

    /// Plans a route from the head to `target` that keeps the board open.
    ///
    /// A route is accepted when at least
    /// [`min_reachable_fraction`](PlannerConfig::min_reachable_fraction) of the
    /// empty cells are reachable from its last cell. The returned sequence
    /// starts at the head and ends at the target. `None` means no acceptable
    /// route exists this tick, which is a normal outcome.
    pub fn plan(
        &mut self,
        occupancy: &Occupancy,
        target: Cell,
        reachability: &mut ReachabilityChecker,
    ) -> Option<Vec<Cell>> {
        let threshold = self.config.min_reachable_fraction;
        // Every candidate ends on the target, so the flood fill runs once.
        let mut verdict: Option<bool> = None;

        self.plan_with(occupancy, target, |path| {
            let Some(&end) = path.last() else {
                return false;
            };
            *verdict
                .get_or_insert_with(|| reachability.reachable_fraction(end, occupancy) >= threshold)
        })
    }

    /// Plans a route from the head to `target` using a custom acceptance test.
    ///
    /// Intermediate steps may not enter any body cell, tail included, since
    /// the tail still occupies its cell while the head travels. The final step
    /// may land on the tail when the tail is the target.
    ///
    /// The cost of each step is [`STEP_COST`]; the heuristic is the Manhattan
    /// distance in step costs plus `body length / 10`. The length term is the
    /// same for every node, so it never reorders the open set.
    ///
    /// The target is never closed. Each arrival at the target is keyed by its
    /// predecessor, and since interior cells close on their first pop, each
    /// predecessor offers at most one candidate to `accept`.
    pub fn plan_with<F>(
        &mut self,
        occupancy: &Occupancy,
        target: Cell,
        mut accept: F,
    ) -> Option<Vec<Cell>>
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let grid = occupancy.grid();
        let head = occupancy.head();
        if !grid.contains(target) {
            return None;
        }
        if head == target {
            let path = vec![head];
            return accept(&path).then_some(path);
        }

        self.reset(grid.cell_count());
        let penalty = length_penalty(occupancy.len());
        let target_enterable = !occupancy.is_body(target) || target == occupancy.tail();

        if let Some(index) = grid.index_of(head) {
            self.best_cost[index] = 0;
        }
        self.push(
            Arrival {
                cell: head,
                cost: 0,
                predecessor: None,
            },
            heuristic(head, target, penalty),
        );

        let mut rejected = 0usize;
        while let Some(Reverse((_, _, slot))) = self.open.pop() {
            let arrival = self.arrivals[slot];

            if arrival.cell == target {
                let Some(predecessor) = arrival.predecessor else {
                    continue;
                };
                let path = self.reconstruct(grid, predecessor, target);
                if accept(&path) {
                    return Some(path);
                }
                rejected += 1;
                trace!(?predecessor, rejected, "rejected arrival at target");
                continue;
            }

            let Some(index) = grid.index_of(arrival.cell) else {
                continue;
            };
            if self.closed[index] || arrival.cost > self.best_cost[index] {
                continue;
            }
            self.closed[index] = true;
            self.came_from[index] = arrival.predecessor;

            let cost = arrival.cost.saturating_add(STEP_COST);
            for neighbor in grid.neighbors(arrival.cell) {
                if neighbor == target {
                    if target_enterable {
                        self.push(
                            Arrival {
                                cell: neighbor,
                                cost,
                                predecessor: Some(arrival.cell),
                            },
                            cost.saturating_add(penalty),
                        );
                    }
                    continue;
                }

                if occupancy.is_body(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = grid.index_of(neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || cost >= self.best_cost[neighbor_index] {
                    continue;
                }

                self.best_cost[neighbor_index] = cost;
                self.push(
                    Arrival {
                        cell: neighbor,
                        cost,
                        predecessor: Some(arrival.cell),
                    },
                    cost.saturating_add(heuristic(neighbor, target, penalty)),
                );
            }
        }

        None
    }

    fn reset(&mut self, cell_count: usize) {
        self.open.clear();
        self.arrivals.clear();
        self.sequence = 0;

        if self.best_cost.len() != cell_count {
            self.best_cost = vec![u32::MAX; cell_count];
            self.came_from = vec![None; cell_count];
            self.closed = vec![false; cell_count];
        } else {
            self.best_cost.fill(u32::MAX);
            self.came_from.fill(None);
            self.closed.fill(false);
        }
    }

    fn push(&mut self, arrival: Arrival, priority: u32) {
        let slot = self.arrivals.len();
        self.arrivals.push(arrival);
        self.open.push(Reverse((priority, self.sequence, slot)));
        self.sequence += 1;
    }

    fn reconstruct(&self, grid: GridSize, predecessor: Cell, target: Cell) -> Vec<Cell> {
        let mut path = vec![target];
        let mut current = Some(predecessor);

        while let Some(cell) = current {
            path.push(cell);
            if path.len() > self.came_from.len() {
                break;
            }
            current = grid
                .index_of(cell)
                .and_then(|index| self.came_from.get(index).copied().flatten());
        }

        path.reverse();
        path
    }
}

fn length_penalty(body_length: usize) -> u32 {
    u32::try_from(body_length / 10).unwrap_or(u32::MAX)
}

fn heuristic(cell: Cell, target: Cell, penalty: u32) -> u32 {
    cell.manhattan_distance(target)
        .saturating_mul(STEP_COST)
        .saturating_add(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(grid: GridSize, body: &[Cell]) -> Occupancy {
        Occupancy::from_body(grid, body).expect("valid body")
    }

    fn assert_walkable(path: &[Cell], occupancy: &Occupancy) {
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{:?} jumps", pair);
        }
        for cell in &path[1..path.len() - 1] {
            assert!(!occupancy.is_body(*cell), "path crosses the body at {cell:?}");
        }
    }

    #[test]
    fn straight_route_to_open_target() {
        let grid = GridSize::new(8, 6);
        let occupancy = occupancy(grid, &[Cell::new(3, 3), Cell::new(2, 3), Cell::new(1, 3)]);
        let mut planner = AStarPlanner::default();
        let mut reachability = ReachabilityChecker::new();

        let path = planner
            .plan(&occupancy, Cell::new(3, 0), &mut reachability)
            .expect("open board has a route");

        assert_eq!(
            path,
            vec![
                Cell::new(3, 3),
                Cell::new(3, 2),
                Cell::new(3, 1),
                Cell::new(3, 0),
            ]
        );
    }

    #[test]
    fn route_bends_around_the_body() {
        let grid = GridSize::new(6, 6);
        // Head at (1,3) with the body forming a wall above it.
        let body = [
            Cell::new(1, 3),
            Cell::new(1, 2),
            Cell::new(2, 2),
            Cell::new(3, 2),
        ];
        let occupancy = occupancy(grid, &body);
        let mut planner = AStarPlanner::default();

        let path = planner
            .plan_with(&occupancy, Cell::new(2, 0), |_| true)
            .expect("route around the wall exists");

        assert_eq!(path.first(), Some(&Cell::new(1, 3)));
        assert_eq!(path.last(), Some(&Cell::new(2, 0)));
        assert_walkable(&path, &occupancy);
        assert_eq!(path.len() - 1, 6);
    }

    #[test]
    fn rejected_arrival_tries_another_predecessor() {
        let grid = GridSize::new(5, 5);
        let occupancy = occupancy(grid, &[Cell::new(2, 4), Cell::new(1, 4)]);
        let mut planner = AStarPlanner::default();
        let target = Cell::new(2, 2);
        let mut offered = Vec::new();

        let path = planner
            .plan_with(&occupancy, target, |path| {
                let predecessor = path[path.len() - 2];
                offered.push(predecessor);
                predecessor != Cell::new(2, 3)
            })
            .expect("another approach is accepted");

        assert_eq!(offered.first(), Some(&Cell::new(2, 3)));
        assert_ne!(path[path.len() - 2], Cell::new(2, 3));
        assert_eq!(path.last(), Some(&target));
        assert_walkable(&path, &occupancy);
    }

    #[test]
    fn rejecting_everything_yields_no_path() {
        let grid = GridSize::new(4, 4);
        let occupancy = occupancy(grid, &[Cell::new(0, 0), Cell::new(1, 0)]);
        let mut planner = AStarPlanner::default();
        let mut offers = 0;

        let path = planner.plan_with(&occupancy, Cell::new(3, 3), |_| {
            offers += 1;
            false
        });

        assert!(path.is_none());
        // (3,3) can only be approached from (2,3) and (3,2).
        assert_eq!(offers, 2);
    }

    #[test]
    fn body_cells_other_than_the_tail_are_unreachable_targets() {
        let grid = GridSize::new(4, 4);
        let body = [
            Cell::new(1, 1),
            Cell::new(1, 2),
            Cell::new(2, 2),
            Cell::new(2, 1),
        ];
        let occupancy = occupancy(grid, &body);
        let mut planner = AStarPlanner::default();

        assert!(planner
            .plan_with(&occupancy, Cell::new(2, 2), |_| true)
            .is_none());

        let to_tail = planner
            .plan_with(&occupancy, Cell::new(2, 1), |_| true)
            .expect("tail may be entered on the final step");
        assert_eq!(to_tail.last(), Some(&Cell::new(2, 1)));
        assert_walkable(&to_tail, &occupancy);
    }

    #[test]
    fn enclosed_head_has_no_route() {
        let grid = GridSize::new(6, 6);
        let body = [
            Cell::new(0, 0),
            Cell::new(1, 0),
            Cell::new(1, 1),
            Cell::new(0, 1),
            Cell::new(0, 2),
        ];
        let occupancy = occupancy(grid, &body);
        let mut planner = AStarPlanner::default();
        let mut reachability = ReachabilityChecker::new();

        assert!(planner
            .plan(&occupancy, Cell::new(5, 5), &mut reachability)
            .is_none());
    }

    #[test]
    fn crowded_target_fails_the_fraction_test() {
        // Column 4 of a 7x3 board is covered by the body, leaving a small
        // pocket on the right that holds the target.
        let grid = GridSize::new(7, 3);
        let body = [
            Cell::new(5, 2),
            Cell::new(4, 2),
            Cell::new(4, 1),
            Cell::new(4, 0),
        ];
        let occupancy = occupancy(grid, &body);
        let mut reachability = ReachabilityChecker::new();
        let mut planner = AStarPlanner::new(PlannerConfig {
            min_reachable_fraction: 0.9,
        });
        let target = Cell::new(6, 1);
        assert!((planner.config().min_reachable_fraction - 0.9).abs() < f32::EPSILON);

        assert!(reachability.reachable_fraction(target, &occupancy) < 0.9);
        assert!(planner.plan(&occupancy, target, &mut reachability).is_none());

        let mut lenient = AStarPlanner::new(PlannerConfig {
            min_reachable_fraction: 0.0,
        });
        assert!(lenient.plan(&occupancy, target, &mut reachability).is_some());
    }
}
