#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tour-cutting policy that trades part of the safety margin for speed.
//!
//! Walking the Hamiltonian tour is always safe but slow. While the snake is
//! short there is room to skip ahead along the tour, as long as the head never
//! overtakes its own tail. The policy measures that room as a budget of tour
//! positions, then greedily takes the neighbour that skips the most positions
//! without exceeding it.

use serde::{Deserialize, Serialize};
use snake_pilot_core::{Cell, Direction, NavigationError};
use snake_pilot_grid::Occupancy;
use snake_pilot_system_follower::CycleFollower;
use snake_pilot_system_tour::HamiltonianTour;

/// Neighbour priority when two candidates skip the same distance.
pub const SCAN_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Down,
    Direction::Up,
];

/// Constants shaping the shortcut budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShortcutTuning {
    /// Tour positions always kept between the head and the tail.
    pub safety_margin: usize,
    /// Deducted whenever the food lies ahead of the tail on the tour.
    pub greed_penalty: usize,
    /// Extra deduction when a shortcut would strand a large region.
    pub isolation_penalty: usize,
    /// Multiplier comparing the skipped span against the empty cells.
    pub isolation_factor: usize,
}

impl Default for ShortcutTuning {
    fn default() -> Self {
        Self {
            safety_margin: 3,
            greed_penalty: 1,
            isolation_penalty: 10,
            isolation_factor: 4,
        }
    }
}

/// Pure system choosing a bounded shortcut along the tour toward the food.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortcutPolicy {
    tuning: ShortcutTuning,
    follower: CycleFollower,
}

impl ShortcutPolicy {
    /// Creates a policy with the provided tuning.
    #[must_use]
    pub const fn new(tuning: ShortcutTuning) -> Self {
        Self {
            tuning,
            follower: CycleFollower,
        }
    }

    /// Tuning applied when computing budgets.
    #[must_use]
    pub const fn tuning(&self) -> ShortcutTuning {
        self.tuning
    }

    /// Number of tour positions the head may skip this tick.
    ///
    /// Starts from the tour distance to the tail minus the body length and the
    /// safety margin. No shortcut is allowed once fewer than half the cells
    /// are empty. When the food lies before the tail the budget shrinks, and
    /// it shrinks sharply if skipping to the food would leave a span larger
    /// than a quarter of the empty cells behind. The result never exceeds the
    /// tour distance to the food.
    #[must_use]
    pub fn budget(&self, occupancy: &Occupancy, target: Cell, tour: &HamiltonianTour) -> usize {
        let (Some(head), Some(food), Some(tail)) = (
            tour.index_of(occupancy.head()),
            tour.index_of(target),
            tour.index_of(occupancy.tail()),
        ) else {
            return 0;
        };

        let to_food = signed(tour.distance(head, food));
        let to_tail = signed(tour.distance(head, tail));
        let total = signed(tour.len());
        let length = signed(occupancy.len());
        let empty = total - length - 1;

        let mut budget = to_tail - length - signed(self.tuning.safety_margin);
        if empty < total / 2 {
            budget = 0;
        } else if to_food < to_tail {
            budget -= signed(self.tuning.greed_penalty);
            if (to_tail - to_food) * signed(self.tuning.isolation_factor) > empty {
                budget -= signed(self.tuning.isolation_penalty);
            }
        }

        usize::try_from(budget.min(to_food).max(0)).unwrap_or(0)
    }

    /// Chooses the free neighbour that skips the most tour positions within
    /// the budget.
    ///
    /// Every body segment, tail included, disqualifies a neighbour here. Ties
    /// go to the earlier direction in [`SCAN_ORDER`]. Without a qualifying
    /// neighbour the decision is delegated to [`CycleFollower`], which may
    /// still step onto the tail or report [`NavigationError::NoSafeMove`].
    pub fn next_step(
        &self,
        occupancy: &Occupancy,
        target: Cell,
        tour: &HamiltonianTour,
    ) -> Result<Direction, NavigationError> {
        let head = occupancy.head();
        let grid = occupancy.grid();
        let Some(head_position) = tour.index_of(head) else {
            return self.follower.next_step(occupancy, tour);
        };
        let budget = self.budget(occupancy, target, tour);

        let mut best: Option<(Direction, usize)> = None;
        for direction in SCAN_ORDER {
            let Some(cell) = head.step(direction, grid) else {
                continue;
            };
            if !occupancy.is_free(cell) {
                continue;
            }
            let Some(position) = tour.index_of(cell) else {
                continue;
            };

            let skipped = tour.distance(head_position, position);
            if skipped > budget {
                continue;
            }
            if best.map_or(true, |(_, best_skipped)| skipped > best_skipped) {
                best = Some((direction, skipped));
            }
        }

        match best {
            Some((direction, _)) => Ok(direction),
            None => self.follower.next_step(occupancy, tour),
        }
    }
}

fn signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_pilot_core::GridSize;
    use snake_pilot_system_tour::HamiltonianCycleBuilder;

    fn lane_tour(grid: GridSize) -> HamiltonianTour {
        HamiltonianCycleBuilder::default()
            .build(grid)
            .expect("feasible grid")
    }

    /// Body laid backwards along the tour, head at `head_position`.
    fn body_along_tour(tour: &HamiltonianTour, head_position: usize, len: usize) -> Vec<Cell> {
        (0..len)
            .map(|offset| {
                let position = (head_position + tour.len() - offset) % tour.len();
                tour.cell_at(position).expect("position in range")
            })
            .collect()
    }

    #[test]
    fn open_board_cuts_toward_the_food() {
        // On the 8x8 lane tour (3,1) sits at position 12, (3,2) at 17 and the
        // food (3,4) at 31.
        let grid = GridSize::new(8, 8);
        let tour = lane_tour(grid);
        let body = body_along_tour(&tour, 12, 3);
        assert_eq!(body[0], Cell::new(3, 1));
        let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
        let policy = ShortcutPolicy::default();
        let food = Cell::new(3, 4);

        assert_eq!(policy.budget(&occupancy, food, &tour), 18);
        assert_eq!(policy.next_step(&occupancy, food, &tour), Ok(Direction::Down));
        assert_eq!(CycleFollower.next_step(&occupancy, &tour), Ok(Direction::Left));
    }

    #[test]
    fn crowded_board_keeps_to_the_tour() {
        let grid = GridSize::new(8, 8);
        let tour = lane_tour(grid);
        let body = body_along_tour(&tour, 45, 40);
        let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
        let policy = ShortcutPolicy::default();
        let food = tour.cell_at(60).expect("position in range");

        assert_eq!(policy.budget(&occupancy, food, &tour), 0);
        assert_eq!(
            policy.next_step(&occupancy, food, &tour),
            CycleFollower.next_step(&occupancy, &tour)
        );
    }

    #[test]
    fn isolation_penalty_limits_long_skips() {
        let grid = GridSize::new(8, 8);
        let tour = lane_tour(grid);
        let body = body_along_tour(&tour, 12, 3);
        let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
        let food = Cell::new(3, 4);
        let lenient = ShortcutPolicy::new(ShortcutTuning {
            isolation_penalty: 0,
            ..ShortcutTuning::default()
        });
        let strict = ShortcutPolicy::new(ShortcutTuning {
            isolation_penalty: 50,
            ..ShortcutTuning::default()
        });

        assert_eq!(lenient.budget(&occupancy, food, &tour), 18);
        assert_eq!(strict.budget(&occupancy, food, &tour), 4);
        assert_eq!(strict.next_step(&occupancy, food, &tour), Ok(Direction::Down));
    }

    #[test]
    fn tail_just_ahead_clamps_the_budget_to_zero() {
        // The body curls back so its tail (2,1) is the tour cell right after
        // the head (3,1). The board is nearly empty, so only the clamp keeps
        // the negative budget from going through.
        let grid = GridSize::new(8, 8);
        let tour = lane_tour(grid);
        let body = [
            Cell::new(3, 1),
            Cell::new(3, 2),
            Cell::new(2, 2),
            Cell::new(2, 1),
        ];
        let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
        let policy = ShortcutPolicy::default();
        let food = Cell::new(3, 4);
        assert_eq!(tour.distance_between(body[0], body[3]), Some(0));
        assert!(occupancy.free_cells() >= tour.len() / 2);
        assert_eq!(policy.tuning(), ShortcutTuning::default());

        assert_eq!(policy.budget(&occupancy, food, &tour), 0);
        assert_eq!(policy.next_step(&occupancy, food, &tour), Ok(Direction::Left));
    }

    #[test]
    fn without_candidates_defers_to_the_follower() {
        // The tail occupies the next tour cell; only the follower may enter it.
        let grid = GridSize::new(2, 2);
        let tour = lane_tour(grid);
        let body = body_along_tour(&tour, 0, 4);
        let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
        let policy = ShortcutPolicy::default();

        assert_eq!(
            policy.next_step(&occupancy, Cell::new(1, 1), &tour),
            Ok(Direction::Right)
        );
    }
}
