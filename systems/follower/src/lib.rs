#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Default safe behaviour: keep walking the Hamiltonian tour.

use snake_pilot_core::{Direction, NavigationError};
use snake_pilot_grid::Occupancy;
use snake_pilot_system_tour::HamiltonianTour;

/// Priority used when the next tour cell is blocked.
pub const SCAN_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Up,
    Direction::Down,
];

/// Pure system that advances the head to the next tour position.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleFollower;

impl CycleFollower {
    /// Chooses the direction toward the cell after the head on the tour.
    ///
    /// When that cell is blocked (typically right after growth) the first
    /// open neighbour in [`SCAN_ORDER`] is taken instead. A step is open when
    /// it stays on the grid and does not hit any segment but the tail.
    ///
    /// Fails with [`NavigationError::NoSafeMove`] when the head is sealed in.
    pub fn next_step(
        &self,
        occupancy: &Occupancy,
        tour: &HamiltonianTour,
    ) -> Result<Direction, NavigationError> {
        let head = occupancy.head();

        let along_tour = tour
            .successor_cell(head)
            .filter(|next| !occupancy.blocks_step(*next))
            .and_then(|next| Direction::between(head, next));
        if let Some(direction) = along_tour {
            return Ok(direction);
        }

        self.first_open(occupancy)
            .ok_or(NavigationError::NoSafeMove)
    }

    /// First direction in [`SCAN_ORDER`] whose step is open.
    #[must_use]
    pub fn first_open(&self, occupancy: &Occupancy) -> Option<Direction> {
        let head = occupancy.head();
        let grid = occupancy.grid();

        SCAN_ORDER.into_iter().find(|direction| {
            head.step(*direction, grid)
                .map_or(false, |cell| !occupancy.blocks_step(cell))
        })
    }
}
