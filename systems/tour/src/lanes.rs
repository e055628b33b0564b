//! Closed-form back-and-forth lane tour.

use snake_pilot_core::{Cell, GridSize};

/// Lays the tour as lanes along the rows, or along the columns when only the
/// width is even.
///
/// The caller guarantees both dimensions are at least two and one is even.
pub(crate) fn lane_tour(grid: GridSize) -> Vec<Cell> {
    if grid.height() % 2 == 0 {
        lanes(grid.width(), grid.height(), Cell::new)
    } else {
        lanes(grid.height(), grid.width(), |along, lane| Cell::new(lane, along))
    }
}

/// Walks lane 0 forward, serpentines through lanes `1..lane_count` over
/// positions `1..length`, then returns along position 0.
///
/// `lane_count` must be even so the last lane ends next to position 0.
fn lanes<F>(length: u32, lane_count: u32, place: F) -> Vec<Cell>
where
    F: Fn(u32, u32) -> Cell,
{
    let capacity = usize::try_from(u64::from(length) * u64::from(lane_count)).unwrap_or(0);
    let mut order = Vec::with_capacity(capacity);

    order.extend((0..length).map(|along| place(along, 0)));

    for lane in 1..lane_count {
        if lane % 2 == 1 {
            order.extend((1..length).rev().map(|along| place(along, lane)));
        } else {
            order.extend((1..length).map(|along| place(along, lane)));
        }
    }

    order.extend((1..lane_count).rev().map(|lane| place(0, lane)));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_height_runs_lanes_along_rows() {
        let order = lane_tour(GridSize::new(3, 2));
        assert_eq!(
            order,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(2, 1),
                Cell::new(1, 1),
                Cell::new(0, 1),
            ]
        );
    }

    #[test]
    fn odd_height_runs_lanes_along_columns() {
        let order = lane_tour(GridSize::new(2, 3));
        assert_eq!(
            order,
            vec![
                Cell::new(0, 0),
                Cell::new(0, 1),
                Cell::new(0, 2),
                Cell::new(1, 2),
                Cell::new(1, 1),
                Cell::new(1, 0),
            ]
        );
    }
}
