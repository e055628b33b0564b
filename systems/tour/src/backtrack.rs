//! Depth-first backtracking search for a closed tour.

use snake_pilot_core::{Cell, Direction, GridSize};

use crate::TourError;

/// Order in which each frame tries its neighbours.
const TRY_ORDER: [Direction; 4] = [
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
];

const START: Cell = Cell::new(0, 0);

/// Searches for a tour starting at `(0, 0)` whose last cell touches the start.
///
/// The search keeps an explicit stack of frames, one per assigned cell, each
/// remembering which direction it tries next. A branch is pruned as soon as
/// the start cell has no unvisited neighbour left, since the cycle could no
/// longer close.
pub(crate) fn backtrack_tour(grid: GridSize, max_steps: usize) -> Result<Vec<Cell>, TourError> {
    let cell_count = grid.cell_count();
    let mut visited = vec![false; cell_count];
    let mut path = Vec::with_capacity(cell_count);
    let mut frames: Vec<usize> = Vec::with_capacity(cell_count);
    let mut steps = 0usize;

    visited[0] = true;
    path.push(START);
    frames.push(0);

    loop {
        let Some(&current) = path.last() else {
            break;
        };

        if path.len() == cell_count {
            if current.is_adjacent(START) {
                return Ok(path);
            }
            retreat(grid, &mut visited, &mut path, &mut frames);
            continue;
        }

        let Some(next_try) = frames.last_mut() else {
            break;
        };
        if *next_try >= TRY_ORDER.len() {
            retreat(grid, &mut visited, &mut path, &mut frames);
            continue;
        }

        let direction = TRY_ORDER[*next_try];
        *next_try += 1;

        let Some(next) = current.step(direction, grid) else {
            continue;
        };
        let Some(index) = grid.index_of(next) else {
            continue;
        };
        if visited[index] {
            continue;
        }

        steps += 1;
        if steps > max_steps {
            return Err(TourError::SearchExhausted {
                width: grid.width(),
                height: grid.height(),
                max_steps,
            });
        }

        visited[index] = true;
        path.push(next);
        frames.push(0);

        if path.len() < cell_count && !start_can_close(grid, &visited) {
            retreat(grid, &mut visited, &mut path, &mut frames);
        }
    }

    Err(TourError::NoCycleFound {
        width: grid.width(),
        height: grid.height(),
    })
}

fn retreat(grid: GridSize, visited: &mut [bool], path: &mut Vec<Cell>, frames: &mut Vec<usize>) {
    if let Some(cell) = path.pop() {
        if let Some(index) = grid.index_of(cell) {
            visited[index] = false;
        }
    }
    let _ = frames.pop();
}

fn start_can_close(grid: GridSize, visited: &[bool]) -> bool {
    grid.neighbors(START).any(|neighbor| {
        grid.index_of(neighbor)
            .map_or(false, |index| !visited[index])
    })
}
