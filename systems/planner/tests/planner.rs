use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_pilot_core::{Cell, GridSize};
use snake_pilot_grid::{Occupancy, ReachabilityChecker};
use snake_pilot_system_planner::{AStarPlanner, PlannerConfig, DEFAULT_MIN_REACHABLE_FRACTION};

const PROPERTY_SEED: u64 = 0x00a5_7a12;

/// Grows a self-avoiding body from a random head by random tail extensions.
fn random_body(rng: &mut ChaCha8Rng, grid: GridSize, max_len: usize) -> Vec<Cell> {
    let cells: Vec<Cell> = grid.cells().collect();
    let mut body = vec![*cells.choose(rng).expect("grid has cells")];
    let wanted = rng.gen_range(1..max_len);

    while body.len() < wanted {
        let tail = *body.last().expect("body is never empty");
        let options: Vec<Cell> = grid
            .neighbors(tail)
            .filter(|cell| !body.contains(cell))
            .collect();
        let Some(next) = options.choose(rng) else {
            break;
        };
        body.push(*next);
    }

    body
}

#[test]
fn returned_paths_are_walkable_and_leave_space() {
    let grid = GridSize::new(6, 6);
    let mut rng = ChaCha8Rng::seed_from_u64(PROPERTY_SEED);
    let mut planner = AStarPlanner::default();
    let mut reachability = ReachabilityChecker::new();
    let mut planned = 0;

    for _ in 0..100 {
        let body = random_body(&mut rng, grid, grid.cell_count() / 2);
        let occupancy = Occupancy::from_body(grid, &body).expect("random walk is valid");
        let free: Vec<Cell> = grid.cells().filter(|cell| occupancy.is_free(*cell)).collect();
        let target = *free.choose(&mut rng).expect("half the grid is free");

        let Some(path) = planner.plan(&occupancy, target, &mut reachability) else {
            continue;
        };
        planned += 1;

        assert_eq!(path.first(), Some(&body[0]));
        assert_eq!(path.last(), Some(&target));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
        for cell in &path[1..] {
            assert!(!occupancy.is_body(*cell), "path enters the body at {cell:?}");
        }
        assert!(
            path.len() - 1 >= body[0].manhattan_distance(target) as usize,
            "path is shorter than the Manhattan bound"
        );
        assert!(
            reachability.reachable_fraction(target, &occupancy) >= DEFAULT_MIN_REACHABLE_FRACTION
        );
    }

    assert!(planned > 30, "only {planned} of 100 boards produced a path");
}

#[test]
fn unobstructed_paths_are_shortest() {
    let grid = GridSize::new(10, 10);
    let occupancy = Occupancy::from_body(grid, &[Cell::new(0, 9)]).expect("single segment");
    let mut planner = AStarPlanner::new(PlannerConfig::default());
    let mut reachability = ReachabilityChecker::new();

    for target in grid.cells().filter(|cell| *cell != Cell::new(0, 9)) {
        let path = planner
            .plan(&occupancy, target, &mut reachability)
            .expect("empty board always has a route");
        assert_eq!(
            path.len() - 1,
            Cell::new(0, 9).manhattan_distance(target) as usize
        );
    }
}

#[test]
fn repeated_plans_are_identical() {
    let grid = GridSize::new(8, 8);
    let body = [
        Cell::new(4, 4),
        Cell::new(4, 5),
        Cell::new(4, 6),
        Cell::new(3, 6),
        Cell::new(2, 6),
    ];
    let occupancy = Occupancy::from_body(grid, &body).expect("valid body");
    let mut planner = AStarPlanner::default();
    let mut reachability = ReachabilityChecker::new();

    let first = planner.plan(&occupancy, Cell::new(3, 7), &mut reachability);
    let second = planner.plan(&occupancy, Cell::new(3, 7), &mut reachability);
    assert!(first.is_some());
    assert_eq!(first, second);
}
