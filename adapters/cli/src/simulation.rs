//! Headless game loop that drives the navigation engine.

use std::{collections::VecDeque, fmt};

use anyhow::{Context, Result};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_pilot_core::{Cell, DecisionSource, Direction, GridSize, NavigationError};
use snake_pilot_system_navigation::NavigationEngine;
use tracing::{debug, info};

use crate::config::SimulationConfig;

const INITIAL_LENGTH: usize = 3;

/// Why an episode stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The body covers every cell.
    Filled,
    /// The head left the grid or ran into the body.
    Collision,
    /// The engine found no legal move.
    NoSafeMove,
    /// The tick limit was reached first.
    TickLimit,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Filled => "filled",
            Self::Collision => "collision",
            Self::NoSafeMove => "no-safe-move",
            Self::TickLimit => "tick-limit",
        };
        f.write_str(label)
    }
}

/// Result of a single episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EpisodeSummary {
    pub(crate) episode: u64,
    pub(crate) length: usize,
    pub(crate) ticks: u64,
    pub(crate) planned_moves: u64,
    pub(crate) outcome: Outcome,
}

impl fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "episode {}: length {}, ticks {}, planned {}, outcome {}",
            self.episode, self.length, self.ticks, self.planned_moves, self.outcome
        )
    }
}

/// Effect of moving the head one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Moved,
    Ate,
    Collided,
}

/// Owns the engine for the whole run; episodes share its tour.
#[derive(Debug)]
pub(crate) struct Simulation {
    engine: NavigationEngine,
    seed: u64,
    max_ticks: u64,
}

impl Simulation {
    pub(crate) fn new(config: &SimulationConfig) -> Result<Self> {
        let grid = GridSize::new(config.width, config.height);
        let engine = NavigationEngine::new(grid, config.engine)
            .with_context(|| format!("cannot navigate a {}x{} grid", grid.width(), grid.height()))?;

        Ok(Self {
            engine,
            seed: config.seed,
            max_ticks: config.max_ticks,
        })
    }

    /// Plays one episode from the starting position until it ends.
    ///
    /// Each episode reseeds food placement from the run seed and its index,
    /// so any episode can be replayed on its own.
    pub(crate) fn run_episode(&mut self, episode: u64) -> Result<EpisodeSummary> {
        let grid = self.engine.grid();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(episode));
        let mut body = initial_body(grid);
        let mut food = place_food(&mut rng, grid, &body);
        let mut ticks = 0;
        let mut planned_moves = 0;

        let outcome = loop {
            let Some(target) = food else {
                break Outcome::Filled;
            };
            if ticks >= self.max_ticks {
                break Outcome::TickLimit;
            }

            let decision = match self.engine.decide(body.make_contiguous(), target) {
                Ok(decision) => decision,
                Err(NavigationError::NoSafeMove) => break Outcome::NoSafeMove,
                Err(error) => {
                    return Err(error).context("harness produced an invalid body snapshot");
                }
            };
            ticks += 1;
            if decision.source() == DecisionSource::Planner {
                planned_moves += 1;
            }

            match advance(&mut body, decision.direction(), target, grid) {
                Step::Moved => {}
                Step::Ate => food = place_food(&mut rng, grid, &body),
                Step::Collided => break Outcome::Collision,
            }
        };

        info!(episode, length = body.len(), ticks, %outcome, "episode finished");
        Ok(EpisodeSummary {
            episode,
            length: body.len(),
            ticks,
            planned_moves,
            outcome,
        })
    }
}

/// Three segments centred on the grid, extending left from the head.
///
/// Grids too narrow for a full body start with fewer segments.
fn initial_body(grid: GridSize) -> VecDeque<Cell> {
    let head = Cell::new(grid.width() / 2, grid.height() / 2);
    let mut body = VecDeque::from([head]);

    while body.len() < INITIAL_LENGTH {
        let Some(next) = body
            .back()
            .and_then(|tail| tail.step(Direction::Left, grid))
        else {
            break;
        };
        body.push_back(next);
    }

    body
}

/// Uniformly random free cell, or `None` when the body covers the grid.
fn place_food(rng: &mut ChaCha8Rng, grid: GridSize, body: &VecDeque<Cell>) -> Option<Cell> {
    let free: Vec<Cell> = grid.cells().filter(|cell| !body.contains(cell)).collect();
    let food = free.choose(rng).copied();
    debug!(?food, free = free.len(), "placed food");
    food
}

/// Moves the head one cell, growing when it lands on `food`.
///
/// The tail leaves its cell before the head arrives, so stepping into the
/// vacated tail is legal unless the snake is growing this tick.
fn advance(body: &mut VecDeque<Cell>, direction: Direction, food: Cell, grid: GridSize) -> Step {
    let Some(next) = body.front().and_then(|head| head.step(direction, grid)) else {
        return Step::Collided;
    };

    let ate = next == food;
    if !ate {
        let _ = body.pop_back();
    }
    if body.contains(&next) {
        return Step::Collided;
    }
    body.push_front(next);

    if ate {
        Step::Ate
    } else {
        Step::Moved
    }
}
