#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick navigation decisions for a snake chasing food on a fixed grid.
//!
//! The [`NavigationEngine`] owns the Hamiltonian tour built at startup and
//! the scratch buffers of every subsystem. Each call to
//! [`NavigationEngine::decide`] captures the body snapshot, tries a certified
//! A* route while the snake is short, and otherwise falls back to walking (or
//! cutting across) the tour. Nothing is remembered between ticks, so the same
//! inputs always produce the same decision.

use serde::{Deserialize, Serialize};
use snake_pilot_core::{
    Cell, Decision, DecisionSource, Direction, GridSize, NavigationError, SnapshotError,
};
use snake_pilot_grid::{Occupancy, ReachabilityChecker};
use snake_pilot_system_follower::CycleFollower;
use snake_pilot_system_planner::{AStarPlanner, PlannerConfig};
use snake_pilot_system_shortcut::{ShortcutPolicy, ShortcutTuning};
use snake_pilot_system_tour::{HamiltonianCycleBuilder, HamiltonianTour, TourError, TourStrategy};
use tracing::{debug, warn};

/// Default body length, as a share of the grid, below which A* is attempted.
pub const DEFAULT_EXPLORE_FRACTION: f32 = 0.3;

/// Policy consulted when no certified A* route is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Walk to the next tour cell.
    CycleFollower,
    /// Skip ahead along the tour within a safety budget.
    Shortcut,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::CycleFollower
    }
}

/// Complete engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// A* is attempted while `body length < explore_fraction * cells`.
    pub explore_fraction: f32,
    /// Acceptance threshold for planned routes.
    pub planner: PlannerConfig,
    /// Policy used when the planner is skipped or fails.
    pub fallback: FallbackPolicy,
    /// Budget constants for [`FallbackPolicy::Shortcut`].
    pub shortcut: ShortcutTuning,
    /// Algorithm used to lay the tour at startup.
    pub tour: TourStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            explore_fraction: DEFAULT_EXPLORE_FRACTION,
            planner: PlannerConfig::default(),
            fallback: FallbackPolicy::default(),
            shortcut: ShortcutTuning::default(),
            tour: TourStrategy::default(),
        }
    }
}

/// Top-level decision maker combining the planner and the tour policies.
#[derive(Debug)]
pub struct NavigationEngine {
    config: EngineConfig,
    tour: HamiltonianTour,
    planner: AStarPlanner,
    reachability: ReachabilityChecker,
    follower: CycleFollower,
    shortcut: ShortcutPolicy,
}

impl NavigationEngine {
    /// Builds the tour for `grid` and prepares an engine around it.
    ///
    /// Fails when the configured strategy cannot lay a tour on the grid; the
    /// engine is unusable without one.
    pub fn new(grid: GridSize, config: EngineConfig) -> Result<Self, TourError> {
        let tour = HamiltonianCycleBuilder::new(config.tour).build(grid)?;
        Ok(Self::with_tour(tour, config))
    }

    /// Prepares an engine around an existing tour.
    ///
    /// The `tour` field of `config` is ignored.
    #[must_use]
    pub fn with_tour(tour: HamiltonianTour, config: EngineConfig) -> Self {
        Self {
            planner: AStarPlanner::new(config.planner),
            reachability: ReachabilityChecker::new(),
            follower: CycleFollower,
            shortcut: ShortcutPolicy::new(config.shortcut),
            config,
            tour,
        }
    }

    /// Grid the engine was built for.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.tour.grid()
    }

    /// Tour followed by the fallback policies.
    #[must_use]
    pub const fn tour(&self) -> &HamiltonianTour {
        &self.tour
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chooses the direction for this tick.
    ///
    /// `body` lists the snake head first. While the body is shorter than
    /// [`explore_fraction`](EngineConfig::explore_fraction) of the grid the
    /// engine plans an A* route to `target` and takes its first step, provided
    /// the route leaves enough space and the tail stays reachable from its
    /// end. In every other case the configured [`FallbackPolicy`] decides.
    ///
    /// Each tick is decided on its own, so a short snake can alternate between
    /// planner and fallback steps around the food without reaching it. Callers
    /// driving a game loop should bound it.
    ///
    /// Returns [`NavigationError::NoSafeMove`] when even the fallback finds no
    /// legal step, and [`NavigationError::InvalidSnapshot`] for malformed
    /// input.
    pub fn decide(&mut self, body: &[Cell], target: Cell) -> Result<Decision, NavigationError> {
        let occupancy = self.snapshot(body, target)?;
        let head = occupancy.head();

        if self.explores(&occupancy) {
            let first_step = self
                .certified_path(&occupancy, target)
                .and_then(|path| path.get(1).copied())
                .and_then(|next| Direction::between(head, next));
            if let Some(direction) = first_step {
                debug!(?head, ?target, ?direction, "following certified route");
                return Ok(Decision::new(direction, DecisionSource::Planner));
            }
            debug!(?head, ?target, "no certified route, falling back");
        }

        self.fall_back(&occupancy, target)
    }

    /// Route the planner would follow this tick, regardless of body length.
    ///
    /// The route is only returned when it passes both the planner's
    /// reachable-fraction test and the tail-reachability check.
    pub fn certified_plan(
        &mut self,
        body: &[Cell],
        target: Cell,
    ) -> Result<Option<Vec<Cell>>, NavigationError> {
        let occupancy = self.snapshot(body, target)?;
        Ok(self.certified_path(&occupancy, target))
    }

    fn snapshot(&self, body: &[Cell], target: Cell) -> Result<Occupancy, SnapshotError> {
        let grid = self.grid();
        if !grid.contains(target) {
            return Err(SnapshotError::TargetOutOfBounds { cell: target });
        }
        Occupancy::from_body(grid, body)
    }

    fn explores(&self, occupancy: &Occupancy) -> bool {
        let cells = self.grid().cell_count() as f32;
        (occupancy.len() as f32) < self.config.explore_fraction * cells
    }

    fn certified_path(&mut self, occupancy: &Occupancy, target: Cell) -> Option<Vec<Cell>> {
        let path = self
            .planner
            .plan(occupancy, target, &mut self.reachability)?;
        let end = *path.last()?;

        if self.reachability.can_reach_tail(end, occupancy) {
            Some(path)
        } else {
            debug!(?end, "planned route strands the tail");
            None
        }
    }

    fn fall_back(&self, occupancy: &Occupancy, target: Cell) -> Result<Decision, NavigationError> {
        let decision = match self.config.fallback {
            FallbackPolicy::CycleFollower => self
                .follower
                .next_step(occupancy, &self.tour)
                .map(|direction| Decision::new(direction, DecisionSource::CycleFollower)),
            FallbackPolicy::Shortcut => self
                .shortcut
                .next_step(occupancy, target, &self.tour)
                .map(|direction| Decision::new(direction, DecisionSource::Shortcut)),
        };

        if let Err(error) = &decision {
            warn!(head = ?occupancy.head(), %error, "fallback found no legal move");
        }
        decision
    }
}
