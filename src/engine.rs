//! Engine — the externally driven step loop
//!
//! The engine owns the world, the seeded RNG and the snapshot manager. It
//! never schedules itself: the owning process calls [`Engine::step`] (or the
//! bounded `run` helpers) from whatever loop it likes — per frame, per fixed
//! interval or per test iteration.

use thiserror::Error;

use crate::rng::{self, SimRng};
use crate::scenario::Scenario;
use crate::snapshot::{SnapshotConfig, SnapshotError, SnapshotManager};
use crate::world::{TurnSummary, World, WorldError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub snapshot: SnapshotConfig,
}

impl EngineConfig {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            snapshot: SnapshotConfig {
                interval: scenario.snapshot_interval,
                ..SnapshotConfig::default()
            },
        }
    }

    pub fn with_snapshot_dir(mut self, dir: String) -> Self {
        self.snapshot.output_dir = dir;
        self
    }
}

pub struct Engine {
    world: World,
    rng: SimRng,
    snapshot_manager: SnapshotManager,
    scenario_name: String,
}

impl Engine {
    /// Seeds the RNG from the scenario and generates the starting world.
    pub fn from_scenario(scenario: &Scenario, config: EngineConfig) -> Result<Self, EngineError> {
        let mut rng = rng::seeded(scenario.seed);
        let world = World::generate(&scenario.world_config(), &mut rng)?;
        Ok(Self {
            world,
            rng,
            snapshot_manager: SnapshotManager::new(config.snapshot),
            scenario_name: scenario.name.clone(),
        })
    }

    /// Advances the world one turn and writes a snapshot file when the
    /// interval says so.
    pub fn step(&mut self) -> Result<TurnSummary, EngineError> {
        let mut summary = self.world.advance_turn(&mut self.rng);
        summary.snapshot_path =
            self.snapshot_manager
                .maybe_snapshot(summary.turn, &self.scenario_name, &self.world)?;
        Ok(summary)
    }

    pub fn run(&mut self, turns: u64) -> Result<(), EngineError> {
        self.run_with_hook(turns, |_, _| {})
    }

    /// Runs up to `turns` turns, invoking the hook after each one. Stops
    /// early once no active civilization remains — the explicit stopping
    /// predicate for a simulation that otherwise never terminates.
    pub fn run_with_hook(
        &mut self,
        turns: u64,
        mut hook: impl FnMut(&TurnSummary, &World),
    ) -> Result<(), EngineError> {
        for _ in 0..turns {
            let summary = self.step()?;
            hook(&summary, &self.world);
            if self.world.active_civilizations().next().is_none() {
                break;
            }
        }
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn current_turn(&self) -> u64 {
        self.world.turn()
    }
}
