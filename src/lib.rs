pub mod biome;
pub mod civ;
pub mod combat;
pub mod engine;
pub mod grid;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod web;
pub mod world;

pub use combat::TileCapture;
pub use engine::{Engine, EngineConfig, EngineError};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{TurnSummary, World, WorldConfig, WorldError, WorldSnapshot};
