//! Scenario files — YAML descriptions of a simulation run

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::world::WorldConfig;

fn default_turn_days() -> f64 {
    1.0
}

fn default_snapshot_interval() -> u64 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub civilizations: u32,
    /// Simulated days added per turn.
    #[serde(default = "default_turn_days")]
    pub turn_days: f64,
    /// Default turn budget for a run; overridable on the command line.
    #[serde(default)]
    pub turns: Option<u64>,
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u64,
}

impl Scenario {
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            width: self.width,
            height: self.height,
            civilizations: self.civilizations,
            turn_interval_days: self.turn_days,
        }
    }

    pub fn turns(&self, override_turns: Option<u64>) -> u64 {
        override_turns.or(self.turns).unwrap_or(200)
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_scenario_with_defaults() {
        let scenario: Scenario = serde_yaml::from_str(
            "name: tiny\nseed: 9\nwidth: 12\nheight: 8\ncivilizations: 2\n",
        )
        .unwrap();
        assert_eq!(scenario.name, "tiny");
        assert_eq!(scenario.turn_days, 1.0);
        assert_eq!(scenario.snapshot_interval, 20);
        assert_eq!(scenario.turns(None), 200);
        assert_eq!(scenario.turns(Some(5)), 5);

        let config = scenario.world_config();
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 8);
        assert_eq!(config.civilizations, 2);
    }
}
