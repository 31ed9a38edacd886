//! World orchestration
//!
//! The world owns the grid and the civilization roster and advances as a
//! strictly sequential series of discrete turns: prune defeated
//! civilizations, collect every proposed move, resolve conflicts, advance
//! time. There is exactly one writer — the turn-stepping routine — and
//! readers consume either `&World` accessors or an immutable
//! [`WorldSnapshot`] published after a turn completes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biome;
use crate::civ::{CivId, CivKind, Civilization, Move, NATURE};
use crate::combat::{self, TileCapture};
use crate::grid::{Rgb, TerrainKind, TileGrid, TileId};
use crate::rng::{take_random, SimRng};

/// Pixel edge length of one tile, for camera framing in consumers.
pub const TILE_SCALE: u32 = 20;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("no unclaimed tile left to place {what}")]
    NoSpaceAvailable { what: &'static str },
}

#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub civilizations: u32,
    pub turn_interval_days: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            civilizations: 5,
            turn_interval_days: 1.0,
        }
    }
}

/// Outcome of one `advance_turn` call.
#[derive(Debug, Clone)]
pub struct TurnSummary {
    pub turn: u64,
    pub time_days: f64,
    pub defeated: Vec<DefeatedCiv>,
    pub captures: Vec<TileCapture>,
    /// Set by the engine when this turn produced a snapshot file.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DefeatedCiv {
    pub id: CivId,
    pub name: String,
}

pub struct World {
    grid: TileGrid,
    civs: Vec<Civilization>,
    turn: u64,
    time_days: f64,
    turn_interval_days: f64,
}

impl World {
    /// Builds the grid, partitions it into biomes and settles the starting
    /// civilizations, each on one randomly drawn unclaimed tile.
    pub fn generate(config: &WorldConfig, rng: &mut SimRng) -> Result<Self, WorldError> {
        let mut grid = TileGrid::new(config.width, config.height)?;
        // Biomes are construction scaffolding; their tile lists die here.
        biome::generate(&mut grid, rng)?;

        let mut world = Self {
            grid,
            civs: vec![Civilization::new(
                NATURE,
                "nature".to_string(),
                Rgb::new(0, 0, 0),
                CivKind::Sentinel,
            )],
            turn: 0,
            time_days: 0.0,
            turn_interval_days: config.turn_interval_days,
        };

        for id in 0..world.grid.tile_count() as TileId {
            world.civs[0].on_tile_gained(id, &world.grid);
        }

        let mut pool: Vec<TileId> = (0..world.grid.tile_count() as TileId).collect();
        for index in 0..config.civilizations {
            let start = take_random(&mut pool, rng).ok_or(WorldError::NoSpaceAvailable {
                what: "civilization start",
            })?;
            let id = CivId(world.civs.len() as u32);
            world.civs.push(Civilization::new(
                id,
                format!("civ-{}", index + 1),
                Rgb::random(rng),
                CivKind::Active,
            ));
            world.transfer_tile(start, id, rng);
        }

        Ok(world)
    }

    /// Runs one discrete turn and reports what changed.
    ///
    /// All moves are collected before any is resolved, so no civilization's
    /// move can react to another's outcome within the same turn.
    pub fn advance_turn(&mut self, rng: &mut SimRng) -> TurnSummary {
        self.turn += 1;
        let defeated = self.prune_defeated();
        let moves = self.collect_moves(rng);
        let captures = combat::resolve_moves(self, moves, rng);
        self.time_days += self.turn_interval_days;

        #[cfg(debug_assertions)]
        self.assert_invariants();

        TurnSummary {
            turn: self.turn,
            time_days: self.time_days,
            defeated,
            captures,
            snapshot_path: None,
        }
    }

    /// A civilization emptied during turn N leaves the roster at the start
    /// of turn N+1, never mid-turn.
    fn prune_defeated(&mut self) -> Vec<DefeatedCiv> {
        let mut defeated = Vec::new();
        for civ in &mut self.civs {
            if civ.is_active() && civ.territory().is_empty() {
                civ.mark_defeated();
                defeated.push(DefeatedCiv {
                    id: civ.id(),
                    name: civ.name().to_string(),
                });
            }
        }
        defeated
    }

    fn collect_moves(&self, rng: &mut SimRng) -> Vec<Move> {
        self.civs
            .iter()
            .filter(|civ| civ.is_active())
            .filter_map(|civ| civ.take_turn(&self.grid, rng))
            .collect()
    }

    /// Moves `target` to `to`, keeping grid ownership and both parties' tile
    /// sets consistent in one step; no partially-applied transfer is ever
    /// observable from outside.
    pub(crate) fn transfer_tile(&mut self, target: TileId, to: CivId, rng: &mut SimRng) {
        let from = self.grid.tile(target).owner();
        debug_assert_ne!(from, to, "transfer requires an ownership change");
        self.grid.set_owner(target, to);
        self.civs[from.0 as usize].on_tile_lost(target, &self.grid, rng);
        self.civs[to.0 as usize].on_tile_gained(target, &self.grid);
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn civ(&self, id: CivId) -> &Civilization {
        &self.civs[id.0 as usize]
    }

    pub fn civilizations(&self) -> &[Civilization] {
        &self.civs
    }

    pub fn active_civilizations(&self) -> impl Iterator<Item = &Civilization> {
        self.civs.iter().filter(|civ| civ.is_active())
    }

    pub fn nature(&self) -> &Civilization {
        &self.civs[NATURE.0 as usize]
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn time_days(&self) -> f64 {
        self.time_days
    }

    /// World extent in pixels at the fixed per-tile scale, for camera
    /// framing.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            width: self.grid.width() * TILE_SCALE,
            height: self.grid.height() * TILE_SCALE,
        }
    }

    /// Immutable copy of everything a presentation layer needs.
    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let cells = self
            .grid
            .tiles()
            .iter()
            .map(|tile| CellState {
                terrain: tile.terrain(),
                owner: tile.is_owned().then(|| tile.owner().0),
            })
            .collect();

        let civilizations = self
            .active_civilizations()
            .map(|civ| CivState {
                id: civ.id().0,
                name: civ.name().to_string(),
                color: civ.color(),
                capital: civ.capital().map(|id| {
                    let tile = self.grid.tile(id);
                    [tile.x(), tile.y()]
                }),
                territory: civ.territory().len(),
                border_tiles: civ
                    .border_tiles()
                    .iter()
                    .map(|&id| {
                        let tile = self.grid.tile(id);
                        [tile.x(), tile.y()]
                    })
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            scenario: scenario.to_string(),
            turn: self.turn,
            time_days: self.time_days,
            width: self.grid.width(),
            height: self.grid.height(),
            bounds: self.bounds(),
            cells,
            civilizations,
        }
    }

    /// Full sweep of the structural invariants. A violation is a programming
    /// defect, so this panics rather than tolerating divergence. Debug
    /// builds run it after every turn.
    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        let mut owned_total = 0usize;
        for civ in &self.civs {
            owned_total += civ.territory().len();

            for &t in civ.territory() {
                assert_eq!(
                    self.grid.tile(t).owner(),
                    civ.id(),
                    "territory of {} contains tile {t} it does not own",
                    civ.name()
                );
            }

            for tile in self.grid.tiles() {
                let id = tile.id();
                let in_territory = tile.owner() == civ.id();
                let expect_border = in_territory
                    && tile
                        .neighbors()
                        .iter()
                        .any(|&n| self.grid.tile(n).owner() != civ.id());
                assert_eq!(
                    civ.border_tiles().contains(&id),
                    expect_border,
                    "border set of {} diverged at tile {id}",
                    civ.name()
                );
                let expect_neighboring = !in_territory
                    && tile
                        .neighbors()
                        .iter()
                        .any(|&n| self.grid.tile(n).owner() == civ.id());
                assert_eq!(
                    civ.neighboring_tiles().contains(&id),
                    expect_neighboring,
                    "neighboring set of {} diverged at tile {id}",
                    civ.name()
                );
            }

            if civ.kind() == CivKind::Active {
                match civ.capital() {
                    Some(capital) => assert!(
                        civ.territory().contains(&capital),
                        "capital of {} lies outside its territory",
                        civ.name()
                    ),
                    None => assert!(
                        civ.territory().is_empty(),
                        "{} has territory but no capital",
                        civ.name()
                    ),
                }
            }
        }
        assert_eq!(
            owned_total,
            self.grid.tile_count(),
            "territories no longer partition the grid"
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub turn: u64,
    pub time_days: f64,
    pub width: u32,
    pub height: u32,
    pub bounds: Bounds,
    /// Row-major, `width * height` entries.
    pub cells: Vec<CellState>,
    pub civilizations: Vec<CivState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellState {
    pub terrain: TerrainKind,
    /// Claiming civilization, or `None` for unclaimed land.
    pub owner: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivState {
    pub id: u32,
    pub name: String,
    pub color: Rgb,
    pub capital: Option<[u32; 2]>,
    pub territory: usize,
    pub border_tiles: Vec<[u32; 2]>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}
