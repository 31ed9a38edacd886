//! Biome generation — Voronoi-like terrain partition
//!
//! A fixed number of seeds flood-fill the grid in synchronous rounds: every
//! biome claims exactly one tile from its frontier per round until all tiles
//! are covered. Biomes only exist for the duration of this phase.

use rand::Rng;

use crate::grid::{TerrainKind, TileGrid, TileId};
use crate::rng::{take_random, SimRng};
use crate::world::WorldError;

/// One contiguous terrain region under construction.
#[derive(Debug)]
pub struct Biome {
    terrain: TerrainKind,
    tiles: Vec<TileId>,
    frontier: Vec<TileId>,
}

impl Biome {
    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }
}

/// Number of biome seeds for a grid of `tile_count` tiles.
pub fn biome_count(tile_count: usize) -> usize {
    let count = ((tile_count as f64).sqrt() / 5.0).round() as usize;
    count.max(1)
}

/// Partitions the whole grid into biomes, assigning a terrain kind to every
/// tile. Deterministic for a given RNG state.
pub fn generate(grid: &mut TileGrid, rng: &mut SimRng) -> Result<Vec<Biome>, WorldError> {
    let mut biomes = Vec::new();
    let mut uncovered = grid.tile_count();

    // Seed placement draws from the explicit pool of still-uncovered tiles,
    // so it fails loudly instead of hanging once space runs out.
    let mut pool: Vec<TileId> = (0..grid.tile_count() as TileId).collect();
    for _ in 0..biome_count(grid.tile_count()) {
        let seed = take_random(&mut pool, rng).ok_or(WorldError::NoSpaceAvailable {
            what: "biome seed",
        })?;
        let terrain = TerrainKind::ALL[rng.gen_range(0..TerrainKind::ALL.len())];
        biomes.push(Biome {
            terrain,
            tiles: Vec::new(),
            frontier: Vec::new(),
        });
        let index = biomes.len() - 1;
        cover(grid, &mut biomes, index, seed);
        uncovered -= 1;
    }

    while uncovered > 0 {
        let covered_this_round = run_round(grid, &mut biomes, rng);
        assert!(
            covered_this_round > 0,
            "biome frontiers exhausted with {uncovered} tiles uncovered"
        );
        uncovered -= covered_this_round;
    }

    Ok(biomes)
}

/// One synchronous round: each biome claims at most one frontier tile.
fn run_round(grid: &mut TileGrid, biomes: &mut [Biome], rng: &mut SimRng) -> usize {
    let mut covered = 0;
    for index in 0..biomes.len() {
        // A candidate claimed by another biome earlier this round is
        // discarded and a different frontier member is chosen; first claim
        // wins.
        let claimed = loop {
            match take_random(&mut biomes[index].frontier, rng) {
                Some(candidate) if grid.tile(candidate).is_covered() => continue,
                other => break other,
            }
        };
        if let Some(id) = claimed {
            cover(grid, biomes, index, id);
            covered += 1;
        }
    }
    covered
}

fn cover(grid: &mut TileGrid, biomes: &mut [Biome], index: usize, id: TileId) {
    grid.set_terrain(id, biomes[index].terrain);
    biomes[index].tiles.push(id);

    let neighbors: Vec<TileId> = grid.tile(id).neighbors().to_vec();
    for n in neighbors {
        if !grid.tile(n).is_covered() && !biomes[index].frontier.contains(&n) {
            biomes[index].frontier.push(n);
        }
    }

    // The claimed tile is no longer claimable by anyone else.
    for (other, biome) in biomes.iter_mut().enumerate() {
        if other != index {
            biome.frontier.retain(|&t| t != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn seed_count_formula() {
        assert_eq!(biome_count(1), 1);
        assert_eq!(biome_count(16), 1);
        assert_eq!(biome_count(625), 5);
        assert_eq!(biome_count(1_000_000), 200);
    }

    #[test]
    fn covers_every_tile() {
        for (w, h, seed) in [(1, 1, 0u64), (5, 3, 1), (8, 8, 2), (13, 7, 3)] {
            let mut grid = TileGrid::new(w, h).unwrap();
            let mut rng = seeded(seed);
            let biomes = generate(&mut grid, &mut rng).unwrap();
            assert!(grid.tiles().iter().all(|t| t.is_covered()));
            let claimed: usize = biomes.iter().map(|b| b.tiles().len()).sum();
            assert_eq!(claimed, grid.tile_count());
        }
    }

    #[test]
    fn single_biome_paints_uniform_terrain() {
        // 16 tiles -> exactly one seed, so the whole grid shares its terrain.
        let mut grid = TileGrid::new(4, 4).unwrap();
        let mut rng = seeded(99);
        let biomes = generate(&mut grid, &mut rng).unwrap();
        assert_eq!(biomes.len(), 1);
        let terrain = biomes[0].terrain();
        assert!(grid.tiles().iter().all(|t| t.terrain() == terrain));
    }

    #[test]
    fn biome_regions_are_contiguous() {
        let mut grid = TileGrid::new(10, 10).unwrap();
        let mut rng = seeded(5);
        let biomes = generate(&mut grid, &mut rng).unwrap();
        assert_eq!(biomes.len(), 2);
        for biome in &biomes {
            // Every claimed tile beyond the seed touches another tile of the
            // same biome.
            for &id in &biome.tiles()[1..] {
                let touches = grid
                    .tile(id)
                    .neighbors()
                    .iter()
                    .any(|n| biome.tiles().contains(n));
                assert!(touches, "tile {id} is disconnected from its biome");
            }
        }
    }
}
