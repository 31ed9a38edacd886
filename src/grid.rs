//! Tile grid — flat, index-addressed world geometry
//!
//! Tiles live in a row-major `Vec` and refer to their up-to-four orthogonal
//! neighbors by index, so the simulation never holds reference cycles and
//! snapshots are plain copies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::civ::{CivId, NATURE};
use crate::world::WorldError;

pub type TileId = u32;

/// Terrain of a tile. The value feeds the expansion value formula; the color
/// is carried for presentation consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Plains,
    Desert,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 2] = [TerrainKind::Plains, TerrainKind::Desert];

    pub fn value(self) -> i32 {
        match self {
            TerrainKind::Plains => 1,
            TerrainKind::Desert => 0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TerrainKind::Plains => "Plains",
            TerrainKind::Desert => "Desert",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            TerrainKind::Plains => Rgb::new(102, 206, 112),
            TerrainKind::Desert => Rgb::new(239, 215, 138),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tile {
    id: TileId,
    x: u32,
    y: u32,
    terrain: Option<TerrainKind>,
    owner: CivId,
    neighbors: Vec<TileId>,
}

impl Tile {
    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
            .expect("terrain is assigned for every tile during world generation")
    }

    /// Whether a biome has claimed this tile yet. Only meaningful during the
    /// generation phase; afterwards every tile is covered.
    pub fn is_covered(&self) -> bool {
        self.terrain.is_some()
    }

    pub fn owner(&self) -> CivId {
        self.owner
    }

    /// Owned by a competing civilization, as opposed to unclaimed land.
    pub fn is_owned(&self) -> bool {
        self.owner != NATURE
    }

    pub fn neighbors(&self) -> &[TileId] {
        &self.neighbors
    }
}

/// Fixed-size grid of tiles with precomputed orthogonal adjacency.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds a W×H grid with every tile unclaimed and uncovered.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }

        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile {
                    id: y * width + x,
                    x,
                    y,
                    terrain: None,
                    owner: NATURE,
                    neighbors: neighbor_ids(width, height, x, y),
                });
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn index(&self, x: u32, y: u32) -> TileId {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id as usize]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn set_owner(&mut self, id: TileId, owner: CivId) {
        self.tiles[id as usize].owner = owner;
    }

    pub(crate) fn set_terrain(&mut self, id: TileId, terrain: TerrainKind) {
        self.tiles[id as usize].terrain = Some(terrain);
    }

    /// A tile is a border tile when any neighbor has a different owner.
    pub fn is_border(&self, id: TileId) -> bool {
        let owner = self.tile(id).owner;
        self.tile(id)
            .neighbors
            .iter()
            .any(|&n| self.tile(n).owner != owner)
    }

    /// Euclidean distance between two tile centers, in grid units.
    pub fn distance(&self, a: TileId, b: TileId) -> f64 {
        let ta = self.tile(a);
        let tb = self.tile(b);
        let dx = f64::from(ta.x) - f64::from(tb.x);
        let dy = f64::from(ta.y) - f64::from(tb.y);
        (dx * dx + dy * dy).sqrt()
    }
}

fn neighbor_ids(width: u32, height: u32, x: u32, y: u32) -> Vec<TileId> {
    let mut neighbors = Vec::with_capacity(4);
    if x > 0 {
        neighbors.push(y * width + (x - 1));
    }
    if x + 1 < width {
        neighbors.push(y * width + (x + 1));
    }
    if y > 0 {
        neighbors.push((y - 1) * width + x);
    }
    if y + 1 < height {
        neighbors.push((y + 1) * width + x);
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            TileGrid::new(0, 5),
            Err(WorldError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            TileGrid::new(5, 0),
            Err(WorldError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn adjacency_respects_edges() {
        let grid = TileGrid::new(3, 3).unwrap();
        assert_eq!(grid.tile(grid.index(0, 0)).neighbors().len(), 2);
        assert_eq!(grid.tile(grid.index(1, 0)).neighbors().len(), 3);
        assert_eq!(grid.tile(grid.index(1, 1)).neighbors().len(), 4);

        let center = grid.tile(grid.index(1, 1));
        let mut ids = center.neighbors().to_vec();
        ids.sort_unstable();
        assert_eq!(
            ids,
            vec![
                grid.index(1, 0),
                grid.index(0, 1),
                grid.index(2, 1),
                grid.index(1, 2)
            ]
        );
    }

    #[test]
    fn single_tile_grid_has_no_neighbors() {
        let grid = TileGrid::new(1, 1).unwrap();
        assert!(grid.tile(0).neighbors().is_empty());
    }

    #[test]
    fn distance_is_euclidean() {
        let grid = TileGrid::new(4, 4).unwrap();
        let a = grid.index(0, 0);
        let b = grid.index(3, 0);
        assert_eq!(grid.distance(a, b), 3.0);
        let c = grid.index(3, 4 - 1);
        assert!((grid.distance(a, c) - (9.0f64 + 9.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn border_tracks_ownership() {
        let mut grid = TileGrid::new(2, 1).unwrap();
        assert!(!grid.is_border(0), "uniform ownership has no borders");
        grid.set_owner(0, CivId(1));
        assert!(grid.is_border(0));
        assert!(grid.is_border(1));
    }
}
