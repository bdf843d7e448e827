//! Tile-based world grid and procedural resource cluster generation.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::world::{BuildingId, BuildingKind};

/// Harvestable resource kinds. Farm tiles carry `Food` so the unified
/// resource search can find them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Gold,
    Food,
}

/// Position on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: TilePos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// The 8-connected neighborhood, diagonals included.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

/// One grid cell. A tile holding a building never carries a resource,
/// except Farm tiles whose resource is set to `Food`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub resource: Option<ResourceKind>,
    pub building: Option<BuildingId>,
}

/// World grid with its own seeded random source, so repeated map
/// generation stays independent and reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    rng: ChaCha8Rng,
}

impl TileGrid {
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: TilePos) -> usize {
        assert!(self.in_bounds(pos), "tile access out of bounds: {pos:?}");
        (pos.y * self.width + pos.x) as usize
    }

    /// Panics when `pos` is out of bounds. Callers probing unknown
    /// positions go through `is_empty` instead.
    pub fn tile(&self, pos: TilePos) -> &Tile {
        &self.tiles[self.index(pos)]
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> &mut Tile {
        let index = self.index(pos);
        &mut self.tiles[index]
    }

    /// True when the position is inside the map and holds neither a
    /// resource nor a building.
    pub fn is_empty(&self, pos: TilePos) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let tile = self.tile(pos);
        tile.resource.is_none() && tile.building.is_none()
    }

    /// Bounds-checked write of a building reference. Out-of-range
    /// placements are ignored. Farms additionally mark the tile with a
    /// `Food` resource so the resource search finds them.
    pub fn place_building(&mut self, id: BuildingId, kind: BuildingKind, pos: TilePos) {
        if !self.in_bounds(pos) {
            return;
        }
        let tile = self.tile_mut(pos);
        tile.building = Some(id);
        if kind == BuildingKind::Farm {
            tile.resource = Some(ResourceKind::Food);
        }
    }

    /// Bounds-checked resource write, ignored out of range.
    pub fn place_resource(&mut self, pos: TilePos, kind: ResourceKind) {
        if self.in_bounds(pos) {
            self.tile_mut(pos).resource = Some(kind);
        }
    }

    pub fn clear_resource(&mut self, pos: TilePos) {
        self.tile_mut(pos).resource = None;
    }

    pub fn generate_forest_clusters(&mut self, count: u32, cluster_size: u32) {
        for _ in 0..count {
            let origin = self.random_pos();
            self.grow_cluster(origin, cluster_size, ResourceKind::Wood);
        }
    }

    pub fn generate_gold_clusters(&mut self, count: u32) {
        for _ in 0..count {
            let origin = self.random_pos();
            let cluster_size = self.rng.gen_range(3..=10);
            self.grow_cluster(origin, cluster_size, ResourceKind::Gold);
        }
    }

    fn random_pos(&mut self) -> TilePos {
        let (width, height) = (self.width, self.height);
        TilePos::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height))
    }

    /// Grows an organic blob of `kind` tiles from `origin` with a
    /// randomized flood fill. Tiles already holding a resource or a
    /// building are skipped. Stops once `target_size` tiles are placed
    /// or the frontier is exhausted, whichever comes first; an
    /// out-of-bounds origin therefore places nothing.
    pub fn grow_cluster(&mut self, origin: TilePos, target_size: u32, kind: ResourceKind) {
        let mut remaining = target_size;
        let mut frontier = vec![origin];
        let mut seen: HashSet<TilePos> = HashSet::from([origin]);
        let mut directions = DIRECTIONS;

        while remaining > 0 && !frontier.is_empty() {
            let pick = self.rng.gen_range(0..frontier.len());
            let pos = frontier.swap_remove(pick);
            if !self.in_bounds(pos) || !self.is_empty(pos) {
                continue;
            }
            self.tile_mut(pos).resource = Some(kind);
            remaining -= 1;

            // Shuffling the expansion order keeps clusters from growing
            // into rectangles.
            directions.shuffle(&mut self.rng);
            for (dx, dy) in directions {
                let next = TilePos::new(pos.x + dx, pos.y + dy);
                if self.in_bounds(next) && seen.insert(next) {
                    frontier.push(next);
                }
            }
        }
    }

    /// Total tiles currently carrying `kind`.
    pub fn count_resource_tiles(&self, kind: ResourceKind) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.resource == Some(kind))
            .count()
    }
}
