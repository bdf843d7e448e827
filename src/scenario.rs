//! Scenario files: YAML descriptions of a starting world.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::map::{TileGrid, TilePos};
use crate::world::{Stockpile, UnitKind, World};

fn default_tick_seconds() -> f64 {
    1.0
}

fn default_snapshot_interval_ticks() -> u64 {
    30
}

fn default_forest_clusters() -> u32 {
    10
}

fn default_forest_cluster_size() -> u32 {
    40
}

fn default_gold_clusters() -> u32 {
    4
}

fn default_wood() -> u32 {
    200
}

fn default_gold() -> u32 {
    100
}

fn default_food() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    pub map: MapConfig,
    pub players: Vec<ScenarioPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_forest_clusters")]
    pub forest_clusters: u32,
    #[serde(default = "default_forest_cluster_size")]
    pub forest_cluster_size: u32,
    #[serde(default = "default_gold_clusters")]
    pub gold_clusters: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlayer {
    pub town_center: PosConfig,
    #[serde(default)]
    pub villagers: Vec<PosConfig>,
    #[serde(default)]
    pub stockpile: StockpileConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PosConfig {
    pub x: i32,
    pub y: i32,
}

impl From<PosConfig> for TilePos {
    fn from(pos: PosConfig) -> Self {
        TilePos::new(pos.x, pos.y)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockpileConfig {
    #[serde(default = "default_wood")]
    pub wood: u32,
    #[serde(default = "default_gold")]
    pub gold: u32,
    #[serde(default = "default_food")]
    pub food: u32,
}

impl Default for StockpileConfig {
    fn default() -> Self {
        Self {
            wood: default_wood(),
            gold: default_gold(),
            food: default_food(),
        }
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

impl Scenario {
    /// Generates the map and spawns every player's town center and
    /// villagers. Positions outside the map are configuration errors.
    pub fn build_world(&self) -> Result<World> {
        let mut grid = TileGrid::new(self.map.width, self.map.height, self.seed);
        grid.generate_forest_clusters(self.map.forest_clusters, self.map.forest_cluster_size);
        grid.generate_gold_clusters(self.map.gold_clusters);

        let mut world = World::new(grid, self.tick_seconds);
        for (index, player) in self.players.iter().enumerate() {
            let stock = Stockpile {
                wood: player.stockpile.wood,
                gold: player.stockpile.gold,
                food: player.stockpile.food,
            };
            let id = world
                .add_player(player.town_center.into(), stock)
                .with_context(|| {
                    format!(
                        "player {index}: town center ({}, {}) is outside the map",
                        player.town_center.x, player.town_center.y
                    )
                })?;
            for villager in &player.villagers {
                world
                    .spawn_unit(UnitKind::Villager, (*villager).into(), id)
                    .with_context(|| {
                        format!(
                            "player {index}: villager ({}, {}) is outside the map",
                            villager.x, villager.y
                        )
                    })?;
            }
        }
        Ok(world)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(240)
    }
}
