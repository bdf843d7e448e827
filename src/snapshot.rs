//! World snapshots: periodic checkpoints and full save/restore.
//!
//! The whole world serializes through serde, ids included, so a
//! restored world carries the same cross-references (a unit's farm
//! claim, a player's depot) as the one that was saved.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::World;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub scenario: String,
    pub tick: u64,
    pub created: String,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    meta: SnapshotMetadata,
    world: World,
}

/// Writes a checkpoint every `interval_ticks` ticks. An interval of
/// zero disables checkpointing entirely.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(
        &self,
        world: &World,
        scenario: &str,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval_ticks == 0 || world.tick() % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("tick_{:06}.json", world.tick()));
        save_world(&path, world, scenario)?;
        Ok(Some(path))
    }
}

pub fn save_world(
    path: impl AsRef<Path>,
    world: &World,
    scenario: &str,
) -> Result<(), SnapshotError> {
    let file = SnapshotFile {
        meta: SnapshotMetadata {
            scenario: scenario.to_string(),
            tick: world.tick(),
            created: Local::now().to_rfc3339(),
        },
        world: world.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;
    Ok(())
}

/// Restores a saved world. Missing or corrupted files come back as an
/// error the caller can recover from; nothing here panics.
pub fn load_world(path: impl AsRef<Path>) -> Result<(World, SnapshotMetadata), SnapshotError> {
    let data = fs::read_to_string(path)?;
    let file: SnapshotFile = serde_json::from_str(&data)?;
    Ok((file.world, file.meta))
}
