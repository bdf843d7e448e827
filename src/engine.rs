//! Engine assembly: system scheduling, the tick loop, snapshot cadence.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::rng::{RngManager, SystemRng};
use crate::snapshot::SnapshotWriter;
use crate::world::World;

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    /// Advances the world `ticks` times, updating every system in
    /// registration order within each tick, and feeds a summary of each
    /// completed tick to `hook`.
    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        ticks: u64,
        mut hook: impl FnMut(&TickSummary),
    ) -> Result<()> {
        for _ in 0..ticks {
            let ctx = SystemContext {
                tick: world.tick(),
                now_seconds: world.now(),
                dt_seconds: world.tick_seconds(),
            };
            let mut system_reports = Vec::with_capacity(self.systems.len());
            for system in &mut self.systems {
                let start = Instant::now();
                let mut rng_stream = self.rng.stream(system.name());
                system.run(&ctx, world, &mut rng_stream)?;
                system_reports.push(SystemRunReport {
                    name: system.name(),
                    duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
                });
            }
            world.advance_time();
            let snapshot_path = self
                .snapshot_writer
                .maybe_write(world, &self.settings.scenario_name)?;
            hook(&TickSummary {
                tick: ctx.tick,
                system_reports,
                snapshot_path,
            });
        }
        Ok(())
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }
}

/// Per-tick facts shared with every system.
pub struct SystemContext {
    pub tick: u64,
    pub now_seconds: f64,
    pub dt_seconds: f64,
}

pub trait System {
    fn name(&self) -> &'static str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: &'static str,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub system_reports: Vec<SystemRunReport>,
    pub snapshot_path: Option<PathBuf>,
}
