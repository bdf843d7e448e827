use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use homestead::{
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    systems::{ConstructionSystem, VillagerSystem},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless homestead scenario runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/skirmish.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in ticks (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }

    let mut world = scenario.build_world()?;
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_system(VillagerSystem::new())
        .with_system(ConstructionSystem::new())
        .build();

    engine.run(&mut world, ticks)?;

    println!("Scenario '{}' completed after {} ticks.", scenario.name, ticks);
    for player in world.players() {
        let depot = world.building(player.town_center);
        println!(
            "Player {}: wood {}, gold {}, food {}, buildings {}, units {}",
            player.id.0,
            depot.stock.wood,
            depot.stock.gold,
            depot.stock.food,
            world.buildings_of(player.id).count(),
            world.units_of(player.id).count(),
        );
    }
    Ok(())
}
