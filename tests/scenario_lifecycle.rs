use homestead::engine::{EngineBuilder, EngineSettings};
use homestead::scenario::ScenarioLoader;
use homestead::systems::{ConstructionSystem, VillagerSystem};
use tempfile::tempdir;

fn loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn skirmish_scenario_runs_and_checkpoints() {
    let scenario = loader().load("scenarios/skirmish.yaml").unwrap();
    let mut world = scenario.build_world().unwrap();
    assert_eq!(world.players().len(), 2);
    assert_eq!(world.units().len(), 6);

    let temp = tempdir().unwrap();
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: 20,
        snapshot_dir: temp.path().to_path_buf(),
    };
    let mut engine = EngineBuilder::new(settings)
        .with_system(VillagerSystem::new())
        .with_system(ConstructionSystem::new())
        .build();

    let mut ticks_seen = Vec::new();
    let mut snapshots = Vec::new();
    engine
        .run_with_hook(&mut world, 60, |summary| {
            ticks_seen.push(summary.tick);
            if let Some(path) = &summary.snapshot_path {
                snapshots.push(path.clone());
            }
        })
        .unwrap();

    assert_eq!(ticks_seen.len(), 60);
    assert_eq!(world.tick(), 60);
    assert_eq!(snapshots.len(), 3, "expected checkpoints at ticks 20, 40, 60");
    for path in &snapshots {
        assert!(path.exists());
    }

    let grid = world.grid();
    for unit in world.units() {
        assert!(grid.in_bounds(unit.pos), "unit drifted off the map");
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let scenario = loader().load("scenarios/meadow.yaml").unwrap();

    let run = |ticks: u64| {
        let mut world = scenario.build_world().unwrap();
        let temp = tempdir().unwrap();
        let settings = EngineSettings {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            snapshot_interval_ticks: 0,
            snapshot_dir: temp.path().to_path_buf(),
        };
        let mut engine = EngineBuilder::new(settings)
            .with_system(VillagerSystem::new())
            .with_system(ConstructionSystem::new())
            .build();
        engine.run(&mut world, ticks).unwrap();
        serde_json::to_value(&world).unwrap()
    };

    assert_eq!(run(90), run(90), "two seeded runs diverged");
}

#[test]
fn map_generation_matches_the_scenario_request() {
    let scenario = loader().load("scenarios/meadow.yaml").unwrap();
    let world = scenario.build_world().unwrap();
    let grid = world.grid();

    use homestead::map::ResourceKind;
    let wood = grid.count_resource_tiles(ResourceKind::Wood);
    // Three clusters of twelve, minus whatever ran out of room.
    assert!(wood > 0 && wood <= 36, "unexpected wood tile count {wood}");
    let gold = grid.count_resource_tiles(ResourceKind::Gold);
    assert!(gold >= 3 && gold <= 20, "unexpected gold tile count {gold}");
}
