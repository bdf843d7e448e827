use std::path::PathBuf;

use homestead::engine::{EngineBuilder, EngineSettings};
use homestead::map::{ResourceKind, TilePos, TileGrid};
use homestead::systems::ConstructionSystem;
use homestead::world::{BuildingKind, Stockpile, UnitKind, World};

fn engine() -> homestead::Engine {
    let settings = EngineSettings {
        scenario_name: "construction-test".into(),
        seed: 1,
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots"),
    };
    EngineBuilder::new(settings)
        .with_system(ConstructionSystem::new())
        .build()
}

fn world_at_population_cap(wood: u32) -> (World, homestead::world::PlayerId) {
    let mut world = World::new(TileGrid::new(20, 20, 4), 1.0);
    let player = world
        .add_player(TilePos::new(10, 10), Stockpile { wood, gold: 0, food: 0 })
        .unwrap();
    for i in 0..5 {
        world
            .spawn_unit(UnitKind::Villager, TilePos::new(i, 0), player)
            .unwrap();
    }
    (world, player)
}

#[test]
fn house_waits_for_the_full_price() {
    let (mut world, player) = world_at_population_cap(40);
    let depot = world.player(player).town_center;

    let mut engine = engine();
    engine.run(&mut world, 30).unwrap();

    assert_eq!(
        world.buildings_of(player).count(),
        1,
        "a house went up without funds"
    );
    assert_eq!(world.building(depot).stock.wood, 40);

    // Topping the ledger up to the exact price unlocks the build.
    world.building_mut(depot).stock.wood = 50;
    engine.run(&mut world, 2).unwrap();

    let house = world
        .buildings_of(player)
        .find(|b| b.kind == BuildingKind::House)
        .expect("house was not built");
    assert_eq!(world.building(depot).stock.wood, 0);
    assert_eq!(world.population_cap_of(player), 10);
    assert!(world.grid().tile(house.pos).building == Some(house.id));
}

#[test]
fn farm_goes_up_near_the_depot_with_a_food_marker() {
    let mut world = World::new(TileGrid::new(20, 20, 4), 1.0);
    let player = world
        .add_player(TilePos::new(10, 10), Stockpile { wood: 60, gold: 0, food: 0 })
        .unwrap();
    world
        .spawn_unit(UnitKind::Villager, TilePos::new(9, 9), player)
        .unwrap();
    let depot = world.player(player).town_center;

    let mut engine = engine();
    engine.run(&mut world, 15).unwrap();

    let farm = world
        .buildings_of(player)
        .find(|b| b.kind == BuildingKind::Farm)
        .expect("farm was not built");
    assert_eq!(world.building(depot).stock.wood, 0);
    let tile = world.grid().tile(farm.pos);
    assert_eq!(tile.building, Some(farm.id));
    assert_eq!(tile.resource, Some(ResourceKind::Food));
    let center = world.building(depot).pos;
    let ring = (farm.pos.x - center.x).abs().max((farm.pos.y - center.y).abs());
    assert!(ring >= 1 && ring <= 3, "farm placed at ring {ring}");
}

#[test]
fn barracks_is_never_duplicated() {
    let mut world = World::new(TileGrid::new(20, 20, 4), 1.0);
    let player = world
        .add_player(
            TilePos::new(10, 10),
            Stockpile { wood: 1000, gold: 500, food: 0 },
        )
        .unwrap();
    world
        .spawn_unit(UnitKind::Villager, TilePos::new(9, 9), player)
        .unwrap();

    let mut engine = engine();
    // Enough time for the farm cap and several extra cooldown windows.
    engine.run(&mut world, 120).unwrap();

    let farms = world
        .buildings_of(player)
        .filter(|b| b.kind == BuildingKind::Farm)
        .count();
    let barracks = world
        .buildings_of(player)
        .filter(|b| b.kind == BuildingKind::Barracks)
        .count();
    assert_eq!(farms, 4);
    assert_eq!(barracks, 1);
}

#[test]
fn construction_is_abandoned_when_no_site_is_free() {
    let mut world = World::new(TileGrid::new(20, 20, 4), 1.0);
    let player = world
        .add_player(TilePos::new(10, 10), Stockpile { wood: 60, gold: 0, food: 0 })
        .unwrap();
    world
        .spawn_unit(UnitKind::Villager, TilePos::new(9, 9), player)
        .unwrap();
    for dy in -3..=3 {
        for dx in -3..=3 {
            if (dx, dy) == (0, 0) {
                continue;
            }
            world
                .grid_mut()
                .place_resource(TilePos::new(10 + dx, 10 + dy), ResourceKind::Wood);
        }
    }
    let depot = world.player(player).town_center;

    let mut engine = engine();
    engine.run(&mut world, 30).unwrap();

    assert_eq!(world.buildings_of(player).count(), 1);
    assert_eq!(
        world.building(depot).stock.wood,
        60,
        "resources were lost on a failed placement"
    );
}
