//! Per-player construction policy funded by the depot stockpile.

use anyhow::Result;

use crate::engine::{System, SystemContext};
use crate::map::TilePos;
use crate::rng::SystemRng;
use crate::world::{BuildingId, BuildingKind, PlayerId, World};

/// Minimum delay between two construction starts for one player.
pub const BUILD_COOLDOWN_SECONDS: f64 = 10.0;

/// A player stops laying farms past this many.
pub const MAX_FARMS: usize = 4;

/// Build sites are searched in rings around the town center out to
/// this radius.
pub const BUILD_RADIUS: i32 = 3;

pub struct ConstructionSystem;

impl ConstructionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstructionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConstructionSystem {
    fn name(&self) -> &'static str {
        "construction"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let players: Vec<PlayerId> = world.players().iter().map(|p| p.id).collect();
        for player in players {
            plan_build(world, player, ctx.now_seconds);
        }
        Ok(())
    }
}

fn plan_build(world: &mut World, player: PlayerId, now: f64) {
    if now - world.player(player).last_build_time < BUILD_COOLDOWN_SECONDS {
        return;
    }
    let Some(kind) = choose_building(world, player) else {
        return;
    };
    if try_build(world, player, kind) {
        world.player_mut(player).last_build_time = now;
    }
}

/// Fixed priority order: a house when population is at the cap, then a
/// farm while under the farm limit, then a single barracks. A branch is
/// only taken when the depot can pay for it.
fn choose_building(world: &World, player: PlayerId) -> Option<BuildingKind> {
    let stock = world.building(world.player(player).town_center).stock;

    if world.population_of(player) >= world.population_cap_of(player)
        && stock.can_afford(BuildingKind::House.cost())
    {
        return Some(BuildingKind::House);
    }

    let farms = world
        .buildings_of(player)
        .filter(|b| b.kind == BuildingKind::Farm)
        .count();
    if farms < MAX_FARMS && stock.can_afford(BuildingKind::Farm.cost()) {
        return Some(BuildingKind::Farm);
    }

    let has_barracks = world
        .buildings_of(player)
        .any(|b| b.kind == BuildingKind::Barracks);
    if !has_barracks && stock.can_afford(BuildingKind::Barracks.cost()) {
        return Some(BuildingKind::Barracks);
    }

    None
}

/// The cost is deducted only after a site is confirmed, so a failed
/// site search never loses resources.
fn try_build(world: &mut World, player: PlayerId, kind: BuildingKind) -> bool {
    let depot_id = world.player(player).town_center;
    let cost = kind.cost();
    if !world.building(depot_id).stock.can_afford(cost) {
        return false;
    }
    let Some(site) = find_build_site(world, depot_id) else {
        return false;
    };
    world.building_mut(depot_id).stock.deduct(cost);
    world.spawn_building(kind, site, player).is_some()
}

/// First empty tile found scanning rings of growing radius around the
/// town center.
fn find_build_site(world: &World, depot_id: BuildingId) -> Option<TilePos> {
    let center = world.building(depot_id).pos;
    for radius in 1..=BUILD_RADIUS {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let pos = TilePos::new(center.x + dx, center.y + dy);
                if world.grid().is_empty(pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}
