//! Villager task controller: target selection, movement, harvesting,
//! and depositing at the town center.

use std::collections::VecDeque;

use anyhow::Result;

use crate::engine::{System, SystemContext};
use crate::map::{ResourceKind, TilePos};
use crate::pathfinding::{find_path, resource_goal};
use crate::rng::SystemRng;
use crate::world::{BuildingId, BuildingKind, PlayerId, UnitId, UnitTask, World};

/// Amount collected by a single harvest event, before the capacity cap.
pub const GATHER_AMOUNT: u32 = 20;

/// Seconds one harvest action takes, by resource kind.
pub fn gather_duration(kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Wood => 5.0,
        ResourceKind::Gold => 8.0,
        ResourceKind::Food => 10.0,
    }
}

pub struct VillagerSystem;

impl VillagerSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VillagerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for VillagerSystem {
    fn name(&self) -> &'static str {
        "villager"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        // Units update strictly one after another, so a farm claimed by
        // an earlier unit is already marked occupied when a later unit
        // picks its target.
        for unit_id in world.unit_ids() {
            step_unit(world, unit_id, ctx.now_seconds);
        }
        Ok(())
    }
}

fn step_unit(world: &mut World, unit_id: UnitId, now: f64) {
    let task = std::mem::replace(&mut world.unit_mut(unit_id).task, UnitTask::Idle);
    let next = match task {
        UnitTask::Idle => assign_task(world, unit_id, now),
        UnitTask::MoveToResource { kind, path } => {
            advance_to_resource(world, unit_id, kind, path, now)
        }
        UnitTask::Gather { kind, ends_at } => gather(world, unit_id, kind, ends_at, now),
        UnitTask::ReturnToDepot { path } => advance_to_depot(world, unit_id, path),
    };
    world.unit_mut(unit_id).task = next;
}

/// Picks the next target for an idle unit. An available farm wins over
/// everything else; otherwise the closer of wood and gold is chosen,
/// wood winning ties. The farm claim is taken immediately so no later
/// unit can be assigned to the same farm this tick.
fn assign_task(world: &mut World, unit_id: UnitId, now: f64) -> UnitTask {
    let (owner, pos) = {
        let unit = world.unit(unit_id);
        (unit.owner, unit.pos)
    };

    if let Some((farm_id, path)) = nearest_available_farm(world, owner, pos) {
        world.building_mut(farm_id).occupy();
        world.unit_mut(unit_id).working_farm = Some(farm_id);
        return start_moving(world, unit_id, ResourceKind::Food, path, now);
    }

    let wood = find_path(world.grid(), pos, resource_goal(ResourceKind::Wood));
    let gold = find_path(world.grid(), pos, resource_goal(ResourceKind::Gold));
    let choice = match (wood, gold) {
        (Some(w), Some(g)) => {
            if w.len() <= g.len() {
                Some((ResourceKind::Wood, w))
            } else {
                Some((ResourceKind::Gold, g))
            }
        }
        (Some(w), None) => Some((ResourceKind::Wood, w)),
        (None, Some(g)) => Some((ResourceKind::Gold, g)),
        (None, None) => None,
    };

    match choice {
        Some((kind, path)) => start_moving(world, unit_id, kind, path, now),
        None => UnitTask::Idle,
    }
}

/// An empty path means the unit already stands on its target.
fn start_moving(
    world: &mut World,
    unit_id: UnitId,
    kind: ResourceKind,
    path: Vec<TilePos>,
    now: f64,
) -> UnitTask {
    if path.is_empty() {
        return arrive_at_resource(world, unit_id, kind, now);
    }
    UnitTask::MoveToResource {
        kind,
        path: VecDeque::from(path),
    }
}

fn advance_to_resource(
    world: &mut World,
    unit_id: UnitId,
    kind: ResourceKind,
    mut path: VecDeque<TilePos>,
    now: f64,
) -> UnitTask {
    if let Some(step) = path.pop_front() {
        world.unit_mut(unit_id).pos = step;
    }
    if !path.is_empty() {
        return UnitTask::MoveToResource { kind, path };
    }
    arrive_at_resource(world, unit_id, kind, now)
}

/// The target may have vanished while the unit walked (another unit can
/// empty a wood or gold tile first; a claimed farm cannot be stolen).
fn arrive_at_resource(world: &mut World, unit_id: UnitId, kind: ResourceKind, now: f64) -> UnitTask {
    let target_present = match kind {
        ResourceKind::Food => world
            .unit(unit_id)
            .working_farm
            .map(|farm_id| !world.building(farm_id).farm_exhausted())
            .unwrap_or(false),
        _ => {
            let pos = world.unit(unit_id).pos;
            world.grid().tile(pos).resource == Some(kind)
        }
    };

    if !target_present {
        release_farm(world, unit_id);
        return UnitTask::Idle;
    }

    UnitTask::Gather {
        kind,
        ends_at: now + gather_duration(kind),
    }
}

fn gather(world: &mut World, unit_id: UnitId, kind: ResourceKind, ends_at: f64, now: f64) -> UnitTask {
    if now < ends_at {
        return UnitTask::Gather { kind, ends_at };
    }

    let amount = GATHER_AMOUNT.min(world.unit(unit_id).remaining_capacity());
    match kind {
        ResourceKind::Wood | ResourceKind::Gold => {
            let pos = world.unit(unit_id).pos;
            if world.grid().tile(pos).resource == Some(kind) {
                world.grid_mut().clear_resource(pos);
                world.unit_mut(unit_id).load(kind, amount);
            }
            // A single harvest exhausts the tile either way.
            return_to_depot(world, unit_id)
        }
        ResourceKind::Food => {
            let Some(farm_id) = world.unit(unit_id).working_farm else {
                return return_to_depot(world, unit_id);
            };
            let taken = world.building_mut(farm_id).take_food(amount);
            world.unit_mut(unit_id).load(ResourceKind::Food, taken);

            let farm_empty = world.building(farm_id).farm_exhausted();
            let unit_full = world.unit(unit_id).remaining_capacity() == 0;
            if unit_full || farm_empty {
                release_farm(world, unit_id);
                return_to_depot(world, unit_id)
            } else {
                UnitTask::Gather {
                    kind,
                    ends_at: now + gather_duration(kind),
                }
            }
        }
    }
}

fn return_to_depot(world: &mut World, unit_id: UnitId) -> UnitTask {
    let (owner, pos, carried) = {
        let unit = world.unit(unit_id);
        (unit.owner, unit.pos, unit.carried)
    };
    if carried == 0 {
        return UnitTask::Idle;
    }

    let depot_id = world.player(owner).town_center;
    match find_path(world.grid(), pos, |_, tile| tile.building == Some(depot_id)) {
        Some(path) if path.is_empty() => deposit(world, unit_id, depot_id),
        Some(path) => UnitTask::ReturnToDepot {
            path: VecDeque::from(path),
        },
        // The depot tile is unreachable only on a malformed map; the
        // unit holds its load and waits.
        None => UnitTask::Idle,
    }
}

fn advance_to_depot(world: &mut World, unit_id: UnitId, mut path: VecDeque<TilePos>) -> UnitTask {
    if let Some(step) = path.pop_front() {
        world.unit_mut(unit_id).pos = step;
    }
    if !path.is_empty() {
        return UnitTask::ReturnToDepot { path };
    }
    let depot_id = world.player(world.unit(unit_id).owner).town_center;
    deposit(world, unit_id, depot_id)
}

/// Empties the unit's load into the depot ledger. Depositing with
/// nothing carried changes nothing.
fn deposit(world: &mut World, unit_id: UnitId, depot_id: BuildingId) -> UnitTask {
    if let Some((kind, amount)) = world.unit_mut(unit_id).unload() {
        world.building_mut(depot_id).stock.add(kind, amount);
    }
    UnitTask::Idle
}

/// Releases any held farm claim. Every path that leaves farm work goes
/// through here so the occupancy token can never leak.
fn release_farm(world: &mut World, unit_id: UnitId) {
    if let Some(farm_id) = world.unit_mut(unit_id).working_farm.take() {
        world.building_mut(farm_id).release();
    }
}

/// Searches for the nearest farm of `owner` that is neither occupied
/// nor exhausted, returning its id and the path to its tile.
fn nearest_available_farm(
    world: &World,
    owner: PlayerId,
    from: TilePos,
) -> Option<(BuildingId, Vec<TilePos>)> {
    let any_available = world.buildings_of(owner).any(|building| {
        building.kind == BuildingKind::Farm
            && !building.is_occupied()
            && !building.farm_exhausted()
    });
    if !any_available {
        return None;
    }

    let path = find_path(world.grid(), from, |_, tile| {
        tile.building.map_or(false, |id| {
            let building = world.building(id);
            building.kind == BuildingKind::Farm
                && building.owner == owner
                && !building.is_occupied()
                && !building.farm_exhausted()
        })
    })?;
    let goal = path.last().copied().unwrap_or(from);
    let farm_id = world.grid().tile(goal).building?;
    Some((farm_id, path))
}
