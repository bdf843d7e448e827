//! Game entities and the mutable world state the systems operate on.
//!
//! Buildings and units live in flat registries on `World`; everything
//! else refers to them through plain id handles, so cross-references
//! survive serialization unchanged.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::map::{ResourceKind, TileGrid, TilePos};

/// A villager carries at most this much at a time.
pub const MAX_CARRY: u32 = 20;

/// Population allowance every player starts with before houses.
pub const BASE_POPULATION_CAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    TownCenter,
    House,
    Farm,
    Barracks,
}

/// Construction price in wood and gold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub wood: u32,
    pub gold: u32,
}

impl BuildingKind {
    pub fn cost(self) -> Cost {
        match self {
            BuildingKind::TownCenter => Cost { wood: 200, gold: 50 },
            BuildingKind::House => Cost { wood: 50, gold: 0 },
            BuildingKind::Farm => Cost { wood: 60, gold: 0 },
            BuildingKind::Barracks => Cost { wood: 150, gold: 50 },
        }
    }

    pub fn population_capacity(self) -> u32 {
        match self {
            BuildingKind::House => 5,
            _ => 0,
        }
    }

    pub fn initial_food(self) -> u32 {
        match self {
            BuildingKind::Farm => 300,
            _ => 0,
        }
    }
}

/// Per-kind resource ledger. The town center's stockpile doubles as the
/// owning player's spendable reserve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stockpile {
    pub wood: u32,
    pub gold: u32,
    pub food: u32,
}

impl Stockpile {
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Gold => self.gold,
            ResourceKind::Food => self.food,
        }
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Wood => self.wood += amount,
            ResourceKind::Gold => self.gold += amount,
            ResourceKind::Food => self.food += amount,
        }
    }

    pub fn can_afford(&self, cost: Cost) -> bool {
        self.wood >= cost.wood && self.gold >= cost.gold
    }

    /// Callers confirm affordability first; paying more than the ledger
    /// holds is an invariant violation.
    pub fn deduct(&mut self, cost: Cost) {
        assert!(self.can_afford(cost), "stockpile overdraft: {cost:?}");
        self.wood -= cost.wood;
        self.gold -= cost.gold;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub pos: TilePos,
    pub owner: PlayerId,
    /// Accumulated deposits. Only meaningful for the town center.
    pub stock: Stockpile,
    pub population_capacity: u32,
    /// Single-owner work claim. Only meaningful for farms.
    pub occupied: bool,
    /// Remaining harvestable food. Only meaningful for farms.
    pub food_left: u32,
}

impl Building {
    fn new(id: BuildingId, kind: BuildingKind, pos: TilePos, owner: PlayerId) -> Self {
        Self {
            id,
            kind,
            pos,
            owner,
            stock: Stockpile::default(),
            population_capacity: kind.population_capacity(),
            occupied: false,
            food_left: kind.initial_food(),
        }
    }

    /// Drains up to `amount` food from a farm and returns what was taken.
    pub fn take_food(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.food_left);
        self.food_left -= taken;
        taken
    }

    pub fn farm_exhausted(&self) -> bool {
        self.food_left == 0
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn occupy(&mut self) {
        self.occupied = true;
    }

    pub fn release(&mut self) {
        self.occupied = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Villager,
}

/// Current task of a unit. Paths are consumed one step per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitTask {
    Idle,
    MoveToResource {
        kind: ResourceKind,
        path: VecDeque<TilePos>,
    },
    Gather {
        kind: ResourceKind,
        ends_at: f64,
    },
    ReturnToDepot {
        path: VecDeque<TilePos>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub pos: TilePos,
    pub owner: PlayerId,
    pub carried: u32,
    pub carried_kind: Option<ResourceKind>,
    pub task: UnitTask,
    /// Claim on the farm currently being worked, if any. The farm itself
    /// is owned by the building registry.
    pub working_farm: Option<BuildingId>,
}

impl Unit {
    fn new(id: UnitId, kind: UnitKind, pos: TilePos, owner: PlayerId) -> Self {
        Self {
            id,
            kind,
            pos,
            owner,
            carried: 0,
            carried_kind: None,
            task: UnitTask::Idle,
            working_farm: None,
        }
    }

    pub fn remaining_capacity(&self) -> u32 {
        MAX_CARRY - self.carried
    }

    /// Adds harvested resource to the load. A zero amount leaves the
    /// carried kind untouched so `carried == 0` implies no kind.
    pub fn load(&mut self, kind: ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        self.carried += amount;
        assert!(self.carried <= MAX_CARRY, "unit over capacity");
        self.carried_kind = Some(kind);
    }

    /// Empties the load, returning what was carried. Unloading an empty
    /// unit returns `None` and changes nothing.
    pub fn unload(&mut self) -> Option<(ResourceKind, u32)> {
        let kind = self.carried_kind.take()?;
        let amount = self.carried;
        self.carried = 0;
        Some((kind, amount))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    /// The depot accepting this player's deposits.
    pub town_center: BuildingId,
    /// Sim-time of the last successful construction, for build pacing.
    pub last_build_time: f64,
}

/// Whole simulation state: grid, entity registries, players, clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    grid: TileGrid,
    buildings: Vec<Building>,
    units: Vec<Unit>,
    players: Vec<PlayerState>,
    tick: u64,
    tick_seconds: f64,
}

impl World {
    pub fn new(grid: TileGrid, tick_seconds: f64) -> Self {
        assert!(tick_seconds > 0.0, "tick duration must be positive");
        Self {
            grid,
            buildings: Vec::new(),
            units: Vec::new(),
            players: Vec::new(),
            tick: 0,
            tick_seconds,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_seconds
    }

    /// Simulated time in seconds. The clock is the tick counter, so
    /// tests drive time without sleeping.
    pub fn now(&self) -> f64 {
        self.tick as f64 * self.tick_seconds
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    /// Registers a player with a town center at `town_center` holding
    /// `stock`. Returns `None` when the position is off the map.
    pub fn add_player(&mut self, town_center: TilePos, stock: Stockpile) -> Option<PlayerId> {
        let id = PlayerId(self.players.len() as u8);
        let depot = self.spawn_building(BuildingKind::TownCenter, town_center, id)?;
        self.building_mut(depot).stock = stock;
        self.players.push(PlayerState {
            id,
            town_center: depot,
            last_build_time: 0.0,
        });
        Some(id)
    }

    /// Creates a building and writes it into the grid. Returns `None`
    /// when the position is off the map.
    pub fn spawn_building(
        &mut self,
        kind: BuildingKind,
        pos: TilePos,
        owner: PlayerId,
    ) -> Option<BuildingId> {
        if !self.grid.in_bounds(pos) {
            return None;
        }
        let id = BuildingId(self.buildings.len() as u32);
        self.buildings.push(Building::new(id, kind, pos, owner));
        self.grid.place_building(id, kind, pos);
        Some(id)
    }

    pub fn spawn_unit(&mut self, kind: UnitKind, pos: TilePos, owner: PlayerId) -> Option<UnitId> {
        if !self.grid.in_bounds(pos) {
            return None;
        }
        let id = UnitId(self.units.len() as u32);
        self.units.push(Unit::new(id, kind, pos, owner));
        Some(id)
    }

    pub fn building(&self, id: BuildingId) -> &Building {
        &self.buildings[id.0 as usize]
    }

    pub fn building_mut(&mut self, id: BuildingId) -> &mut Building {
        &mut self.buildings[id.0 as usize]
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0 as usize]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.0 as usize]
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.0 as usize]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.0 as usize]
    }

    /// Unit ids in registry order. Units updated earlier in a tick win
    /// contested claims.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        (0..self.units.len() as u32).map(UnitId).collect()
    }

    pub fn buildings_of(&self, owner: PlayerId) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(move |b| b.owner == owner)
    }

    pub fn units_of(&self, owner: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.owner == owner)
    }

    pub fn population_of(&self, owner: PlayerId) -> u32 {
        self.units_of(owner).count() as u32
    }

    /// Base allowance plus the capacity of every owned building.
    pub fn population_cap_of(&self, owner: PlayerId) -> u32 {
        BASE_POPULATION_CAP
            + self
                .buildings_of(owner)
                .map(|b| b.population_capacity)
                .sum::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        World::new(TileGrid::new(10, 10, 42), 1.0)
    }

    #[test]
    fn stockpile_affordability_and_payment() {
        let mut stock = Stockpile { wood: 60, gold: 10, food: 0 };
        let farm = BuildingKind::Farm.cost();
        assert!(stock.can_afford(farm));
        stock.deduct(farm);
        assert_eq!(stock.wood, 0);
        assert_eq!(stock.gold, 10);
        assert!(!stock.can_afford(BuildingKind::House.cost()));
    }

    #[test]
    fn building_kind_tables() {
        assert_eq!(BuildingKind::TownCenter.cost(), Cost { wood: 200, gold: 50 });
        assert_eq!(BuildingKind::House.population_capacity(), 5);
        assert_eq!(BuildingKind::Farm.initial_food(), 300);
        assert_eq!(BuildingKind::Barracks.population_capacity(), 0);
    }

    #[test]
    fn farm_drains_to_exhaustion() {
        let mut world = small_world();
        let owner = world
            .add_player(TilePos::new(0, 0), Stockpile::default())
            .unwrap();
        let farm = world
            .spawn_building(BuildingKind::Farm, TilePos::new(2, 2), owner)
            .unwrap();

        let mut total = 0;
        while !world.building(farm).farm_exhausted() {
            total += world.building_mut(farm).take_food(20);
        }
        assert_eq!(total, 300);
        assert_eq!(world.building_mut(farm).take_food(20), 0);
    }

    #[test]
    fn unit_load_and_unload_keep_the_carry_invariant() {
        let mut world = small_world();
        let owner = world
            .add_player(TilePos::new(0, 0), Stockpile::default())
            .unwrap();
        let id = world
            .spawn_unit(UnitKind::Villager, TilePos::new(1, 1), owner)
            .unwrap();

        let unit = world.unit_mut(id);
        unit.load(ResourceKind::Wood, 0);
        assert_eq!(unit.carried_kind, None);
        unit.load(ResourceKind::Wood, 20);
        assert_eq!(unit.carried, MAX_CARRY);
        assert_eq!(unit.remaining_capacity(), 0);

        assert_eq!(unit.unload(), Some((ResourceKind::Wood, 20)));
        assert_eq!(unit.carried, 0);
        assert_eq!(unit.carried_kind, None);
        assert_eq!(unit.unload(), None);
    }

    #[test]
    fn out_of_bounds_spawns_are_rejected() {
        let mut world = small_world();
        assert!(world
            .add_player(TilePos::new(50, 50), Stockpile::default())
            .is_none());
        let owner = world
            .add_player(TilePos::new(0, 0), Stockpile::default())
            .unwrap();
        assert!(world
            .spawn_unit(UnitKind::Villager, TilePos::new(-1, 3), owner)
            .is_none());
    }

    #[test]
    fn population_cap_counts_houses() {
        let mut world = small_world();
        let owner = world
            .add_player(TilePos::new(0, 0), Stockpile::default())
            .unwrap();
        assert_eq!(world.population_cap_of(owner), BASE_POPULATION_CAP);
        world
            .spawn_building(BuildingKind::House, TilePos::new(3, 0), owner)
            .unwrap();
        world
            .spawn_building(BuildingKind::House, TilePos::new(4, 0), owner)
            .unwrap();
        assert_eq!(world.population_cap_of(owner), BASE_POPULATION_CAP + 10);
    }

    #[test]
    fn per_player_views_stay_disjoint() {
        let mut world = small_world();
        let p1 = world
            .add_player(TilePos::new(0, 0), Stockpile::default())
            .unwrap();
        let p2 = world
            .add_player(TilePos::new(9, 9), Stockpile::default())
            .unwrap();
        world.spawn_unit(UnitKind::Villager, TilePos::new(1, 1), p1);
        world.spawn_unit(UnitKind::Villager, TilePos::new(8, 8), p2);
        world.spawn_unit(UnitKind::Villager, TilePos::new(8, 7), p2);

        assert_eq!(world.population_of(p1), 1);
        assert_eq!(world.population_of(p2), 2);
        assert_eq!(world.buildings_of(p1).count(), 1);
        assert_eq!(
            world.player(p2).town_center,
            world.buildings_of(p2).next().unwrap().id
        );
    }
}
