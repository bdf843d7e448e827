mod construction;
mod villager;

pub use construction::{ConstructionSystem, BUILD_COOLDOWN_SECONDS, BUILD_RADIUS, MAX_FARMS};
pub use villager::{gather_duration, VillagerSystem, GATHER_AMOUNT};
