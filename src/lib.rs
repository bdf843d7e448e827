pub mod engine;
pub mod map;
pub mod pathfinding;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings, System, SystemContext, TickSummary};
pub use scenario::{Scenario, ScenarioLoader};
