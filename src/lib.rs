pub mod clock;
pub mod config;
pub mod ecs;
pub mod particles;
pub mod rng;
pub mod snapshot;

pub use clock::Clock;
pub use config::SimulationConfig;
pub use ecs::{
    ComponentTemplate, DuplicateMode, Engine, Entity, EntityId, FieldFilter,
    MissingComponentPolicy, Value,
};
pub use rng::SimRng;
