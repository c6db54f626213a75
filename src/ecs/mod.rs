//! Entity Component System (ECS) implementation
//!
//! Named component templates materialized into per-entity instances, systems
//! dispatched against live queries, one synchronous `tick` per frame.

pub mod engine;
pub mod entity;
pub mod system;
pub mod template;
pub mod value;

pub use engine::{DuplicateMode, Engine, FieldFilter, MissingComponentPolicy};
pub use entity::{ComponentInstance, Entity, EntityId, EntityStore};
pub use system::{SystemCallback, SystemDescriptor, SystemRegistry};
pub use template::{ComponentTemplate, FieldSpec, TemplateRegistry};
pub use value::Value;
