//! Engine: entity creation, query/dispatch, and the tick controller

use std::collections::HashMap;

use tracing::{debug, warn};

use super::entity::{ComponentInstance, Entity, EntityId, EntityStore};
use super::system::{SystemDescriptor, SystemRegistry};
use super::template::{ComponentTemplate, TemplateRegistry};
use super::value::Value;

/// Hook run once per tick, before or after the system pass.
pub type TickCallback = Box<dyn FnMut()>;

/// What `create_entity` does when a requested component has no template.
///
/// `Skip` creates the entity with whatever components resolved (the partial
/// success policy); `Reject` refuses the whole entity. Both report through
/// the diagnostic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingComponentPolicy {
    #[default]
    Skip,
    Reject,
}

/// How `duplicate_entity` produces clones.
///
/// `Shallow` creates new entities of the same kind (same component name list,
/// factories re-evaluated); `Deep` snapshots the source's current field values
/// into independent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateMode {
    Shallow,
    Deep,
}

/// Exact-equality field filter for `entities_with_components`.
///
/// Every clause must hold for an entity to pass; an empty filter passes all.
#[derive(Debug, Default, Clone)]
pub struct FieldFilter {
    clauses: Vec<(String, String, Value)>,
}

impl FieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `component.field == value`.
    pub fn eq(mut self, component: &str, field: &str, value: impl Into<Value>) -> Self {
        self.clauses
            .push((component.to_string(), field.to_string(), value.into()));
        self
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        self.clauses.iter().all(|(component, field, expected)| {
            entity
                .component(component)
                .and_then(|c| c.get(field))
                .map(|actual| actual == expected)
                .unwrap_or(false)
        })
    }
}

/// The ECS engine: template registry, entity store, system registry, and the
/// tick controller, owned as one explicit value.
///
/// Strictly single-threaded and synchronous; a call to [`Engine::tick`] runs
/// to completion before returning. External misuse (duplicate names, unknown
/// lookups) never errors, it is absorbed and reported as a diagnostic.
#[derive(Default)]
pub struct Engine {
    templates: TemplateRegistry,
    store: EntityStore,
    systems: SystemRegistry,
    default_components: Vec<String>,
    before_hooks: Vec<TickCallback>,
    after_hooks: Vec<TickCallback>,
    globals: HashMap<String, Value>,
    policy: MissingComponentPolicy,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("components", &self.templates.names())
            .field("systems", &self.systems.names())
            .field("entities", &self.store.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MissingComponentPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // --- component templates -------------------------------------------------

    /// Register a named component template. Duplicate names are rejected and
    /// the first registration wins.
    pub fn register_component(&mut self, name: &str, template: ComponentTemplate) -> &mut Self {
        self.templates.register(name, template);
        self
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.templates.has(name)
    }

    /// Registered component names, in registration order.
    pub fn component_names(&self) -> Vec<&str> {
        self.templates.names()
    }

    /// Union the given components into every subsequent `create_entity` call.
    pub fn add_default_components(&mut self, components: &[&str]) -> &mut Self {
        for component in components {
            if self.default_components.iter().any(|c| c == component) {
                warn!(component, "includeAsDefaultComponents: already exists");
            } else {
                debug!(component, "included as default component");
                self.default_components.push((*component).to_string());
            }
        }
        self
    }

    // --- entities ------------------------------------------------------------

    /// Create an entity holding the default components plus `components`
    /// (deduplicated, order preserved), each freshly materialized from its
    /// template. Missing templates follow the configured
    /// [`MissingComponentPolicy`].
    pub fn create_entity(&mut self, components: &[&str]) -> Option<EntityId> {
        let mut requested: Vec<String> = Vec::new();
        for name in self
            .default_components
            .iter()
            .map(String::as_str)
            .chain(components.iter().copied())
        {
            if !requested.iter().any(|c| c == name) {
                requested.push(name.to_string());
            }
        }

        let mut resolved: Vec<(String, ComponentInstance)> = Vec::new();
        for name in &requested {
            // instantiate reports the missing template itself
            if let Some(instance) = self.templates.instantiate(name) {
                resolved.push((name.clone(), instance));
            }
        }

        if resolved.len() < requested.len() && self.policy == MissingComponentPolicy::Reject {
            warn!("createEntity: rejected entity with missing components");
            return None;
        }

        let entity = self.store.spawn();
        for (name, instance) in resolved {
            entity.attach(&name, instance);
        }
        let id = entity.id();
        debug!(entity = id, "created entity");
        Some(id)
    }

    /// `create_entity`, `count` times; factories re-evaluate independently
    /// for every entity.
    pub fn create_entities(&mut self, count: usize, components: &[&str]) -> &mut Self {
        for _ in 0..count {
            self.create_entity(components);
        }
        self
    }

    /// Instantiate `component`'s template, shallow-merge `overrides` on top
    /// (overrides win), and attach it to the entity, replacing any existing
    /// component of that name.
    pub fn add_component(
        &mut self,
        id: EntityId,
        component: &str,
        overrides: &[(&str, Value)],
    ) -> &mut Self {
        if self.store.get(id).is_none() {
            warn!(entity = id, "addComponent: entity not found");
            return self;
        }
        let Some(mut instance) = self.templates.instantiate(component) else {
            return self;
        };
        for (field, value) in overrides {
            instance.set(field, value.clone());
        }
        if let Some(entity) = self.store.get_mut(id) {
            entity.attach(component, instance);
            debug!(entity = id, component, "added component");
        }
        self
    }

    /// Clone an entity `count` times; see [`DuplicateMode`] for the two
    /// semantics.
    pub fn duplicate_entity(&mut self, id: EntityId, count: usize, mode: DuplicateMode) -> &mut Self {
        let Some(source) = self.store.get(id) else {
            warn!(entity = id, "duplicateEntity: entity not found");
            return self;
        };

        match mode {
            DuplicateMode::Shallow => {
                let names: Vec<String> =
                    source.component_names().map(str::to_string).collect();
                for _ in 0..count {
                    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                    self.create_entity(&refs);
                }
            }
            DuplicateMode::Deep => {
                let snapshot: Vec<(String, ComponentInstance)> = source
                    .components()
                    .map(|(name, instance)| (name.to_string(), instance.clone()))
                    .collect();
                for _ in 0..count {
                    let clone = self.store.spawn();
                    for (name, instance) in &snapshot {
                        clone.attach(name, instance.clone());
                    }
                }
            }
        }
        debug!(entity = id, count, ?mode, "duplicated entity");
        self
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.store.get_mut(id)
    }

    /// All entities, in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.store.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.store.len()
    }

    /// Entities holding every component in `required`, restricted to those
    /// matching `filter`, in creation order.
    pub fn entities_with_components(
        &self,
        required: &[&str],
        filter: &FieldFilter,
    ) -> Vec<&Entity> {
        self.store
            .iter()
            .filter(|entity| entity.has_all(required) && filter.matches(entity))
            .collect()
    }

    /// Run `callback` on every entity, immediately, in creation order.
    pub fn for_each_entity(&mut self, mut callback: impl FnMut(&mut Entity)) -> &mut Self {
        for entity in self.store.iter_mut() {
            callback(entity);
        }
        self
    }

    // --- globals -------------------------------------------------------------

    pub fn set_global(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.globals.insert(key.to_string(), value.into());
        self
    }

    pub fn global(&self, key: &str) -> Option<&Value> {
        self.globals.get(key)
    }

    pub fn global_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.globals.get_mut(key)
    }

    // --- systems -------------------------------------------------------------

    /// Register a named system. Registration order is execution order for
    /// every tick. Duplicate names are rejected and the first registration
    /// wins.
    pub fn register_system(
        &mut self,
        name: &str,
        required: &[&str],
        callback: impl FnMut(&mut [&mut Entity]) + 'static,
    ) -> &mut Self {
        self.systems.register(name, required, callback);
        self
    }

    pub fn has_system(&self, name: &str) -> bool {
        self.systems.has(name)
    }

    /// Registered system names, in registration (= execution) order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.names()
    }

    /// Recompute the system's matching subset from the live store and invoke
    /// its callback once with the batch.
    pub fn run_system(&mut self, name: &str) -> &mut Self {
        match self.systems.get_mut(name) {
            Some(system) => dispatch(system, &mut self.store),
            None => warn!(system = name, "runSystem: system not found"),
        }
        self
    }

    /// Run every registered system, in registration order, each to
    /// completion.
    pub fn run_all_systems(&mut self) -> &mut Self {
        for system in self.systems.iter_mut() {
            dispatch(system, &mut self.store);
        }
        self
    }

    // --- tick controller -----------------------------------------------------

    /// Register a hook run before the system pass of every tick, in
    /// registration order.
    pub fn before_tick(&mut self, callback: impl FnMut() + 'static) -> &mut Self {
        self.before_hooks.push(Box::new(callback));
        self
    }

    /// Register a hook run after the system pass of every tick, in
    /// registration order.
    pub fn after_tick(&mut self, callback: impl FnMut() + 'static) -> &mut Self {
        self.after_hooks.push(Box::new(callback));
        self
    }

    /// One synchronous simulation step: before-hooks, all systems, after-
    /// hooks. The external clock decides when this is called; the engine has
    /// no notion of time.
    pub fn tick(&mut self) {
        for hook in &mut self.before_hooks {
            hook();
        }
        self.run_all_systems();
        for hook in &mut self.after_hooks {
            hook();
        }
    }
}

/// Query + dispatch for one system: live re-scan of the store, batch handed
/// to the callback in creation order.
fn dispatch(system: &mut SystemDescriptor, store: &mut EntityStore) {
    let mut batch: Vec<&mut Entity> = store
        .iter_mut()
        .filter(|entity| entity.has_all(system.required()))
        .collect();
    system.run(&mut batch);
}
