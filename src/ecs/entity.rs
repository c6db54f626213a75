//! Entities and the entity store

use std::collections::HashMap;

use super::value::Value;

/// Entity ID: monotonically increasing, never reused.
pub type EntityId = u64;

/// One materialized component: ordered field/value pairs.
///
/// Field order follows the template it was instantiated from, so iteration is
/// deterministic across entities of the same kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentInstance {
    fields: Vec<(String, Value)>,
}

impl ComponentInstance {
    pub fn from_fields(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == field)
            .map(|(_, v)| v)
    }

    /// Set a field, inserting it if absent.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.get_mut(field) {
            Some(slot) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    /// Numeric read of a field (`Float` or widened `Int`).
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn set_number(&mut self, field: &str, value: f64) {
        self.set(field, Value::Float(value));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A unique identity plus its instantiated components, in attach order.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    components: Vec<(String, ComponentInstance)>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn has(&self, component: &str) -> bool {
        self.components.iter().any(|(n, _)| n == component)
    }

    pub fn has_all<S: AsRef<str>>(&self, components: &[S]) -> bool {
        components.iter().all(|c| self.has(c.as_ref()))
    }

    pub fn component(&self, name: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut ComponentInstance> {
        self.components
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(n, _)| n.as_str())
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &ComponentInstance)> {
        self.components.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Attach an instance, replacing any existing component of the same name.
    pub(crate) fn attach(&mut self, name: &str, instance: ComponentInstance) {
        match self.components.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = instance,
            None => self.components.push((name.to_string(), instance)),
        }
    }
}

/// Holds every live entity in creation order.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    next_id: EntityId,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entity and return it for component attachment.
    pub fn spawn(&mut self) -> &mut Entity {
        let id = self.next_id;
        self.next_id += 1;
        let slot = self.entities.len();
        self.index.insert(id, slot);
        self.entities.push(Entity::new(id));
        &mut self.entities[slot]
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&i| &mut self.entities[i])
    }

    /// Entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_order_and_ids() {
        let mut store = EntityStore::new();
        let a = store.spawn().id();
        let b = store.spawn().id();
        let c = store.spawn().id();

        assert_eq!((a, b, c), (0, 1, 2));
        let order: Vec<_> = store.iter().map(Entity::id).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_attach_replaces_same_name() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        entity.attach(
            "p",
            ComponentInstance::from_fields([("x".to_string(), Value::Float(1.0))]),
        );
        entity.attach(
            "v",
            ComponentInstance::from_fields([("dx".to_string(), Value::Float(0.0))]),
        );
        entity.attach(
            "p",
            ComponentInstance::from_fields([("x".to_string(), Value::Float(2.0))]),
        );

        let names: Vec<_> = entity.component_names().collect();
        assert_eq!(names, vec!["p", "v"]);
        assert_eq!(entity.component("p").unwrap().number("x"), Some(2.0));
    }

    #[test]
    fn test_instance_set_inserts_and_overwrites() {
        let mut instance = ComponentInstance::default();
        instance.set("x", 1.0);
        instance.set_number("x", 3.5);
        instance.set("tag", "blue");

        assert_eq!(instance.number("x"), Some(3.5));
        assert_eq!(instance.get("tag"), Some(&Value::from("blue")));
        assert_eq!(instance.get("missing"), None);
    }
}
