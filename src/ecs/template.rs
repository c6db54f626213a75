//! Component templates and their registry

use tracing::{debug, warn};

use super::entity::ComponentInstance;
use super::value::Value;

/// Default for a single template field: a literal copied into every instance,
/// or a factory invoked fresh per instance.
pub enum FieldSpec {
    Literal(Value),
    Factory(Box<dyn Fn() -> Value>),
}

impl FieldSpec {
    fn materialize(&self) -> Value {
        match self {
            FieldSpec::Literal(value) => value.clone(),
            FieldSpec::Factory(producer) => producer(),
        }
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSpec::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            FieldSpec::Factory(_) => f.debug_tuple("Factory").finish(),
        }
    }
}

/// Named blueprint from which component instances are materialized.
///
/// Field order is preserved into every instance.
#[derive(Debug, Default)]
pub struct ComponentTemplate {
    fields: Vec<(String, FieldSpec)>,
}

impl ComponentTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal field; its value is copied into every instance.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.push((name.to_string(), FieldSpec::Literal(value.into())));
        self
    }

    /// Add a factory field; the closure runs once per instantiation.
    pub fn factory(mut self, name: &str, producer: impl Fn() -> Value + 'static) -> Self {
        self.fields
            .push((name.to_string(), FieldSpec::Factory(Box::new(producer))));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Materialize a fresh instance: literals cloned, factories invoked.
    pub fn instantiate(&self) -> ComponentInstance {
        ComponentInstance::from_fields(
            self.fields
                .iter()
                .map(|(name, spec)| (name.clone(), spec.materialize())),
        )
    }
}

/// Registry of component templates, immutable once registered.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<(String, ComponentTemplate)>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. A duplicate name is rejected and the original
    /// registration is retained.
    pub fn register(&mut self, name: &str, template: ComponentTemplate) -> bool {
        if self.has(name) {
            warn!(component = name, "createComponent: a component already exists");
            return false;
        }
        debug!(component = name, "created component template");
        self.templates.push((name.to_string(), template));
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.templates.iter().any(|(n, _)| n == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ComponentTemplate> {
        self.templates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Materialize the named template, or `None` (reported) if unknown.
    pub fn instantiate(&self, name: &str) -> Option<ComponentInstance> {
        match self.get(name) {
            Some(template) => Some(template.instantiate()),
            None => {
                warn!(component = name, "missing component template");
                None
            }
        }
    }
}
