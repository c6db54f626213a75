//! System descriptors and their registry

use tracing::{debug, warn};

use super::entity::Entity;

/// Batch callback: receives every matching entity for this dispatch, in
/// creation order, and may mutate their component instances in place. It must
/// not attempt structural changes; it never sees the engine, so it cannot.
pub type SystemCallback = Box<dyn FnMut(&mut [&mut Entity])>;

/// A named (required-components, callback) pair.
pub struct SystemDescriptor {
    name: String,
    required: Vec<String>,
    callback: SystemCallback,
}

impl SystemDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required component names, deduplicated, in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub(crate) fn run(&mut self, batch: &mut [&mut Entity]) {
        (self.callback)(batch);
    }
}

impl std::fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}

/// Registry of systems. Registration order is execution order, every tick.
#[derive(Debug, Default)]
pub struct SystemRegistry {
    systems: Vec<SystemDescriptor>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system. A duplicate name is rejected and the original
    /// registration is retained.
    pub fn register(
        &mut self,
        name: &str,
        required: &[&str],
        callback: impl FnMut(&mut [&mut Entity]) + 'static,
    ) -> bool {
        if self.has(name) {
            warn!(system = name, "createSystem: a system already exists");
            return false;
        }

        let mut deduped: Vec<String> = Vec::with_capacity(required.len());
        for component in required {
            if !deduped.iter().any(|c| c == component) {
                deduped.push((*component).to_string());
            }
        }

        debug!(system = name, required = ?deduped, "created system");
        self.systems.push(SystemDescriptor {
            name: name.to_string(),
            required: deduped,
            callback: Box::new(callback),
        });
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.systems.iter().any(|s| s.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SystemDescriptor> {
        self.systems.iter_mut().find(|s| s.name == name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SystemDescriptor> {
        self.systems.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = SystemRegistry::new();
        assert!(registry.register("move", &["position"], |_| {}));
        assert!(!registry.register("move", &["velocity"], |_| {}));

        assert_eq!(registry.names(), vec!["move"]);
        assert_eq!(registry.get_mut("move").unwrap().required(), &["position"]);
    }

    #[test]
    fn test_required_components_deduplicated() {
        let mut registry = SystemRegistry::new();
        registry.register("s", &["a", "b", "a", "c", "b"], |_| {});
        assert_eq!(registry.get_mut("s").unwrap().required(), &["a", "b", "c"]);
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = SystemRegistry::new();
        registry.register("velocities", &["particle"], |_| {});
        registry.register("positions", &["particle"], |_| {});
        assert_eq!(registry.names(), vec!["velocities", "positions"]);
    }
}
