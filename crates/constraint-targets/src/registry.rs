//! Name → match-schema provider lookup.

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::debug;

use constraint_contracts::apiextensions::JsonSchemaProps;
use constraint_core::traits::MatchSchemaProvider;

/// A provider that hands out copies of one fixed schema fragment.
#[derive(Debug, Clone)]
pub struct StaticMatchSchema {
    schema: JsonSchemaProps,
}

impl StaticMatchSchema {
    pub fn new(schema: JsonSchemaProps) -> Self {
        Self { schema }
    }
}

impl MatchSchemaProvider for StaticMatchSchema {
    fn match_schema(&self) -> JsonSchemaProps {
        self.schema.clone()
    }
}

/// Registered targets, keyed by name (e.g. `admission.k8s.gatekeeper.sh`).
#[derive(Clone, Default)]
pub struct TargetRegistry {
    targets: HashMap<String, Arc<dyn MatchSchemaProvider>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `name`. Registering the same name twice
    /// replaces the previous provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn MatchSchemaProvider>) {
        let name = name.into();
        debug!(target_name = %name, "registered target");
        self.targets.insert(name, provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MatchSchemaProvider>> {
        self.targets.get(name).cloned()
    }

    /// Registered target names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.targets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRegistry")
            .field("targets", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use constraint_contracts::apiextensions::JsonSchemaProps;
    use constraint_core::traits::MatchSchemaProvider;

    use super::{StaticMatchSchema, TargetRegistry};

    #[test]
    fn test_static_provider_returns_independent_copies() {
        let provider = StaticMatchSchema::new(JsonSchemaProps::typed("object"));
        let mut first = provider.match_schema();
        first.type_ = Some("string".to_string());
        let second = provider.match_schema();
        assert_eq!(second.type_.as_deref(), Some("object"));
    }

    #[test]
    fn test_register_get_and_replace() {
        let mut registry = TargetRegistry::new();
        assert!(registry.is_empty());

        registry.register("b.target", Arc::new(StaticMatchSchema::new(JsonSchemaProps::typed("object"))));
        registry.register("a.target", Arc::new(StaticMatchSchema::new(JsonSchemaProps::typed("object"))));
        registry.register("b.target", Arc::new(StaticMatchSchema::new(JsonSchemaProps::typed("array"))));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a.target", "b.target"]);
        let replaced = registry.get("b.target").unwrap().match_schema();
        assert_eq!(replaced.type_.as_deref(), Some("array"));
        assert!(registry.get("missing").is_none());
    }
}
