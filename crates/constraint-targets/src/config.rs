//! TOML target configuration.
//!
//! ```toml
//! [[targets]]
//! name = "admission.k8s.gatekeeper.sh"
//! match_schema = '''
//! { "properties": { "namespaces": { "type": "array", "items": { "type": "string" } } } }
//! '''
//! ```
//!
//! `match_schema` is the target's OpenAPI v3 fragment, written as JSON.

use std::{collections::HashSet, path::Path, sync::Arc};

use serde::Deserialize;
use tracing::{debug, info};

use constraint_contracts::{
    apiextensions::JsonSchemaProps,
    error::{ConstraintError, ConstraintResult},
};

use crate::registry::{StaticMatchSchema, TargetRegistry};

/// Top-level shape of a targets TOML document.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

/// One `[[targets]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetEntry {
    pub name: String,
    /// JSON text of the target's match schema.
    pub match_schema: String,
}

impl TargetEntry {
    /// Parse `match_schema` into a typed schema.
    pub fn schema(&self) -> ConstraintResult<JsonSchemaProps> {
        let document: serde_json::Value =
            serde_json::from_str(&self.match_schema).map_err(|e| ConstraintError::ConfigError {
                reason: format!("target '{}': match_schema is not valid JSON: {}", self.name, e),
            })?;
        if !document.is_object() {
            return Err(ConstraintError::ConfigError {
                reason: format!("target '{}': match_schema must be a JSON object", self.name),
            });
        }
        serde_json::from_value(document).map_err(|e| ConstraintError::ConfigError {
            reason: format!("target '{}': match_schema is not a valid schema: {}", self.name, e),
        })
    }
}

impl TargetConfig {
    /// Parse `s` as a targets TOML document.
    ///
    /// Returns `ConstraintError::ConfigError` if the TOML is malformed or
    /// does not match the expected shape.
    pub fn from_toml_str(s: &str) -> ConstraintResult<Self> {
        toml::from_str(s).map_err(|e| ConstraintError::ConfigError {
            reason: format!("failed to parse targets TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as a targets TOML document.
    pub fn from_file(path: &Path) -> ConstraintResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConstraintError::ConfigError {
            reason: format!("failed to read targets file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build a registry holding one `StaticMatchSchema` per entry.
    ///
    /// Empty or duplicate target names and unparsable schemas are
    /// configuration errors.
    pub fn into_registry(self) -> ConstraintResult<TargetRegistry> {
        let mut registry = TargetRegistry::new();
        let mut seen = HashSet::new();

        for entry in &self.targets {
            if entry.name.trim().is_empty() {
                return Err(ConstraintError::ConfigError {
                    reason: "target name must not be empty".to_string(),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConstraintError::ConfigError {
                    reason: format!("target '{}' is declared more than once", entry.name),
                });
            }
            let schema = entry.schema()?;
            debug!(target_name = %entry.name, "loaded target match schema");
            registry.register(entry.name.clone(), Arc::new(StaticMatchSchema::new(schema)));
        }

        info!(target_count = registry.len(), "target registry loaded");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use constraint_contracts::error::ConstraintError;
    use constraint_core::traits::MatchSchemaProvider;

    use super::TargetConfig;

    const TWO_TARGETS: &str = r#"
[[targets]]
name = "admission.k8s.gatekeeper.sh"
match_schema = '''
{
  "properties": {
    "kinds": { "type": "array", "items": { "type": "object" } },
    "namespaces": { "type": "array", "items": { "type": "string" } }
  }
}
'''

[[targets]]
name = "audit.example.com"
match_schema = '{ "type": "object" }'
"#;

    fn config_reason(err: ConstraintError) -> String {
        match err {
            ConstraintError::ConfigError { reason } => reason,
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_loads_every_target() {
        let registry = TargetConfig::from_toml_str(TWO_TARGETS)
            .unwrap()
            .into_registry()
            .unwrap();
        assert_eq!(
            registry.names(),
            vec!["admission.k8s.gatekeeper.sh", "audit.example.com"]
        );

        let schema = registry
            .get("admission.k8s.gatekeeper.sh")
            .unwrap()
            .match_schema();
        assert_eq!(schema.properties.len(), 2);
        let items = schema.properties["namespaces"].items.as_ref().unwrap();
        assert_eq!(items.type_.as_deref(), Some("string"));
    }

    #[test]
    fn test_empty_document_gives_empty_registry() {
        let registry = TargetConfig::from_toml_str("").unwrap().into_registry().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TargetConfig::from_toml_str("[[targets]\nname = ").unwrap_err();
        assert!(config_reason(err).contains("failed to parse targets TOML"));
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let err = TargetConfig::from_toml_str("[[targets]]\nname = \"x\"\n").unwrap_err();
        assert!(config_reason(err).contains("match_schema"));
    }

    #[test]
    fn test_invalid_json_schema_names_target() {
        let doc = "[[targets]]\nname = \"bad\"\nmatch_schema = '{ not json'\n";
        let err = TargetConfig::from_toml_str(doc).unwrap().into_registry().unwrap_err();
        let reason = config_reason(err);
        assert!(reason.contains("target 'bad'"));
        assert!(reason.contains("not valid JSON"));
    }

    #[test]
    fn test_non_object_schema_is_rejected() {
        let doc = "[[targets]]\nname = \"bad\"\nmatch_schema = '[1, 2]'\n";
        let err = TargetConfig::from_toml_str(doc).unwrap().into_registry().unwrap_err();
        assert!(config_reason(err).contains("must be a JSON object"));
    }

    #[test]
    fn test_wrongly_shaped_schema_is_rejected() {
        let doc = "[[targets]]\nname = \"bad\"\nmatch_schema = '{ \"type\": 5 }'\n";
        let err = TargetConfig::from_toml_str(doc).unwrap().into_registry().unwrap_err();
        assert!(config_reason(err).contains("not a valid schema"));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let doc = "[[targets]]\nname = \"t\"\nmatch_schema = '{}'\n\n[[targets]]\nname = \"t\"\nmatch_schema = '{}'\n";
        let err = TargetConfig::from_toml_str(doc).unwrap().into_registry().unwrap_err();
        assert!(config_reason(err).contains("declared more than once"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let doc = "[[targets]]\nname = \"  \"\nmatch_schema = '{}'\n";
        let err = TargetConfig::from_toml_str(doc).unwrap().into_registry().unwrap_err();
        assert!(config_reason(err).contains("must not be empty"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TargetConfig::from_file(Path::new("/nonexistent/targets.toml")).unwrap_err();
        assert!(config_reason(err).contains("failed to read targets file"));
    }
}
