//! Content digest of a synthesized definition.

use sha2::{Digest, Sha256};

use constraint_contracts::{
    apiextensions::CustomResourceDefinition,
    error::{ConstraintError, ConstraintResult},
};

/// SHA-256 over the JSON serialization of `crd`, as a lowercase 64-character
/// hex string.
///
/// Every map in the definition model is ordered, so equal definitions always
/// serialize to the same bytes and share a digest.
pub fn definition_digest(crd: &CustomResourceDefinition) -> ConstraintResult<String> {
    let bytes = serde_json::to_vec(crd).map_err(|e| ConstraintError::DefinitionRoundTrip {
        stage: "digest".to_string(),
        reason: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use constraint_contracts::{apiextensions::CustomResourceDefinition, meta::ObjectMeta};

    use super::definition_digest;

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = definition_digest(&CustomResourceDefinition::default()).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_tracks_content() {
        let a = CustomResourceDefinition {
            metadata: ObjectMeta::named("a.constraints.gatekeeper.sh"),
            ..CustomResourceDefinition::default()
        };
        let b = CustomResourceDefinition {
            metadata: ObjectMeta::named("b.constraints.gatekeeper.sh"),
            ..CustomResourceDefinition::default()
        };
        assert_eq!(definition_digest(&a).unwrap(), definition_digest(&a.clone()).unwrap());
        assert_ne!(definition_digest(&a).unwrap(), definition_digest(&b).unwrap());
    }
}
