//! Resolved schema registry — collects all component type definitions into a
//! unified registry that the component store uses for validation and
//! incompatibility checks.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::{ComponentSchema, ValidationError};

/// Registry of every known component type, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ComponentSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type. Re-registering a name replaces the old
    /// schema; data already stored under the old schema is not re-checked.
    pub fn register(&mut self, schema: ComponentSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Get a schema by component type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentSchema> {
        self.schemas.get(name)
    }

    /// Whether a component type is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All registered component type names, in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no component types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate a payload against the named schema.
    ///
    /// The caller is expected to have resolved the schema's existence first;
    /// an unknown name is reported as a validation failure.
    pub fn validate(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        match self.schemas.get(name) {
            Some(schema) => schema.validate(value),
            None => Err(ValidationError {
                component: name.to_string(),
                errors: vec!["unknown component type".into()],
            }),
        }
    }

    /// Whether two component types are mutually incompatible.
    ///
    /// The conflict holds if either side declares the other, so a one-sided
    /// declaration is enough.
    #[must_use]
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        let declared = |name: &str, other: &str| {
            self.schemas
                .get(name)
                .is_some_and(|s| s.incompatible_with.iter().any(|i| i == other))
        };
        declared(a, b) || declared(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut reg = SchemaRegistry::new();
        reg.register(ComponentSchema::new("Transform").field(FieldSpec::vec3("position")));
        reg.register(
            ComponentSchema::new("RigidBody")
                .field(FieldSpec::float("mass").range(0.0, 10_000.0))
                .incompatible_with("StaticBody"),
        );
        reg.register(ComponentSchema::new("StaticBody"));
        reg
    }

    #[test]
    fn test_register_and_lookup() {
        let reg = registry();
        assert!(reg.contains("Transform"));
        assert!(!reg.contains("Velocity"));
        assert_eq!(reg.names(), vec!["RigidBody", "StaticBody", "Transform"]);
    }

    #[test]
    fn test_validate_through_registry() {
        let reg = registry();
        assert!(reg.validate("Transform", &json!({"position": [0, 0, 0]})).is_ok());
        assert!(reg.validate("Transform", &json!({})).is_err());
    }

    #[test]
    fn test_unknown_type_fails_validation() {
        let reg = registry();
        let err = reg.validate("Velocity", &json!({})).unwrap_err();
        assert!(err.errors[0].contains("unknown component type"));
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let reg = registry();
        // Only RigidBody declares the conflict; both directions must hold.
        assert!(reg.conflicts("RigidBody", "StaticBody"));
        assert!(reg.conflicts("StaticBody", "RigidBody"));
        assert!(!reg.conflicts("RigidBody", "Transform"));
    }

    #[test]
    fn test_reregister_replaces_schema() {
        let mut reg = registry();
        reg.register(ComponentSchema::new("Transform").field(FieldSpec::vec3("position").optional()));
        assert!(reg.validate("Transform", &json!({})).is_ok());
    }
}
