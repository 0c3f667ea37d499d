//! Component schema definitions and payload validation.
//!
//! A [`ComponentSchema`] describes one component type: its fields, which of
//! them are required, and which other component types it can never share an
//! entity with. Validation walks a `serde_json::Value` payload against the
//! schema and collects every problem it finds, so a rejected write reports
//! all offending fields at once.

use serde_json::Value;
use thiserror::Error;

/// A payload was rejected by its component type's schema.
///
/// Carries every problem found, not just the first one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid data for component '{component}': {}", errors.join("; "))]
pub struct ValidationError {
    /// The component type the payload was checked against.
    pub component: String,
    /// Human-readable description of each violation.
    pub errors: Vec<String>,
}

/// The accepted shape of a single schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
    /// An array of exactly three numbers, e.g. a position or scale.
    Vec3,
    List,
    Object,
    /// Any JSON value. Escape hatch for free-form component data.
    Any,
}

/// Specification of one field within a [`ComponentSchema`].
///
/// Built with the kind constructors plus chained refinements:
///
/// ```rust
/// use scene_schema::FieldSpec;
///
/// let mass = FieldSpec::float("mass").range(0.0, 10_000.0);
/// let cast = FieldSpec::string("shadows").one_of(["on", "off"]).optional();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name within the component object.
    pub name: String,
    /// Accepted value shape.
    pub kind: FieldKind,
    /// Whether the field must be present. Defaults to `true`.
    pub required: bool,
    /// Inclusive numeric range, checked for `Int`/`Float` fields.
    pub range: Option<(f64, f64)>,
    /// Allowed values, checked for `Str` fields.
    pub one_of: Option<Vec<String>>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            range: None,
            one_of: None,
        }
    }

    /// A boolean field.
    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    /// An integer field.
    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    /// A floating-point field. Integer payload values are accepted.
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// A string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Str)
    }

    /// A three-component numeric vector field (`[x, y, z]`).
    #[must_use]
    pub fn vec3(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Vec3)
    }

    /// An array field with unconstrained elements.
    #[must_use]
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    /// A nested object field.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Object)
    }

    /// A field accepting any JSON value.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Any)
    }

    /// Mark the field as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Constrain a numeric field to the inclusive range `[min, max]`.
    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Constrain a string field to a fixed set of values.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Check one provided value against this spec, appending problems to `errors`.
    fn check(&self, value: &Value, errors: &mut Vec<String>) {
        match self.kind {
            FieldKind::Bool => {
                if !value.is_boolean() {
                    errors.push(format!("field '{}': expected bool", self.name));
                }
            }
            FieldKind::Int => {
                if value.as_i64().is_none() && value.as_u64().is_none() {
                    errors.push(format!("field '{}': expected integer", self.name));
                } else {
                    self.check_range(value.as_f64(), errors);
                }
            }
            FieldKind::Float => {
                if value.as_f64().is_none() {
                    errors.push(format!("field '{}': expected number", self.name));
                } else {
                    self.check_range(value.as_f64(), errors);
                }
            }
            FieldKind::Str => {
                match value.as_str() {
                    None => errors.push(format!("field '{}': expected string", self.name)),
                    Some(s) => {
                        if let Some(allowed) = &self.one_of {
                            if !allowed.iter().any(|a| a == s) {
                                errors.push(format!(
                                    "field '{}': '{}' is not one of [{}]",
                                    self.name,
                                    s,
                                    allowed.join(", ")
                                ));
                            }
                        }
                    }
                }
            }
            FieldKind::Vec3 => match value.as_array() {
                Some(arr) if arr.len() == 3 && arr.iter().all(Value::is_number) => {}
                _ => errors.push(format!(
                    "field '{}': expected array of 3 numbers",
                    self.name
                )),
            },
            FieldKind::List => {
                if !value.is_array() {
                    errors.push(format!("field '{}': expected array", self.name));
                }
            }
            FieldKind::Object => {
                if !value.is_object() {
                    errors.push(format!("field '{}': expected object", self.name));
                }
            }
            FieldKind::Any => {}
        }
    }

    fn check_range(&self, number: Option<f64>, errors: &mut Vec<String>) {
        if let (Some((min, max)), Some(n)) = (self.range, number) {
            if n < min || n > max {
                errors.push(format!(
                    "field '{}': {} out of range {}..={}",
                    self.name, n, min, max
                ));
            }
        }
    }
}

/// Schema for one component type.
///
/// A schema with no fields is a *tag* — presence-only data whose payload is
/// `null` or an empty object.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSchema {
    /// Component type name, e.g. `"Transform"`.
    pub name: String,
    /// Declared fields. Payload fields outside this set are rejected.
    pub fields: Vec<FieldSpec>,
    /// Component types that may never coexist with this one on an entity.
    pub incompatible_with: Vec<String>,
}

impl ComponentSchema {
    /// Start a schema for the named component type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            incompatible_with: Vec::new(),
        }
    }

    /// Add a field specification.
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Declare a component type this one can never share an entity with.
    /// The conflict is enforced symmetrically regardless of which side
    /// declares it.
    #[must_use]
    pub fn incompatible_with(mut self, other: impl Into<String>) -> Self {
        self.incompatible_with.push(other.into());
        self
    }

    /// Whether this schema is a tag (no fields).
    #[must_use]
    pub fn is_tag(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a payload against this schema.
    ///
    /// Collects every violation; `Err` carries them all.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.is_tag() {
            match value {
                Value::Null => {}
                Value::Object(map) if map.is_empty() => {}
                _ => errors.push("tag component payload must be null or an empty object".into()),
            }
            return self.finish(errors);
        }

        let Some(obj) = value.as_object() else {
            errors.push("expected a JSON object".into());
            return self.finish(errors);
        };

        for field in &self.fields {
            match obj.get(&field.name) {
                Some(v) => field.check(v, &mut errors),
                None if field.required => {
                    errors.push(format!("missing required field '{}'", field.name));
                }
                None => {}
            }
        }

        for key in obj.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                errors.push(format!("unexpected field '{key}'"));
            }
        }

        self.finish(errors)
    }

    fn finish(&self, errors: Vec<String>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                component: self.name.clone(),
                errors,
            })
        }
    }
}
