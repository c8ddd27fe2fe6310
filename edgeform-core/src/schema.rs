//! Schema - Define type schemas for resources
//!
//! Subproviders declare a schema for each resource and data source type.
//! The same vocabulary describes the provider's own configuration block.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::resource::Value;

/// Returns true when a change from `old` to `new` should not be reported as drift
pub type DiffSuppressFn = fn(old: &str, new: &str) -> bool;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// Ordered list
    List(Box<AttributeType>),
    /// Unordered collection without duplicates
    Set(Box<AttributeType>),
    /// Map with string keys
    Map(Box<AttributeType>),
    /// Nested block with its own attributes
    Block(BTreeMap<String, AttributeSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { base, validate, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Set(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                    if items[..i].contains(item) {
                        return Err(TypeError::DuplicateSetElement { index: i });
                    }
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(attributes), Value::Map(map)) => {
                for (name, attr) in attributes {
                    if attr.required && !map.contains_key(name) {
                        return Err(TypeError::MissingRequired { name: name.clone() });
                    }
                }
                for (k, v) in map {
                    let attr = attributes
                        .get(k)
                        .ok_or_else(|| TypeError::UnknownAttribute { name: k.clone() })?;
                    attr.attr_type
                        .validate(v)
                        .map_err(|e| TypeError::MapValueError {
                            key: k.clone(),
                            inner: Box::new(e),
                        })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeType::Block(attributes) => serde_json::json!({
                "block": attributes
                    .iter()
                    .map(|(name, attr)| (name.clone(), attr.to_json()))
                    .collect::<serde_json::Map<_, _>>(),
            }),
            AttributeType::Enum(variants) => serde_json::json!({ "enum": variants }),
            AttributeType::Custom { base, .. } => base.to_json(),
            other => serde_json::Value::String(other.type_name()),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("Attribute '{name}' accepts at most {max} item(s), got {got}")]
    TooManyItems { name: String, max: usize, got: usize },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Set element at index {index} is a duplicate")]
    DuplicateSetElement { index: usize },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Deprecation notice shown when the attribute is used
    pub deprecated: Option<String>,
    pub diff_suppress: Option<DiffSuppressFn>,
    pub max_items: Option<usize>,
    pub sensitive: bool,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            default: None,
            description: None,
            deprecated: None,
            diff_suppress: None,
            max_items: None,
            sensitive: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn deprecated(mut self, notice: impl Into<String>) -> Self {
        self.deprecated = Some(notice.into());
        self
    }

    pub fn with_diff_suppress(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Attribute only ever written by the provider
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        out.insert("type".to_string(), self.attr_type.to_json());
        for (flag, set) in [
            ("required", self.required),
            ("optional", self.optional),
            ("computed", self.computed),
            ("sensitive", self.sensitive),
        ] {
            if set {
                out.insert(flag.to_string(), serde_json::Value::Bool(true));
            }
        }
        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.to_json());
        }
        if let Some(description) = &self.description {
            out.insert("description".to_string(), description.clone().into());
        }
        if let Some(deprecated) = &self.deprecated {
            out.insert("deprecated".to_string(), deprecated.clone().into());
        }
        if let Some(max) = self.max_items {
            out.insert("max_items".to_string(), max.into());
        }
        serde_json::Value::Object(out)
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate configured attributes
    pub fn validate<'a, I>(&self, attributes: I) -> Result<(), Vec<TypeError>>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();

        for (name, value) in attributes {
            seen.insert(name.as_str());
            let Some(schema) = self.attributes.get(name) else {
                errors.push(TypeError::UnknownAttribute { name: name.clone() });
                continue;
            };
            if schema.is_computed_only() {
                errors.push(TypeError::ComputedOnly { name: name.clone() });
                continue;
            }
            if let (Some(max), Value::List(items)) = (schema.max_items, value)
                && items.len() > max
            {
                errors.push(TypeError::TooManyItems {
                    name: name.clone(),
                    max,
                    got: items.len(),
                });
            }
            if let Err(e) = schema.attr_type.validate(value) {
                errors.push(e);
            }
        }

        for (name, schema) in &self.attributes {
            if schema.required && schema.default.is_none() && !seen.contains(name.as_str()) {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Deprecation notices for the configured attributes that carry one
    pub fn deprecations<'a, I>(&self, names: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                self.attributes
                    .get(name)
                    .and_then(|attr| attr.deprecated.clone())
                    .map(|notice| (name.clone(), notice))
            })
            .collect()
    }

    /// Whether a planned change of `key` from `old` to `new` is not a real change
    pub fn suppress_diff(&self, key: &str, old: &Value, new: &Value) -> bool {
        if old == new {
            return true;
        }
        match (
            self.attributes.get(key).and_then(|attr| attr.diff_suppress),
            old,
            new,
        ) {
            (Some(suppress), Value::String(old), Value::String(new)) => suppress(old, new),
            _ => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        if let Some(description) = &self.description {
            out.insert("description".to_string(), description.clone().into());
        }
        out.insert(
            "attributes".to_string(),
            serde_json::Value::Object(
                self.attributes
                    .iter()
                    .map(|(name, attr)| (name.clone(), attr.to_json()))
                    .collect(),
            ),
        );
        serde_json::Value::Object(out)
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                if let Value::Int(n) = value {
                    if *n > 0 {
                        Ok(())
                    } else {
                        Err("Value must be positive".to_string())
                    }
                } else {
                    Err("Expected integer".to_string())
                }
            },
        }
    }

    /// String holding a syntactically valid JSON document
    pub fn json_string() -> AttributeType {
        AttributeType::Custom {
            name: "JsonString".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) => string_is_json(s),
                _ => Err("Expected string".to_string()),
            },
        }
    }

    /// Set of strings
    pub fn string_set() -> AttributeType {
        AttributeType::Set(Box::new(AttributeType::String))
    }

    /// List of strings
    pub fn string_list() -> AttributeType {
        AttributeType::List(Box::new(AttributeType::String))
    }

    /// Enum built from string literals
    pub fn one_of(variants: &[&str]) -> AttributeType {
        AttributeType::Enum(variants.iter().map(|v| v.to_string()).collect())
    }
}

/// Validate that a string parses as JSON
pub fn string_is_json(s: &str) -> Result<(), String> {
    serde_json::from_str::<serde_json::Value>(s)
        .map(|_| ())
        .map_err(|e| format!("invalid JSON: {}", e))
}

/// Diff suppression for JSON documents that differ only in formatting or key order
pub fn suppress_equivalent_json(old: &str, new: &str) -> bool {
    match (
        serde_json::from_str::<serde_json::Value>(old),
        serde_json::from_str::<serde_json::Value>(new),
    ) {
        (Ok(old), Ok(new)) => old == new,
        _ => false,
    }
}

/// Diff suppression for values that differ only in letter case
pub fn suppress_case_difference(old: &str, new: &str) -> bool {
    old.eq_ignore_ascii_case(new)
}
