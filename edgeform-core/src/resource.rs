//! Resource - Attribute values and the per-instance state handle

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::provider::{ProviderError, ProviderResult};
use crate::schema::ResourceSchema;

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Int(_) => "Int",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    /// Convert into a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Convert from a JSON value
    ///
    /// `null` has no attribute representation and yields `None`; floats are
    /// truncated towards zero.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Value::Int),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Array(items) => Some(Value::List(
                items.iter().filter_map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(Value::Map(
                map.iter()
                    .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items.into_iter().map(Value::String).collect())
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

/// State of one resource or data source instance, as held by the host
///
/// The handle reads whatever the host supplied and only accepts writes of
/// attributes declared in its schema.
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<ResourceSchema>,
    id: Option<String>,
    attributes: HashMap<String, Value>,
}

impl ResourceData {
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            id: None,
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute without schema checks (used to load host-supplied state)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The resource ID, failing when the instance has not been created yet
    pub fn require_id(&self) -> ProviderResult<&str> {
        self.id.as_deref().ok_or_else(|| ProviderError::FieldMissing {
            field: "id".to_string(),
        })
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Drop the ID, telling the host the remote object no longer exists
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Drop the ID and every attribute
    pub fn clear(&mut self) {
        self.id = None;
        self.attributes.clear();
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Value of an attribute, falling back to the schema default
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).or_else(|| {
            self.schema
                .attributes
                .get(key)
                .and_then(|attr| attr.default.as_ref())
        })
    }

    /// String attribute; an empty string counts as unset
    pub fn get_string(&self, key: &str) -> ProviderResult<String> {
        self.get_optional_string(key)?
            .ok_or_else(|| ProviderError::FieldMissing {
                field: key.to_string(),
            })
    }

    pub fn get_optional_string(&self, key: &str) -> ProviderResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(invalid_type(key, "String", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> ProviderResult<i64> {
        self.get_optional_int(key)?
            .ok_or_else(|| ProviderError::FieldMissing {
                field: key.to_string(),
            })
    }

    pub fn get_optional_int(&self, key: &str) -> ProviderResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(invalid_type(key, "Int", other)),
        }
    }

    pub fn get_bool(&self, key: &str) -> ProviderResult<bool> {
        match self.get(key) {
            None => Err(ProviderError::FieldMissing {
                field: key.to_string(),
            }),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid_type(key, "Bool", other)),
        }
    }

    /// List or set of strings; unset yields an empty list
    pub fn get_string_list(&self, key: &str) -> ProviderResult<Vec<String>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(invalid_type(key, "String", other)),
                })
                .collect(),
            Some(other) => Err(invalid_type(key, "List", other)),
        }
    }

    /// List of nested blocks (each a map); unset yields an empty list
    pub fn get_blocks(&self, key: &str) -> ProviderResult<Vec<BTreeMap<String, Value>>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Map(map) => Ok(map.clone()),
                    other => Err(invalid_type(key, "Map", other)),
                })
                .collect(),
            Some(other) => Err(invalid_type(key, "List", other)),
        }
    }

    /// Write one declared attribute
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> ProviderResult<()> {
        let value = value.into();
        self.check_write(key, &value)?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Write several declared attributes; nothing is written unless all are valid
    pub fn set_attrs<'a, I>(&mut self, fields: I) -> ProviderResult<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let fields: Vec<(&str, Value)> = fields.into_iter().collect();
        for (key, value) in &fields {
            self.check_write(key, value)?;
        }
        for (key, value) in fields {
            self.attributes.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn check_write(&self, key: &str, value: &Value) -> ProviderResult<()> {
        let attr = self
            .schema
            .attributes
            .get(key)
            .ok_or_else(|| ProviderError::StateWrite {
                field: key.to_string(),
                message: format!(
                    "attribute is not declared in the {} schema",
                    self.schema.resource_type
                ),
            })?;
        attr.attr_type
            .validate(value)
            .map_err(|e| ProviderError::StateWrite {
                field: key.to_string(),
                message: e.to_string(),
            })
    }
}

fn invalid_type(key: &str, expected: &str, got: &Value) -> ProviderError {
    ProviderError::InvalidValue {
        field: key.to_string(),
        message: format!("expected {}, got {}", expected, got.type_name()),
    }
}
