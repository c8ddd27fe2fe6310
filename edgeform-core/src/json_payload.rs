//! JSON payload passthrough
//!
//! Several resources carry an opaque JSON document instead of a fixed
//! schema. The document is validated for syntax only. A tracked identifier
//! can be injected into outgoing payloads and stripped from responses so the
//! stored document never duplicates a field kept elsewhere in the state.

use serde_json::{Map, Value as JsonValue};

use crate::provider::{ProviderError, ProviderResult};
use crate::resource::ResourceData;

/// Read a JSON document from a string field
///
/// Without `reserved` the original bytes are returned untouched. With
/// `reserved = Some((key, value))` the key is set to `value` (replacing any
/// existing entry) and the document is re-serialized compactly; the
/// document must then be a JSON object.
pub fn extract(
    d: &ResourceData,
    field: &str,
    reserved: Option<(&str, &str)>,
) -> ProviderResult<Vec<u8>> {
    let raw = d.get_string(field)?;
    let invalid = |source| ProviderError::InvalidJson {
        field: field.to_string(),
        source,
    };

    let Some((key, value)) = reserved else {
        serde_json::from_str::<JsonValue>(&raw).map_err(invalid)?;
        return Ok(raw.into_bytes());
    };

    let mut document: Map<String, JsonValue> = serde_json::from_str(&raw).map_err(invalid)?;
    document.insert(key.to_string(), JsonValue::String(value.to_string()));
    serde_json::to_vec(&document).map_err(invalid)
}

/// Remove `reserved_keys` from a response document and encode the rest compactly
pub fn strip_and_encode(
    mut response: Map<String, JsonValue>,
    reserved_keys: &[&str],
) -> ProviderResult<String> {
    for key in reserved_keys {
        response.shift_remove(*key);
    }
    encode(&response)
}

/// Compact encoding of any serializable response
pub fn encode<T: serde::Serialize>(value: &T) -> ProviderResult<String> {
    serde_json::to_string(value).map_err(|e| ProviderError::StateWrite {
        field: "json".to_string(),
        message: e.to_string(),
    })
}

/// Compact encoding with object keys sorted at every depth
pub fn canonicalize(raw: &str) -> Result<String, serde_json::Error> {
    let value: JsonValue = serde_json::from_str(raw)?;
    serde_json::to_string(&sort_keys(value))
}

fn sort_keys(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<(String, JsonValue)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
