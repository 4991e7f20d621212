//! YAML reading and writing for documents.
//!
//! Documents are kept in memory as [`serde_json::Value`] trees, so YAML input
//! is converted on load. YAML allows non-string mapping keys (an unquoted
//! `200:` status code parses as an integer); those keys are coerced to their
//! string spelling so the in-memory tree always has string keys.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SplitError;

/// Extension trait for serializing types to YAML.
///
/// Implemented for all [`Serialize`] types; service documents use it when
/// written to disk.
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_yaml::Error`] if serialization fails.
    fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

/// Parses a YAML string into an order-preserving [`serde_json::Value`].
///
/// # Errors
///
/// Returns a [`SplitError`] on invalid YAML, on mapping keys that have no
/// string spelling (sequence or mapping keys), and on non-finite numbers.
pub fn from_yaml_str(content: &str) -> Result<Value, SplitError> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(content)?;
    yaml_to_json(parsed)
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, SplitError> {
    use serde_yaml::Value as Yaml;

    let converted = match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(flag) => Value::Bool(flag),
        Yaml::Number(number) => Value::Number(yaml_number(&number)?),
        Yaml::String(text) => Value::String(text),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, entry) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(entry)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    };
    Ok(converted)
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, SplitError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(text) => Ok(text),
        Yaml::Number(number) => Ok(number.to_string()),
        Yaml::Bool(flag) => Ok(flag.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(SplitError::MalformedDocument {
            reason: format!("unsupported mapping key: {other:?}"),
        }),
    }
}

fn yaml_number(number: &serde_yaml::Number) -> Result<serde_json::Number, SplitError> {
    if let Some(int) = number.as_i64() {
        return Ok(int.into());
    }
    if let Some(unsigned) = number.as_u64() {
        return Ok(unsigned.into());
    }
    number
        .as_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| SplitError::MalformedDocument {
            reason: format!("non-finite number: {number}"),
        })
}
