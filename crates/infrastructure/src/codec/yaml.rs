//! YAML codec.

use serde::Serialize;
use serde_yaml::Value;

use callcheck_application::ports::{Codec, CodecError};
use callcheck_domain::DynValue;

/// YAML codec backed by `serde_yaml`.
///
/// Integers and floats stay distinct. Map keys that are not strings are
/// rendered as text, and tags are dropped in favor of the tagged value.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Marshal(e.to_string()))
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        let value: Value =
            serde_yaml::from_slice(bytes).map_err(|e| CodecError::Unmarshal(e.to_string()))?;
        Ok(to_dyn(value))
    }
}

fn to_dyn(value: Value) -> DynValue {
    match value {
        Value::Null => DynValue::Null,
        Value::Bool(b) => DynValue::Bool(b),
        Value::Number(n) => {
            if n.is_f64() {
                n.as_f64().map_or(DynValue::Null, DynValue::Float)
            } else if let Some(int) = n.as_i64() {
                DynValue::Integer(int)
            } else {
                n.as_f64().map_or(DynValue::Null, DynValue::Float)
            }
        }
        Value::String(s) => DynValue::String(s),
        Value::Sequence(items) => DynValue::Seq(items.into_iter().map(to_dyn).collect()),
        Value::Mapping(entries) => DynValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key_text(key), to_dyn(value)))
                .collect(),
        ),
        Value::Tagged(tagged) => to_dyn(tagged.value),
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
