//! Codec-neutral dynamic values.
//!
//! Every codec decodes into [`DynValue`], so values produced by different
//! sides of a comparison share one shape regardless of the native types that
//! were encoded.

use std::fmt;

use indexmap::IndexMap;

/// A decoded value.
///
/// Map equality ignores key order. Integers and floats are distinct: codecs
/// that do not tell them apart must decode both into one variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynValue {
    /// Absent or null value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Ordered sequence
    Seq(Vec<DynValue>),
    /// Key-ordered map
    Map(IndexMap<String, DynValue>),
}

impl DynValue {
    /// Returns a short name of the variant, used in diff output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
        }
    }

    /// Converts every integer in the value into a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn into_float_numbers(self) -> Self {
        match self {
            Self::Integer(n) => Self::Float(n as f64),
            Self::Seq(items) => Self::Seq(items.into_iter().map(Self::into_float_numbers).collect()),
            Self::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_float_numbers()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Looks up a map entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for DynValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(int), _) => Self::Integer(int),
                (None, Some(float)) => Self::Float(float),
                (None, None) => Self::Null,
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(bytes) => write!(f, "bytes{bytes:02x?}"),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
