//! BSON codec.

use bson::{Bson, Document};
use serde::Serialize;

use callcheck_application::ports::{Codec, CodecError};
use callcheck_domain::DynValue;

/// BSON codec backed by the `bson` crate.
///
/// Only documents can be encoded at the top level. Int32 and Int64 decode as
/// integers, doubles as floats, binary as bytes; other BSON types (object
/// ids, dates, decimals...) are compared through their relaxed extended JSON
/// form.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonCodec;

impl Codec for BsonCodec {
    fn name(&self) -> &'static str {
        "bson"
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let document = match bson::to_bson(value).map_err(|e| CodecError::Marshal(e.to_string()))? {
            Bson::Document(document) => document,
            other => {
                return Err(CodecError::Marshal(format!(
                    "top-level value must be a document, got {:?}",
                    other.element_type()
                )));
            }
        };

        let mut buffer = Vec::new();
        document
            .to_writer(&mut buffer)
            .map_err(|e| CodecError::Marshal(e.to_string()))?;
        Ok(buffer)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        let mut reader = bytes;
        let document = Document::from_reader(&mut reader)
            .map_err(|e| CodecError::Unmarshal(e.to_string()))?;
        Ok(document_to_dyn(document))
    }
}

fn document_to_dyn(document: Document) -> DynValue {
    DynValue::Map(
        document
            .into_iter()
            .map(|(key, value)| (key, to_dyn(value)))
            .collect(),
    )
}

fn to_dyn(value: Bson) -> DynValue {
    match value {
        Bson::Null | Bson::Undefined => DynValue::Null,
        Bson::Boolean(b) => DynValue::Bool(b),
        Bson::Int32(n) => DynValue::Integer(i64::from(n)),
        Bson::Int64(n) => DynValue::Integer(n),
        Bson::Double(n) => DynValue::Float(n),
        Bson::String(s) => DynValue::String(s),
        Bson::Binary(binary) => DynValue::Bytes(binary.bytes),
        Bson::Array(items) => DynValue::Seq(items.into_iter().map(to_dyn).collect()),
        Bson::Document(document) => document_to_dyn(document),
        other => DynValue::from(other.into_relaxed_extjson()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_keeps_types() {
        let bytes = BsonCodec
            .marshal(&doc! {"i": 1_i32, "l": 2_i64, "f": 1.5, "s": "x", "a": [true]})
            .unwrap();
        let value = BsonCodec.unmarshal(&bytes).unwrap();

        assert_eq!(value.get("i"), Some(&DynValue::Integer(1)));
        assert_eq!(value.get("l"), Some(&DynValue::Integer(2)));
        assert_eq!(value.get("f"), Some(&DynValue::Float(1.5)));
        assert_eq!(value.get("s"), Some(&DynValue::String("x".to_string())));
        assert_eq!(value.get("a"), Some(&DynValue::Seq(vec![DynValue::Bool(true)])));
    }

    #[test]
    fn test_top_level_must_be_document() {
        assert!(matches!(
            BsonCodec.marshal(&42),
            Err(CodecError::Marshal(_))
        ));
    }

    #[test]
    fn test_garbage_does_not_decode() {
        assert!(matches!(
            BsonCodec.unmarshal(b"}"),
            Err(CodecError::Unmarshal(_))
        ));
    }
}
