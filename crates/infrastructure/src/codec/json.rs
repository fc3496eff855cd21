//! JSON codec.

use serde::Serialize;

use callcheck_application::ports::{Codec, CodecError};
use callcheck_domain::DynValue;

/// JSON codec backed by `serde_json`.
///
/// Every number decodes as a float, so `1` and `1.0` are the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Marshal(e.to_string()))
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<DynValue, CodecError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Unmarshal(e.to_string()))?;
        Ok(DynValue::from(value).into_float_numbers())
    }
}
