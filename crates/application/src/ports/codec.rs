//! Codec port

use callcheck_domain::DynValue;
use serde::Serialize;
use thiserror::Error;

/// Error raised by a codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value could not be encoded.
    #[error("{0}")]
    Marshal(String),
    /// Bytes could not be decoded.
    #[error("{0}")]
    Unmarshal(String),
}

/// A marshal/unmarshal pair for one wire format.
///
/// `unmarshal` decodes into the codec-neutral [`DynValue`], normalizing
/// numbers the way the format's own generic decoder would.
pub trait Codec: Send + Sync {
    /// Short format name, e.g. `json`.
    fn name(&self) -> &'static str;

    /// Encodes a value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Marshal`] if the value cannot be represented.
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decodes bytes into a dynamic value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unmarshal`] if the bytes are malformed.
    fn unmarshal(&self, bytes: &[u8]) -> Result<DynValue, CodecError>;
}
