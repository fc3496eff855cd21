//! Codec equality checking.
//!
//! The expected value is marshaled with the codec and decoded again, then
//! compared structurally with the decoded obtained bytes. Both sides go
//! through the same decoder, so they share one normalized shape: a JSON
//! codec turns every number into a float on both sides, extra or missing
//! fields show up as differences instead of being dropped by a typed decode.

use std::any::{Any, type_name};

use bytes::Bytes;
use callcheck_domain::diff;
use serde::Serialize;

use crate::error::CheckError;
use crate::ports::Codec;

/// Compares encoded bytes against an expected value using one codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecChecker<C> {
    codec: C,
}

impl<C: Codec> CodecChecker<C> {
    /// Creates a checker for `codec`.
    pub const fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Returns the underlying codec.
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Marshals an expected value, the first step of [`check`](Self::check).
    ///
    /// Lets callers reject an expectation the codec cannot encode before
    /// anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Usage`] if `want` cannot be marshaled.
    pub fn marshal_expected<T>(&self, want: &T) -> Result<Vec<u8>, CheckError>
    where
        T: Serialize + ?Sized,
    {
        self.codec
            .marshal(want)
            .map_err(|e| CheckError::Usage(format!("cannot marshal expected contents: {e}")))
    }

    /// Checks that `got`, once decoded, equals `want`.
    ///
    /// # Errors
    ///
    /// - [`CheckError::Usage`] if `want` cannot be marshaled
    /// - [`CheckError::ExpectedUndecodable`] if `want` does not decode back
    /// - [`CheckError::ObtainedUndecodable`] if `got` is malformed
    /// - [`CheckError::Mismatch`] if the decoded values differ
    pub fn check<T>(&self, got: impl AsRef<[u8]>, want: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        let got = got.as_ref();

        let want_bytes = self.marshal_expected(want)?;
        let want_value = self
            .codec
            .unmarshal(&want_bytes)
            .map_err(|e| CheckError::ExpectedUndecodable(e.to_string()))?;

        let got_value =
            self.codec
                .unmarshal(got)
                .map_err(|e| CheckError::ObtainedUndecodable {
                    message: e.to_string(),
                    raw: String::from_utf8_lossy(got).into_owned(),
                })?;

        let differences = diff(&got_value, &want_value);
        if differences.is_empty() {
            Ok(())
        } else {
            Err(CheckError::Mismatch { differences })
        }
    }

    /// Like [`check`](Self::check), for an actual value of unknown type.
    ///
    /// The actual value must hold encoded content: `String`, `&str`,
    /// `Vec<u8>`, `&[u8]` or `Bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Usage`] for any other actual type, otherwise
    /// the errors of [`check`](Self::check).
    pub fn check_any<G, T>(&self, got: &G, want: &T) -> Result<(), CheckError>
    where
        G: Any,
        T: Serialize + ?Sized,
    {
        let content = encoded_content(got).ok_or_else(|| {
            CheckError::Usage(format!("expected string, got {}", type_name::<G>()))
        })?;
        self.check(content, want)
    }
}

fn encoded_content(got: &dyn Any) -> Option<&[u8]> {
    if let Some(s) = got.downcast_ref::<String>() {
        return Some(s.as_bytes());
    }
    if let Some(s) = got.downcast_ref::<&'static str>() {
        return Some(s.as_bytes());
    }
    if let Some(v) = got.downcast_ref::<Vec<u8>>() {
        return Some(v.as_slice());
    }
    if let Some(v) = got.downcast_ref::<&'static [u8]>() {
        return Some(*v);
    }
    got.downcast_ref::<Bytes>().map(|b| &b[..])
}
