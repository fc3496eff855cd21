//! Expected outcome of a call.

use std::fmt;
use std::sync::Arc;

use callcheck_domain::{CallReport, HeaderSet, StatusCode};
use regex::Regex;
use serde::Serialize;

use crate::error::UsageError;

/// Status expected when none is given.
pub const DEFAULT_STATUS: u16 = 200;

/// Custom body check.
///
/// Receives the report of the call being verified and the raw body, so
/// anything it records is attributed to that call.
pub type BodyAsserter = Arc<dyn Fn(&mut CallReport, &[u8]) + Send + Sync>;

/// Wire format of an expected body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    /// JSON
    #[default]
    Json,
    /// YAML
    Yaml,
    /// BSON
    Bson,
}

impl BodyFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Bson => "bson",
        }
    }

    /// Media types a response may declare for this format.
    #[must_use]
    pub const fn media_types(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["application/json"],
            Self::Yaml => &["application/yaml", "application/x-yaml", "text/yaml"],
            Self::Bson => &["application/bson"],
        }
    }

    /// Structured-syntax suffix accepted in addition to the media types.
    #[must_use]
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("json"),
            Self::Yaml => Some("yaml"),
            Self::Bson => None,
        }
    }
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected value of a body, serialized by whichever codec checks it.
pub type ErasedValue = dyn erased_serde::Serialize + Send + Sync;

/// Expected response body.
#[derive(Clone)]
pub enum ExpectedBody {
    /// Compare the body with a value through the codec for `format`.
    Value {
        /// Expected value, kept in its own type until a codec marshals it
        value: Arc<ErasedValue>,
        /// Codec used for the comparison
        format: BodyFormat,
    },
    /// Run a custom check on the raw body.
    Asserter(BodyAsserter),
}

impl ExpectedBody {
    /// Expects a body in `format` equal to `value`.
    #[must_use]
    pub fn value<T>(value: T, format: BodyFormat) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::Value {
            value: Arc::new(value),
            format,
        }
    }

    /// Expects a JSON body equal to `value`.
    #[must_use]
    pub fn json<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::value(value, BodyFormat::Json)
    }

    /// Expects a YAML body equal to `value`.
    #[must_use]
    pub fn yaml<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::value(value, BodyFormat::Yaml)
    }

    /// Expects a BSON body equal to `value`.
    ///
    /// Values serialized through `bson`'s own types (binary, object ids,
    /// dates) keep their BSON representation.
    #[must_use]
    pub fn bson<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::value(value, BodyFormat::Bson)
    }

    /// Runs `asserter` on the raw body.
    pub fn asserter<F>(asserter: F) -> Self
    where
        F: Fn(&mut CallReport, &[u8]) + Send + Sync + 'static,
    {
        Self::Asserter(Arc::new(asserter))
    }
}

impl fmt::Debug for ExpectedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { value, format } => {
                let rendered = serde_json::to_string(&**value)
                    .unwrap_or_else(|e| format!("<unrenderable: {e}>"));
                f.debug_struct("Value")
                    .field("value", &format_args!("{rendered}"))
                    .field("format", format)
                    .finish()
            }
            Self::Asserter(_) => f.write_str("Asserter(..)"),
        }
    }
}

impl From<serde_json::Value> for ExpectedBody {
    fn from(value: serde_json::Value) -> Self {
        Self::json(value)
    }
}

/// Expected outcome of a call.
///
/// Unset fields fall back to a `200` status, no header checks, no body
/// check and no expected error.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    /// Expected status code
    pub status: Option<u16>,
    /// Expected header subset
    pub header: HeaderSet,
    /// Expected body
    pub body: Option<ExpectedBody>,
    /// Pattern the whole transport error message must match
    pub error: Option<String>,
}

impl Expectations {
    /// Returns the expected status, defaulting to `200`.
    #[must_use]
    pub fn expected_status(&self) -> StatusCode {
        StatusCode::new(self.status.unwrap_or(DEFAULT_STATUS))
    }

    /// Compiles the expected-error pattern, anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidErrorPattern`] if the pattern does not
    /// compile.
    pub fn error_pattern(&self) -> Result<Option<Regex>, UsageError> {
        let Some(pattern) = &self.error else {
            return Ok(None);
        };
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Some)
            .map_err(|e| UsageError::InvalidErrorPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
    }
}
