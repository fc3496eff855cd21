//! Application error types
//!
//! Usage errors (the test itself is malformed) are kept apart from transport
//! errors and from check failures (the system under test misbehaved).

use callcheck_domain::{Difference, DomainError, render_diff};
use thiserror::Error;

/// Malformed test input, detected before or independently of any I/O.
#[derive(Debug, Clone, Error)]
pub enum UsageError {
    /// A relative URL was given without a handler to host it.
    #[error("relative URL {0:?} requires a handler to host it")]
    RelativeUrlWithoutHandler(String),

    /// The expected-error pattern is not a valid regular expression.
    #[error("invalid expected error pattern {pattern:?}: {message}")]
    InvalidErrorPattern {
        /// Pattern as supplied by the test
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Call parameters could not be turned into a request.
    #[error("invalid call parameters: {0}")]
    Domain(#[from] DomainError),

    /// The local server hosting the handler could not be started.
    #[error("cannot start local server: {0}")]
    ServerStart(String),

    /// A codec check was misused.
    #[error("{0}")]
    Check(CheckError),
}

/// Errors produced while executing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Connection was refused.
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit
        max: usize,
    },

    /// The request URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body could not be read.
    #[error("cannot read response body: {0}")]
    Body(String),

    /// Any other failure, displayed verbatim.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Creates an error whose message is exactly `message`.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Outcome of a failed codec equality check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// The check itself was misused.
    #[error("bad check: {0}")]
    Usage(String),

    /// The expected value did not survive its own round trip.
    #[error("cannot unmarshal expected contents: {0}")]
    ExpectedUndecodable(String),

    /// The obtained bytes are not valid for the codec.
    #[error("cannot unmarshal obtained contents: {message}; {raw:?}")]
    ObtainedUndecodable {
        /// Decoder message
        message: String,
        /// Obtained content, lossily decoded as UTF-8
        raw: String,
    },

    /// Both sides decoded but differ.
    #[error("values are not equal\ndiff (-got +want):\n{}", render_diff(.differences))]
    Mismatch {
        /// Every differing path
        differences: Vec<Difference>,
    },
}

impl CheckError {
    /// Returns true if the error is a usage error rather than a failed check.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Errors returned by the harness.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// The call was malformed.
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    /// The request could not be executed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<DomainError> for HarnessError {
    fn from(error: DomainError) -> Self {
        Self::Usage(UsageError::Domain(error))
    }
}

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_domain::DynValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_other_displays_bare_message() {
        assert_eq!(TransportError::other("some error").to_string(), "some error");
        assert_eq!(
            HarnessError::from(TransportError::other("some error")).to_string(),
            "some error"
        );
    }

    #[test]
    fn test_usage_prefix() {
        let error = HarnessError::from(UsageError::RelativeUrlWithoutHandler("/foo".to_string()));
        assert_eq!(
            error.to_string(),
            "usage error: relative URL \"/foo\" requires a handler to host it"
        );
    }

    #[test]
    fn test_check_error_messages() {
        let obtained = CheckError::ObtainedUndecodable {
            message: "expected value at line 1 column 1".to_string(),
            raw: "}".to_string(),
        };
        assert_eq!(
            obtained.to_string(),
            "cannot unmarshal obtained contents: expected value at line 1 column 1; \"}\""
        );
        assert!(!obtained.is_usage());
        assert!(CheckError::Usage("expected string, got bool".to_string()).is_usage());
    }

    #[test]
    fn test_mismatch_renders_diff() {
        let error = CheckError::Mismatch {
            differences: vec![Difference {
                path: "$.First".to_string(),
                got: Some(DynValue::Float(1.0)),
                want: None,
            }],
        };
        assert_eq!(
            error.to_string(),
            "values are not equal\ndiff (-got +want):\n$.First:\n\t-got:  1.0\n\t+want: <missing>"
        );
    }
}
