//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while building requests from test parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A relative URL was given but nothing can host it.
    #[error("relative URL {0:?} requires a handler to resolve against")]
    RelativeUrlWithoutHost(String),

    /// A header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value is invalid.
    #[error("invalid header value for {name}: {value:?}")]
    InvalidHeaderValue {
        /// Header the value was given for.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
