//! Call responses
//!
//! Contains the response a call produced, with its fully read body and the
//! URL of the request as the caller addressed it.

use bytes::Bytes;
use url::Url;

use crate::request::{HeaderSet, HttpMethod};

/// Numeric status of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Wraps a numeric code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// The response to one call.
///
/// The body is read in full by the transport. `request_url` is the URL the
/// caller addressed; transports that reroute traffic restore it here so
/// response inspection sees the logical target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderSet,
    /// Response body
    pub body: Bytes,
    /// Method of the originating request
    pub request_method: HttpMethod,
    /// URL of the originating request
    pub request_url: Url,
}

impl CallResponse {
    /// Creates a response for a request to `request_url`.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: HeaderSet,
        body: impl Into<Bytes>,
        request_method: HttpMethod,
        request_url: Url,
    ) -> Self {
        Self {
            status: status.into().as_u16(),
            headers,
            body: body.into(),
            request_method,
            request_url,
        }
    }

    /// Returns the typed status.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::new(self.status)
    }

    /// Returns the `Content-Type` header value, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Returns the body as a lossy UTF-8 string.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
