//! Requests as observed by the receiving side.

use serde::{Deserialize, Serialize};

use crate::request::{HeaderSet, HttpMethod};

/// Headers a client stack adds on its own. They are dropped from a capture
/// so that it only reflects what the test asked for.
pub const TRANSPORT_HEADERS: &[&str] = &[
    "Accept",
    "Accept-Encoding",
    "Authorization",
    "Connection",
    "Content-Length",
    "Host",
    "Transfer-Encoding",
    "User-Agent",
];

/// A request as seen by a handler, in the shape the echo handler returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// Path and query of the request
    #[serde(rename = "URL")]
    pub url: String,
    /// Request method
    #[serde(rename = "Method")]
    pub method: String,
    /// Request body as text
    #[serde(rename = "Body")]
    pub body: String,
    /// Whether an `Authorization` header was sent
    #[serde(rename = "Auth")]
    pub auth: bool,
    /// Headers left after removing [`TRANSPORT_HEADERS`]
    #[serde(rename = "Header")]
    pub header: HeaderSet,
    /// `Content-Length` the receiver observed, if the request declared one
    #[serde(skip)]
    pub content_length: Option<u64>,
}

impl CapturedRequest {
    /// Builds a capture from the raw parts of a received request.
    #[must_use]
    pub fn from_parts(method: &str, url: impl Into<String>, mut headers: HeaderSet, body: &[u8]) -> Self {
        let auth = headers.contains("Authorization");
        let content_length = headers
            .get("Content-Length")
            .and_then(|value| value.trim().parse().ok());
        for name in TRANSPORT_HEADERS {
            headers.remove(name);
        }

        Self {
            url: url.into(),
            method: method.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
            auth,
            header: headers,
            content_length,
        }
    }

    /// The capture a handler would produce for a bare request with `method`
    /// to `url`, used as an expected value.
    #[must_use]
    pub fn expected(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.to_string(),
            ..Self::default()
        }
    }
}
