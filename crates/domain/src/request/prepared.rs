//! Fully prepared requests

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use url::Url;

use super::{HeaderSet, HttpMethod, RequestBody};
use crate::error::{DomainError, DomainResult};

/// Media type set on requests carrying a structured JSON body.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Basic authentication credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicAuth {
    /// The username
    pub username: String,
    /// The password
    pub password: String,
}

impl BasicAuth {
    /// Creates new credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns true if neither part carries anything to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

/// Returns true if `url` carries its own scheme and host.
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| parsed.has_host())
}

/// Resolves `url` into an absolute URL.
///
/// Absolute URLs are used as they are. Anything else is treated as a path on
/// `base`; an empty URL means the root path.
///
/// # Errors
///
/// Returns an error if `url` is relative and there is no base, or if the
/// combined URL does not parse.
pub fn resolve_url(url: &str, base: Option<&Url>) -> DomainResult<Url> {
    if is_absolute_url(url) {
        return Url::parse(url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")));
    }

    let Some(base) = base else {
        return Err(DomainError::RelativeUrlWithoutHost(url.to_string()));
    };

    let origin = base.as_str().trim_end_matches('/');
    let joined = if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    };
    Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
}

/// A request ready to hand to a transport: headers, credentials and body are
/// already attached.
#[derive(Debug)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderSet,
    /// Request body
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderSet::new(),
            body: RequestBody::Empty,
        }
    }

    /// Creates a GET request for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL.
    pub fn get(url: &str) -> DomainResult<Self> {
        Ok(Self::new(HttpMethod::Get, resolve_url(url, None)?))
    }

    /// Attaches a body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Attaches a structured JSON body, fully serialized in memory, and marks
    /// the request as JSON.
    #[must_use]
    pub fn with_json_body(mut self, value: &serde_json::Value) -> Self {
        // Serializing a Value has no failure mode: keys are always strings.
        let encoded = serde_json::to_vec(value).unwrap_or_default();
        self.headers.insert("Content-Type", JSON_MEDIA_TYPE);
        self.body = RequestBody::Fixed(Bytes::from(encoded));
        self
    }

    /// Merges header overrides into the request.
    #[must_use]
    pub fn with_headers(mut self, headers: &HeaderSet) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Applies basic authentication. Empty credentials are ignored.
    #[must_use]
    pub fn with_basic_auth(mut self, auth: &BasicAuth) -> Self {
        if !auth.is_empty() {
            self.headers.insert("Authorization", auth.header_value());
        }
        self
    }

    /// Returns the number of body bytes the receiver will observe, if known.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.body.content_length()
    }

    /// Returns a copy that can be sent again, or `None` when the body is a
    /// stream that cannot be rewound.
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        Some(Self {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve_url("http://example.com/foo", None).unwrap();
        assert_eq!(url.as_str(), "http://example.com/foo");
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let base = Url::parse("http://127.0.0.1:4000").unwrap();
        assert_eq!(
            resolve_url("/my/url?x=1", Some(&base)).unwrap().as_str(),
            "http://127.0.0.1:4000/my/url?x=1"
        );
        assert_eq!(
            resolve_url("", Some(&base)).unwrap().as_str(),
            "http://127.0.0.1:4000/"
        );
        assert_eq!(
            resolve_url("nested", Some(&base)).unwrap().as_str(),
            "http://127.0.0.1:4000/nested"
        );
    }

    #[test]
    fn test_relative_without_base() {
        assert_eq!(
            resolve_url("/", None),
            Err(DomainError::RelativeUrlWithoutHost("/".to_string()))
        );
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = PreparedRequest::get("http://example.com/")
            .unwrap()
            .with_json_body(&json!({"hello": 99}));

        assert_eq!(request.headers.get("content-type"), Some(JSON_MEDIA_TYPE));
        assert_eq!(request.body.as_bytes(), Some(&br#"{"hello":99}"#[..]));
        assert_eq!(request.content_length(), Some(12));
    }

    #[test]
    fn test_header_overrides_win() {
        let overrides = HeaderSet::new().with("content-type", ["text/plain"]);
        let request = PreparedRequest::get("http://example.com/")
            .unwrap()
            .with_json_body(&json!(1))
            .with_headers(&overrides);

        assert_eq!(request.headers.get_all("Content-Type"), ["text/plain"]);
    }

    #[test]
    fn test_basic_auth() {
        let request = PreparedRequest::get("http://example.com/")
            .unwrap()
            .with_basic_auth(&BasicAuth::new("who", "bad-wolf"));
        assert_eq!(
            request.headers.get("Authorization"),
            Some("Basic d2hvOmJhZC13b2xm")
        );

        let request = PreparedRequest::get("http://example.com/")
            .unwrap()
            .with_basic_auth(&BasicAuth::default());
        assert!(!request.headers.contains("Authorization"));
    }

    #[test]
    fn test_try_clone_rewinds_fixed_body() {
        let request = PreparedRequest::get("http://example.com/")
            .unwrap()
            .with_body(RequestBody::from("payload"));
        let copy = request.try_clone().unwrap();
        assert_eq!(copy.body.as_bytes(), Some(&b"payload"[..]));
        assert_eq!(copy.url, request.url);
    }
}
