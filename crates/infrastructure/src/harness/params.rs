//! Call parameters.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::Router;

use callcheck_application::ports::{HttpTransport, TransportFuture};
use callcheck_application::{Expectations, TransportError};
use callcheck_domain::{BasicAuth, CallResponse, HeaderSet, HttpMethod, PreparedRequest, RequestBody};

/// Custom execution function.
///
/// Receives the fully prepared request and the harness transport. It may
/// send the request more than once; [`PreparedRequest::try_clone`] rewinds
/// in-memory bodies for that.
pub type ExecuteFn =
    Arc<dyn Fn(PreparedRequest, Arc<dyn HttpTransport>) -> TransportFuture<'static> + Send + Sync>;

/// Hook that may rewrite a response before it is verified.
pub type ResponseHook = Arc<dyn Fn(&mut CallResponse) + Send + Sync>;

/// Wraps an async closure into an [`ExecuteFn`].
pub fn execute_fn<F, Fut>(f: F) -> ExecuteFn
where
    F: Fn(PreparedRequest, Arc<dyn HttpTransport>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CallResponse, TransportError>> + Send + 'static,
{
    Arc::new(
        move |request: PreparedRequest, transport: Arc<dyn HttpTransport>| -> TransportFuture<'static> {
            Box::pin(f(request, transport))
        },
    )
}

/// Wraps a closure into a [`ResponseHook`].
pub fn response_hook<F>(f: F) -> ResponseHook
where
    F: Fn(&mut CallResponse) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Parameters of one request.
///
/// The destination is `url` when it is absolute. Otherwise `url` is a path
/// on a local server started for the call to host `handler`.
#[derive(Default)]
pub struct DoRequestParams {
    /// Handler hosting relative URLs
    pub handler: Option<Router>,
    /// HTTP method, `GET` when unset
    pub method: Option<HttpMethod>,
    /// Absolute URL, or path on the hosted handler; empty means `/`
    pub url: String,
    /// Raw request body
    pub body: Option<RequestBody>,
    /// JSON request body, takes precedence over `body`
    pub json_body: Option<serde_json::Value>,
    /// Headers replacing same-named request headers
    pub header: HeaderSet,
    /// Basic authentication credentials
    pub basic_auth: Option<BasicAuth>,
    /// Custom execution replacing the harness transport
    pub execute: Option<ExecuteFn>,
    /// Post-processing of the response
    pub after_response: Option<ResponseHook>,
}

impl DoRequestParams {
    /// Parameters for a `GET` of `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Hosts relative URLs on `handler`.
    #[must_use]
    pub fn with_handler(mut self, handler: Router) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the method, defaulting to `GET`.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// Short description used in reports, e.g. `GET /foo`.
    #[must_use]
    pub fn describe(&self) -> String {
        let url = if self.url.is_empty() { "/" } else { &self.url };
        format!("{} {url}", self.method())
    }
}

impl fmt::Debug for DoRequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoRequestParams")
            .field("handler", &self.handler.is_some())
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("json_body", &self.json_body)
            .field("header", &self.header)
            .field("basic_auth", &self.basic_auth.is_some())
            .field("execute", &self.execute.is_some())
            .field("after_response", &self.after_response.is_some())
            .finish()
    }
}

/// Parameters of a call together with its expected outcome.
#[derive(Debug, Default)]
pub struct JsonCallParams {
    /// The request to make
    pub request: DoRequestParams,
    /// What the call must produce
    pub expect: Expectations,
}

impl JsonCallParams {
    /// Expects `expect` from `request`.
    #[must_use]
    pub const fn new(request: DoRequestParams, expect: Expectations) -> Self {
        Self { request, expect }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let params = DoRequestParams::default();
        assert_eq!(params.method(), HttpMethod::Get);
        assert_eq!(params.describe(), "GET /");
    }

    #[test]
    fn test_describe() {
        let params = DoRequestParams {
            method: Some(HttpMethod::Post),
            url: "/my/url".to_string(),
            ..Default::default()
        };
        assert_eq!(params.describe(), "POST /my/url");
    }

    #[test]
    fn test_debug_hides_closures() {
        let params = DoRequestParams {
            after_response: Some(response_hook(|response| response.status = 418)),
            ..DoRequestParams::new("/")
        };
        let rendered = format!("{params:?}");
        assert!(rendered.contains("after_response: true"));
        assert!(rendered.contains("execute: false"));
    }
}
