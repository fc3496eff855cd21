//! The request/response harness.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use tracing::{debug, warn};

use callcheck_application::ports::HttpTransport;
use callcheck_application::{HarnessError, HarnessResult, TransportError, UsageError};
use callcheck_domain::request::{is_absolute_url, resolve_url};
use callcheck_domain::{CallReport, CallResponse, DomainError, HeaderSet, PreparedRequest, RewriteRule};

use super::params::{DoRequestParams, JsonCallParams};
use crate::adapters::{ReqwestTransport, UrlRewritingTransport};
use crate::config::ClientConfig;
use crate::server::{DEFAULT_SHUTDOWN_GRACE, LocalServer};
use crate::testing::ResponseVerifier;

/// Execution context for calls.
///
/// Holds the transport used when a call has no custom execution function.
/// Harnesses share nothing, so tests running in parallel each use their own.
#[derive(Clone)]
pub struct Harness {
    transport: Arc<dyn HttpTransport>,
    verifier: ResponseVerifier,
    shutdown_grace: Duration,
}

impl Default for Harness {
    /// Builds a harness configured from the `CALLCHECK_*` environment.
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("verifier", &self.verifier)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}

impl Harness {
    /// Creates a harness sending requests through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            verifier: ResponseVerifier::new(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Creates a harness whose default transport follows `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)).with_shutdown_grace(config.shutdown_grace))
    }

    /// Creates a harness configured through `lookup`, see
    /// [`ClientConfig::from_lookup`].
    ///
    /// Invalid settings are logged and replaced by the defaults, so a typo
    /// in the environment never stops a test run.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ClientConfig::from_lookup(lookup).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring invalid client configuration");
            ClientConfig::default()
        });
        Self::from_config(&config).unwrap_or_else(|e| {
            warn!(error = %e, "cannot build configured client, using defaults");
            Self::new(Arc::new(ReqwestTransport::default()))
        })
    }

    /// Routes requests matching `rule` elsewhere, keeping the caller-visible
    /// URL.
    #[must_use]
    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.transport = Arc::new(UrlRewritingTransport::new(rule, self.transport));
        self
    }

    /// Replaces the verifier.
    #[must_use]
    pub const fn with_verifier(mut self, verifier: ResponseVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Sets how long hosted handlers may drain when a call ends.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Returns the transport used for default execution.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Makes one request and returns the raw response. Nothing is asserted.
    ///
    /// A relative URL is served by a local server hosting the handler for
    /// the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns a usage error for malformed parameters, detected before any
    /// I/O, and a transport error if execution fails.
    pub async fn do_request(&self, params: DoRequestParams) -> HarnessResult<CallResponse> {
        validate_headers(&params.header)?;

        let hosted = !is_absolute_url(&params.url);
        let server = match (&params.handler, hosted) {
            (_, false) => None,
            (Some(handler), true) => Some(
                LocalServer::start_with_grace(handler.clone(), self.shutdown_grace).await?,
            ),
            (None, true) => {
                return Err(UsageError::RelativeUrlWithoutHandler(params.url).into());
            }
        };

        let result = self
            .execute(params, server.as_ref().map(LocalServer::base_url))
            .await;

        if let Some(server) = server {
            server.shutdown().await;
        }
        result
    }

    async fn execute(
        &self,
        params: DoRequestParams,
        base: Option<&url::Url>,
    ) -> HarnessResult<CallResponse> {
        let DoRequestParams {
            method,
            url,
            body,
            json_body,
            header,
            basic_auth,
            execute,
            after_response,
            ..
        } = params;

        let url = resolve_url(&url, base)?;
        let mut request = PreparedRequest::new(method.unwrap_or_default(), url);
        request = match json_body {
            Some(value) => request.with_json_body(&value),
            None => request.with_body(body.unwrap_or_default()),
        };
        request = request.with_headers(&header);
        if let Some(auth) = &basic_auth {
            request = request.with_basic_auth(auth);
        }

        debug!(
            method = %request.method,
            url = %request.url,
            content_length = ?request.content_length(),
            custom = execute.is_some(),
            "executing call"
        );

        let mut response = match &execute {
            Some(execute) => execute(request, self.transport()).await?,
            None => self.transport.execute(request).await?,
        };
        if let Some(hook) = &after_response {
            hook(&mut response);
        }
        Ok(response)
    }

    /// Makes a call and checks it against its expectations.
    ///
    /// Every failed check is recorded in the returned report; none stops
    /// the others. When an error is expected and execution fails with a
    /// matching message, no other check runs.
    ///
    /// # Errors
    ///
    /// Returns a usage error for malformed parameters or expectations.
    pub async fn check_json_call(&self, params: JsonCallParams) -> Result<CallReport, UsageError> {
        let JsonCallParams { request, expect } = params;

        let pattern = expect.error_pattern()?;
        self.verifier.check_expectation(&expect)?;
        let mut report = CallReport::new(request.describe());

        match self.do_request(request).await {
            Err(HarnessError::Usage(e)) => return Err(e),
            Err(HarnessError::Transport(error)) => {
                self.verifier
                    .verify_error(&mut report, &error, pattern.as_ref());
            }
            Ok(response) => match &pattern {
                Some(pattern) => self
                    .verifier
                    .unexpected_response(&mut report, &response, pattern),
                None => self.verifier.verify(&mut report, &response, &expect)?,
            },
        }

        Ok(report)
    }

    /// Makes a call and panics unless every check passes.
    ///
    /// # Panics
    ///
    /// Panics listing every failed check, or with a `usage error:` prefix
    /// if the call is malformed.
    #[allow(clippy::panic)]
    pub async fn assert_json_call(&self, params: JsonCallParams) -> CallReport {
        match self.check_json_call(params).await {
            Ok(report) => {
                report.assert_passed();
                report
            }
            Err(e) => panic!("usage error: {e}"),
        }
    }
}

/// Rejects headers the HTTP stack would refuse to send.
fn validate_headers(headers: &HeaderSet) -> Result<(), DomainError> {
    for (name, values) in headers.iter() {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(DomainError::InvalidHeaderName(name.to_string()));
        }
        if let Some(value) = values
            .iter()
            .find(|value| HeaderValue::from_str(value).is_err())
        {
            return Err(DomainError::InvalidHeaderValue {
                name: name.to_string(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// [`Harness::do_request`] on a fresh default harness.
///
/// # Errors
///
/// See [`Harness::do_request`].
pub async fn do_request(params: DoRequestParams) -> HarnessResult<CallResponse> {
    Harness::default().do_request(params).await
}

/// [`Harness::check_json_call`] on a fresh default harness.
///
/// # Errors
///
/// See [`Harness::check_json_call`].
pub async fn check_json_call(params: JsonCallParams) -> Result<CallReport, UsageError> {
    Harness::default().check_json_call(params).await
}

/// [`Harness::assert_json_call`] on a fresh default harness.
///
/// # Panics
///
/// See [`Harness::assert_json_call`].
pub async fn assert_json_call(params: JsonCallParams) -> CallReport {
    Harness::default().assert_json_call(params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_application::ports::TransportFuture;
    use callcheck_application::{ExpectedBody, Expectations};
    use callcheck_domain::HttpMethod;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that must never be reached.
    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl HttpTransport for CountingTransport {
        fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(CallResponse::new(
                    200,
                    HeaderSet::new(),
                    "",
                    request.method,
                    request.url,
                ))
            })
        }
    }

    #[tokio::test]
    async fn test_relative_url_without_handler_is_usage_error() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        let err = harness
            .do_request(DoRequestParams::new("/foo"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Usage(UsageError::RelativeUrlWithoutHandler(_))
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_header_is_usage_error() {
        let harness = Harness::new(Arc::new(CountingTransport::default()));
        let params = DoRequestParams {
            header: HeaderSet::new().with("X-Bad", ["a\r\nInjected: yes"]),
            ..DoRequestParams::new("http://127.0.0.1:1/")
        };

        let err = harness.do_request(params).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Usage(UsageError::Domain(DomainError::InvalidHeaderValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_control_bytes_in_header_are_usage_errors() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        for value in ["a\u{1}b", "a\u{7f}b", "a\u{1b}[0m"] {
            let err = harness
                .check_json_call(JsonCallParams::new(
                    DoRequestParams {
                        header: HeaderSet::new().with("X-Bad", [value]),
                        ..DoRequestParams::new("http://example.com/")
                    },
                    Expectations {
                        error: Some("builder.*".to_string()),
                        ..Default::default()
                    },
                ))
                .await
                .unwrap_err();
            assert!(
                matches!(err, UsageError::Domain(DomainError::InvalidHeaderValue { .. })),
                "{value:?}: {err}"
            );
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tab_in_header_value_is_sent() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        harness
            .do_request(DoRequestParams {
                header: HeaderSet::new().with("X-Spaced", ["a\tb"]),
                ..DoRequestParams::new("http://example.com/")
            })
            .await
            .unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_usage_error() {
        let harness = Harness::new(Arc::new(CountingTransport::default()));
        let err = harness
            .do_request(DoRequestParams {
                header: HeaderSet::new().with("Bad Name", ["x"]),
                ..DoRequestParams::new("http://example.com/")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Usage(UsageError::Domain(DomainError::InvalidHeaderName(_)))
        ));
    }

    #[tokio::test]
    async fn test_unencodable_expected_body_fails_before_io() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        for error in [None, Some("some error".to_string())] {
            let err = harness
                .check_json_call(JsonCallParams::new(
                    DoRequestParams::new("http://example.com/"),
                    Expectations {
                        body: Some(ExpectedBody::bson(serde_json::json!([1, 2]))),
                        error,
                        ..Default::default()
                    },
                ))
                .await
                .unwrap_err();
            assert!(err.to_string().starts_with("bad check: cannot marshal expected contents"), "{err}");
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_harness_reads_configuration() {
        let harness = Harness::from_lookup(|name| {
            (name == "CALLCHECK_SHUTDOWN_GRACE_MS").then(|| "250".to_string())
        });
        assert_eq!(harness.shutdown_grace, Duration::from_millis(250));

        let harness = Harness::from_lookup(|name| {
            (name == "CALLCHECK_SHUTDOWN_GRACE_MS").then(|| "soon".to_string())
        });
        assert_eq!(harness.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[tokio::test]
    async fn test_absolute_url_uses_transport() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        let response = harness
            .do_request(DoRequestParams {
                method: Some(HttpMethod::Delete),
                ..DoRequestParams::new("http://example.com/thing")
            })
            .await
            .unwrap();

        assert_eq!(response.request_method, HttpMethod::Delete);
        assert_eq!(response.request_url.as_str(), "http://example.com/thing");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_error_pattern_fails_before_io() {
        let transport = Arc::new(CountingTransport::default());
        let harness = Harness::new(transport.clone());

        let err = harness
            .check_json_call(JsonCallParams {
                request: DoRequestParams::new("http://example.com/"),
                expect: Expectations {
                    error: Some("(".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsageError::InvalidErrorPattern { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_response_when_error_expected_fails() {
        let harness = Harness::new(Arc::new(CountingTransport::default()));
        let report = harness
            .check_json_call(JsonCallParams {
                request: DoRequestParams::new("http://example.com/"),
                expect: Expectations {
                    error: Some("some error".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert!(!report.all_passed());
        assert_eq!(report.total(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "usage error: relative URL")]
    async fn test_assert_panics_on_usage_error() {
        let harness = Harness::new(Arc::new(CountingTransport::default()));
        harness
            .assert_json_call(JsonCallParams::new(
                DoRequestParams::new("/"),
                Expectations::default(),
            ))
            .await;
    }
}
