//! URL-rewriting transport.
//!
//! Lets tests address a stable, production-looking host while the traffic is
//! physically served by a local server. Responses still report the URL the
//! caller asked for.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use callcheck_application::TransportError;
use callcheck_application::ports::{HttpTransport, TransportFuture};
use callcheck_domain::{PreparedRequest, RewriteRule};

use super::ReqwestTransport;

/// Transport that rewrites a URL prefix before delegating.
#[derive(Clone)]
pub struct UrlRewritingTransport {
    rule: RewriteRule,
    inner: Arc<dyn HttpTransport>,
}

impl UrlRewritingTransport {
    /// Wraps `inner` with `rule`.
    #[must_use]
    pub fn new(rule: RewriteRule, inner: Arc<dyn HttpTransport>) -> Self {
        Self { rule, inner }
    }

    /// Wraps a fresh default transport with `rule`.
    #[must_use]
    pub fn with_default_transport(rule: RewriteRule) -> Self {
        Self::new(rule, Arc::new(ReqwestTransport::default()))
    }

    /// Returns the rewrite rule.
    #[must_use]
    pub const fn rule(&self) -> &RewriteRule {
        &self.rule
    }

    /// Replaces the wrapped transport.
    #[must_use]
    pub fn with_inner(mut self, inner: Arc<dyn HttpTransport>) -> Self {
        self.inner = inner;
        self
    }
}

impl std::fmt::Debug for UrlRewritingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlRewritingTransport")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

impl HttpTransport for UrlRewritingTransport {
    fn execute(&self, mut request: PreparedRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let original = request.url.clone();

            if let Some(rewritten) = self.rule.apply(original.as_str()) {
                let url = Url::parse(&rewritten)
                    .map_err(|e| TransportError::InvalidUrl(format!("{e}: {rewritten}")))?;
                debug!(from = %original, to = %url, "rewriting request URL");
                request.url = url;
            }

            let mut response = self.inner.execute(request).await?;
            response.request_url = original;
            Ok(response)
        })
    }
}
