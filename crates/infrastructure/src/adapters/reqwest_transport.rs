//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port using the reqwest library.
//! It is the default way a harness sends requests.

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Method, RequestBuilder};
use tracing::debug;

use callcheck_application::ports::{HttpTransport, TransportFuture};
use callcheck_application::TransportError;
use callcheck_domain::{CallResponse, HeaderSet, HttpMethod, PreparedRequest, RequestBody};

use crate::config::ClientConfig;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: Option<u64>,
    max_redirects: usize,
}

impl ReqwestTransport {
    /// Creates a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: config.timeout_ms(),
            max_redirects: config.max_redirects,
        })
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        let config = ClientConfig::default();
        Self {
            client,
            timeout_ms: config.timeout_ms(),
            max_redirects: config.max_redirects,
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Attaches the body. Streams with a declared length carry an explicit
    /// `Content-Length` so they are not sent chunked.
    fn build_body(builder: RequestBuilder, body: RequestBody) -> RequestBuilder {
        match body {
            RequestBody::Empty => builder,
            RequestBody::Fixed(bytes) => builder.body(bytes),
            RequestBody::Streamed { stream, len } => {
                let builder = match len {
                    Some(len) => builder.header(CONTENT_LENGTH, len),
                    None => builder,
                };
                builder.body(Body::wrap_stream(stream))
            }
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: self.timeout_ms.unwrap_or_default(),
            };
        }

        if error.is_connect() {
            let message = error_chain(error);
            if message.to_lowercase().contains("refused") {
                return TransportError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(|u| u.host_str().map(ToString::to_string))
                        .unwrap_or_else(|| "unknown".to_string()),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects {
                max: self.max_redirects,
            };
        }

        TransportError::Other(error_chain(error))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let PreparedRequest {
                method,
                url,
                headers,
                body,
            } = request;

            debug!(%method, %url, "sending request");

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url.clone());
            for (name, values) in headers.iter() {
                for value in values {
                    builder = builder.header(name, value.as_str());
                }
            }
            builder = Self::build_body(builder, body);

            let response = builder.send().await.map_err(|e| self.map_error(&e))?;

            let status = response.status().as_u16();
            let response_headers: HeaderSet = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(error_chain(&e)))?;

            Ok(CallResponse::new(
                status,
                response_headers,
                body,
                method,
                url,
            ))
        })
    }
}

/// Renders an error with its sources, so messages keep the root cause.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_streamed_body_gets_content_length() {
        let client = Client::new();
        let chunks = futures::stream::iter(vec![Ok(bytes::Bytes::from_static(b"hello"))]);
        let builder = ReqwestTransport::build_body(
            client.post("http://127.0.0.1/"),
            RequestBody::stream(chunks, Some(5)),
        );
        let request = builder.build().unwrap();
        assert_eq!(
            request
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok()),
            Some("5")
        );
    }

    #[test]
    fn test_fixed_body_is_sent_as_is() {
        let client = Client::new();
        let builder = ReqwestTransport::build_body(
            client.post("http://127.0.0.1/"),
            RequestBody::from("hello, world"),
        );
        let request = builder.build().unwrap();
        assert_eq!(
            request.body().and_then(reqwest::Body::as_bytes),
            Some(&b"hello, world"[..])
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::default();
        let request = PreparedRequest::get(&format!("http://{addr}/")).unwrap();
        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConnectionRefused { .. } | TransportError::ConnectionFailed(_)
        ));
    }
}
