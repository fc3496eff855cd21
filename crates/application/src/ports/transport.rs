//! HTTP transport port

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use callcheck_domain::{CallResponse, PreparedRequest};

use crate::error::TransportError;

/// Boxed future returned by transports.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CallResponse, TransportError>> + Send + 'a>>;

/// Port for executing prepared requests.
///
/// Implementations read the response body in full before resolving, so the
/// returned [`CallResponse`] is detached from the connection.
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails due to network issues,
    /// timeout, or other HTTP-related problems.
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
        (**self).execute(request)
    }
}
