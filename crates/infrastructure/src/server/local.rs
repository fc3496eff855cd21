//! Ephemeral local server hosting a handler under test.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use callcheck_application::UsageError;

/// Grace period used when none is configured.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A router served on `127.0.0.1` at an OS-assigned port.
///
/// [`shutdown`](Self::shutdown) stops the server gracefully. Dropping the
/// server without calling it (early return, panic) aborts the server task,
/// which releases the listener.
#[derive(Debug)]
pub struct LocalServer {
    addr: SocketAddr,
    base_url: Url,
    grace: Duration,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LocalServer {
    /// Starts serving `router`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(router: Router) -> Result<Self, UsageError> {
        Self::start_with_grace(router, DEFAULT_SHUTDOWN_GRACE).await
    }

    /// Starts serving `router`, allowing `grace` for a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start_with_grace(router: Router, grace: Duration) -> Result<Self, UsageError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| UsageError::ServerStart(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| UsageError::ServerStart(e.to_string()))?;
        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| UsageError::ServerStart(e.to_string()))?;

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    // A dropped sender also means stop.
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!(%addr, error = %e, "local server failed");
            }
        });

        debug!(%addr, "local server listening");

        Ok(Self {
            addr,
            base_url,
            grace,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the server origin without a trailing slash, e.g.
    /// `http://127.0.0.1:41234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the server origin as a URL that relative paths resolve
    /// against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stops accepting connections and waits for in-flight ones, up to the
    /// grace period; the task is aborted after that.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        let Some(task) = self.task.take() else {
            return;
        };
        let abort = task.abort_handle();
        match tokio::time::timeout(self.grace, task).await {
            Ok(_) => debug!(addr = %self.addr, "local server stopped"),
            Err(_) => {
                warn!(
                    addr = %self.addr,
                    grace_ms = self.grace.as_millis(),
                    "local server did not stop in time, aborting"
                );
                abort.abort();
            }
        }
    }
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(addr = %self.addr, "local server dropped, aborting");
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use pretty_assertions::assert_eq;

    fn hello() -> Router {
        Router::new().route("/", get(|| async { "hello" }))
    }

    #[tokio::test]
    async fn test_serves_and_shuts_down() {
        let server = LocalServer::start(hello()).await.unwrap();
        let addr = server.addr();
        assert_eq!(server.url(), format!("http://{addr}"));
        assert_eq!(server.base_url().as_str(), format!("http://{addr}/"));

        let body = reqwest::get(server.url()).await.unwrap().text().await.unwrap();
        assert_eq!(body, "hello");

        server.shutdown().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_drop_releases_listener() {
        let server = LocalServer::start(hello()).await.unwrap();
        let addr = server.addr();
        drop(server);

        // The aborted task drops the listener once the runtime polls it.
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(addr).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("listener on {addr} still accepting after drop");
    }
}
