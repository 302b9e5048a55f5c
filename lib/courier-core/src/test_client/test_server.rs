use std::future::{Future, ready};
use std::net::TcpListener;
use std::time::Duration;

use crate::{Authentication, HttpClient};

/// A server started by [`TestClient`](super::TestClient) for the duration of a test.
///
/// # Example
///
/// ```rust,no_run
/// use std::net::TcpListener;
///
/// use courier_core::HttpClient;
/// use courier_core::test_client::{HealthStatus, TestServer};
///
/// #[derive(Debug)]
/// struct WeatherServer;
///
/// impl TestServer for WeatherServer {
///     type Error = std::io::Error;
///
///     async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
///         listener.set_nonblocking(true)?;
///         let listener = tokio::net::TcpListener::from_std(listener)?;
///         // serve the application on `listener`
///         # drop(listener);
///         Ok(())
///     }
///
///     async fn is_healthy(&self, client: &HttpClient) -> Result<HealthStatus, Self::Error> {
///         let response = client.get("/health").await;
///         Ok(if response.is_success() {
///             HealthStatus::Healthy
///         } else {
///             HealthStatus::Unhealthy
///         })
///     }
/// }
/// ```
pub trait TestServer {
    /// Error raised by the server.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serves on `listener` until the test client is dropped.
    fn launch(&self, listener: TcpListener) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Reports whether the server is ready to receive requests.
    ///
    /// Defaults to [`HealthStatus::Uncheckable`]: the server is considered ready as soon as
    /// a TCP connection succeeds.
    fn is_healthy(
        &self,
        _client: &HttpClient,
    ) -> impl Future<Output = Result<HealthStatus, Self::Error>> + Send {
        ready(Ok(HealthStatus::Uncheckable))
    }

    /// Configuration of the client and of the health check.
    fn config(&self) -> TestServerConfig {
        TestServerConfig::default()
    }
}

/// Answer of [`TestServer::is_healthy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Ready.
    Healthy,
    /// Not ready yet, checked again after a backoff delay.
    Unhealthy,
    /// No health check, fall back to a TCP connection.
    Uncheckable,
}

/// Configuration of a [`TestClient`](super::TestClient).
#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// Base route of the client, e.g. `"api"`.
    pub base_route: String,

    /// Authentication sent with every request.
    pub authentication: Option<Authentication>,

    /// Delay before the first health check retry.
    pub min_backoff_delay: Duration,

    /// Upper bound of the delay between health checks.
    pub max_backoff_delay: Duration,

    /// Randomizes the delays between health checks.
    pub backoff_jitter: bool,

    /// Health checks attempted before giving up.
    pub max_retry_attempts: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            base_route: String::new(),
            authentication: None,
            min_backoff_delay: Duration::from_millis(10),
            max_backoff_delay: Duration::from_secs(1),
            backoff_jitter: true,
            max_retry_attempts: 10,
        }
    }
}
