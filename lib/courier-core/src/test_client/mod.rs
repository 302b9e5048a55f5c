//! Run a server in the background of a test and talk to it with an [`HttpClient`].
//!
//! [`TestClient::start`] binds a random local port, launches the [`TestServer`] on it,
//! builds a client pointing at it and waits until the server is healthy. The server task
//! is aborted when the test client is dropped.
//!
//! ```rust,no_run
//! # use std::net::TcpListener;
//! use courier_core::test_client::{TestClient, TestServer};
//!
//! # #[derive(Debug)]
//! # struct WeatherServer;
//! # impl TestServer for WeatherServer {
//! #     type Error = std::io::Error;
//! #     async fn launch(&self, _listener: TcpListener) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TestClient::start(WeatherServer).await?;
//!
//! let response = client.get("/weatherforecast").await;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, error};

use crate::{HttpClient, HttpScheme};

mod error;
pub use self::error::TestAppError;

mod test_server;
pub use self::test_server::{HealthStatus, TestServer, TestServerConfig};

/// An [`HttpClient`] bound to a running [`TestServer`].
///
/// Dereferences to the client.
#[derive(Debug, derive_more::Deref, derive_more::DerefMut)]
pub struct TestClient<T> {
    local_addr: SocketAddr,
    #[deref]
    #[deref_mut]
    client: HttpClient,
    handle: Option<tokio::task::JoinHandle<()>>,
    test_server: Arc<T>,
}

impl<T> TestClient<T>
where
    T: TestServer + Send + Sync + 'static,
{
    /// Launches `test_server` on a random local port and waits until it is healthy.
    ///
    /// # Errors
    ///
    /// Fails if no port can be bound, if the client cannot be built, or if the server does
    /// not become healthy within the configured retries.
    pub async fn start(test_server: T) -> Result<Self, TestAppError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;

        let test_server = Arc::new(test_server);
        let handle = tokio::spawn({
            let server = Arc::clone(&test_server);
            async move {
                if let Err(error) = server.launch(listener).await {
                    error!(%error, "server launch failed");
                }
            }
        });

        let config = test_server.config();
        let builder = HttpClient::builder()
            .with_host(
                local_addr.ip().to_string(),
                HttpScheme::Http,
                Some(local_addr.port()),
            )
            .with_base_route(&config.base_route);
        let client = match config.authentication.clone() {
            Some(authentication) => builder.with_authentication(authentication).build()?,
            None => builder.build()?,
        };

        let mut result = Self {
            local_addr,
            client,
            handle: Some(handle),
            test_server,
        };
        if !result.wait_for_health(&config).await {
            if let Some(handle) = result.handle.take() {
                handle.abort();
            }
            return Err(TestAppError::UnhealthyServer {
                timeout: config.max_backoff_delay,
            });
        }

        Ok(result)
    }

    /// The address the server listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The running server.
    pub fn server(&self) -> &T {
        &self.test_server
    }

    async fn wait_for_health(&self, config: &TestServerConfig) -> bool {
        let mut backoff = ExponentialBuilder::default()
            .with_min_delay(config.min_backoff_delay)
            .with_max_delay(config.max_backoff_delay)
            .with_max_times(config.max_retry_attempts);
        if config.backoff_jitter {
            backoff = backoff.with_jitter();
        }

        let local_addr = self.local_addr;
        let server = &self.test_server;
        let client = &self.client;
        let health_check = move || async move {
            match server.is_healthy(client).await {
                Ok(HealthStatus::Healthy) => {
                    debug!("server healthy");
                    Ok(true)
                }
                Ok(HealthStatus::Unhealthy) => {
                    debug!("server not yet healthy, retrying");
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "server not healthy yet",
                    ))
                }
                Ok(HealthStatus::Uncheckable) => {
                    tokio::net::TcpStream::connect(local_addr)
                        .await
                        .inspect_err(|error| {
                            debug!(%error, %local_addr, "server not listening yet");
                        })?;
                    Ok(true)
                }
                Err(error) => {
                    error!(%error, "health check failed");
                    Ok(false)
                }
            }
        };

        health_check.retry(backoff).await.unwrap_or(false)
    }
}

impl<T> Drop for TestClient<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
