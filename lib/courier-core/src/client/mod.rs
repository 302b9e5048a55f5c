use std::sync::Arc;

use headers::HeaderMapExt;
use http::{HeaderMap, Method};
use tracing::debug;
use url::Url;

mod auth;
pub use self::auth::{Authentication, AuthenticationError, DEFAULT_API_KEY_HEADER, SecureString};

mod body;
pub use self::body::RequestBody;

mod builder;
pub use self::builder::{
    AuthorizationStage, CanAddHeaders, CanAuthorize, CanBuild, CanSelectTransport, ClientBuilder,
    HeaderStage, HostStage, OptionsStage, RouteStage,
};

mod call;
pub use self::call::RequestCall;

pub mod dispatch;

mod error;
pub use self::error::ClientBuildError;

pub mod response;
use self::response::{RequestError, TransportOutcome};

mod scheme;
pub use self::scheme::HttpScheme;

pub mod transport;
use self::transport::{BoxFuture, Transport, TransportRequest};

/// An immutable, cheaply cloneable HTTP client.
///
/// Built once with [`HttpClient::builder`]; every request path is relative to
/// [`base_url`](Self::base_url), and the default headers (authentication included) are
/// sent with every request.
///
/// ```rust,no_run
/// use courier_core::{HttpClient, HttpScheme};
/// # #[derive(serde::Deserialize)]
/// # struct Forecast { summary: String }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::builder()
///     .with_host("localhost", HttpScheme::Http, Some(5000))
///     .with_base_route("api")
///     .build()?;
///
/// let forecast = client.get("/weatherforecast").as_json::<Vec<Forecast>>().await;
/// if let Some(forecasts) = forecast.value() {
///     println!("{} forecasts", forecasts.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    authentication: Option<Authentication>,
    default_headers: HeaderMap,
}

impl HttpClient {
    /// Starts a [`ClientBuilder`].
    pub fn builder() -> ClientBuilder<HostStage> {
        ClientBuilder::create()
    }

    /// The URL request paths are resolved against, always ending with `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured authentication, if any.
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Headers sent with every request, authentication included.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Starts a request with an arbitrary method.
    pub fn call(&self, method: Method, route: impl Into<String>) -> RequestCall {
        RequestCall::new(self.clone(), method, route.into())
    }

    /// Starts a `GET` request.
    pub fn get(&self, route: impl Into<String>) -> RequestCall {
        self.call(Method::GET, route)
    }

    /// Starts a `POST` request.
    pub fn post(&self, route: impl Into<String>) -> RequestCall {
        self.call(Method::POST, route)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, route: impl Into<String>) -> RequestCall {
        self.call(Method::PUT, route)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, route: impl Into<String>) -> RequestCall {
        self.call(Method::DELETE, route)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, route: impl Into<String>) -> RequestCall {
        self.call(Method::PATCH, route)
    }

    pub(crate) fn build_url(&self, route: &str) -> Result<Url, RequestError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            normalize_route(route)
        );
        url.parse::<Url>()
            .map_err(|err| RequestError::InvalidArgument {
                message: format!("invalid route '{route}': {err}"),
            })
    }

    pub(crate) async fn execute(
        &self,
        method: Method,
        route: &str,
        headers: HeaderMap,
        body: Option<RequestBody>,
        cancellation: Option<BoxFuture<'static, ()>>,
    ) -> TransportOutcome {
        let url = self.build_url(route)?;

        let mut request_headers = self.default_headers.clone();
        // replaces every default value of a given name, keeps repeated values
        request_headers.extend(headers);

        let body = if sends_body(&method) {
            body
        } else {
            if body.is_some() {
                debug!(%method, route, "ignoring request body");
            }
            None
        };
        if let Some(body) = &body {
            request_headers.typed_insert(body.content_type.clone());
        }

        let request = TransportRequest {
            method,
            url,
            headers: request_headers,
            body,
        };
        debug!(?request, "sending...");

        let call = self.transport.execute(request);
        let response = match cancellation {
            None => call.await?,
            Some(signal) => tokio::select! {
                response = call => response?,
                () = signal => {
                    debug!(route, "request cancelled");
                    return Err(RequestError::Cancelled);
                }
            },
        };
        debug!(status = %response.status(), route, "...received");

        Ok(response)
    }
}

/// Strips the leading `/` of a route: routes are relative to the base URL.
fn normalize_route(route: &str) -> &str {
    route.strip_prefix('/').unwrap_or(route)
}

fn sends_body(method: &Method) -> bool {
    ![Method::GET, Method::HEAD, Method::DELETE].contains(method)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::client::transport::{TransportError, TransportResponse};

    /// In-memory transport replaying canned responses and recording requests.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct MockTransport {
        responses: Arc<Mutex<VecDeque<Result<TransportResponse, String>>>>,
        requests: Arc<Mutex<Vec<TransportRequest>>>,
    }

    impl MockTransport {
        pub(crate) fn respond(&self, status: StatusCode, body: &'static str) -> &Self {
            self.responses
                .lock()
                .expect("not poisoned")
                .push_back(Ok(TransportResponse::new(
                    status,
                    HeaderMap::new(),
                    Bytes::from_static(body.as_bytes()),
                )));
            self
        }

        pub(crate) fn fail(&self, message: &str) -> &Self {
            self.responses
                .lock()
                .expect("not poisoned")
                .push_back(Err(message.to_string()));
            self
        }

        pub(crate) fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().expect("not poisoned").clone()
        }

        pub(crate) fn client(&self) -> HttpClient {
            HttpClient::builder()
                .with_host("localhost", crate::HttpScheme::Http, Some(5000))
                .with_base_route("api")
                .with_transport(self.clone())
                .build()
                .expect("valid client")
        }
    }

    /// Transport whose requests never complete.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct HangingTransport;

    impl Transport for HangingTransport {
        fn execute(
            &self,
            _request: TransportRequest,
        ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
            Box::pin(std::future::pending())
        }
    }

    impl Transport for MockTransport {
        fn execute(
            &self,
            request: TransportRequest,
        ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
            self.requests.lock().expect("not poisoned").push(request);
            let next = self
                .responses
                .lock()
                .expect("not poisoned")
                .pop_front()
                .unwrap_or_else(|| Err("no response configured".to_string()));
            Box::pin(async move { next.map_err(TransportError::other) })
        }
    }
}
