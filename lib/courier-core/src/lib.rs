//! # Courier Core
//!
//! A typed HTTP client where every request resolves into a three-state [`Response`]:
//! success, HTTP status error, or exception. Failures are values, never panics or
//! `Result`s to unwrap, and combinators validate or observe them along the way.
//!
//! - **[`HttpClient`]**: immutable client configured once with a staged [`ClientBuilder`];
//! - **[`RequestCall`]**: one request, sent as JSON, raw or status-only;
//! - **[`Response`] / [`ResponseWithError`]**: the outcome, with `ensure*` and `handle*`
//!   combinators, sync and async ([`ResponseFutureExt`]);
//! - **[`DispatchHandler`]**: a method, a path and a handler, dispatched repeatedly;
//! - **[`TestClient`](test_client::TestClient)**: runs a server for the duration of a test.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_core::{HttpClient, HttpScheme, ResponseFutureExt};
//! # use serde::Deserialize;
//! # #[derive(Debug, Deserialize)]
//! # #[serde(rename_all = "camelCase")]
//! # struct Forecast { temperature_c: i32 }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::builder()
//!     .with_host("localhost", HttpScheme::Http, Some(5000))
//!     .with_base_route("api")
//!     .with_bearer_token("my-token")
//!     .build()?;
//!
//! let response = client
//!     .get("/weatherforecast")
//!     .as_json::<Forecast>()
//!     .ensure_async(|forecast| forecast.temperature_c > -100)
//!     .handle_async(
//!         |status, _headers, forecast| {
//!             println!("{status}: {forecast:?}");
//!             Ok(())
//!         },
//!         |error| {
//!             eprintln!("failed: {error}");
//!             Ok(())
//!         },
//!     )
//!     .await;
//!
//! if let Some(error) = response.error() {
//!     println!("failed with {:?}", error.kind());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Dispatching to a handler
//!
//! ```rust,no_run
//! use courier_core::{HttpClient, RequestHandler, bind};
//! use bytes::Bytes;
//! use http::{HeaderMap, StatusCode};
//!
//! struct Logger;
//!
//! impl RequestHandler for Logger {
//!     async fn handle_request(&mut self, status: StatusCode, _: &HeaderMap, content: Bytes) {
//!         println!("{status}: {} bytes", content.len());
//!     }
//! }
//!
//! # async fn example(client: HttpClient) -> Result<(), courier_core::DispatchError> {
//! let mut handler = client.create_get_handler("/health", bind::raw(Logger));
//! handler.dispatch(None).await?;
//! # Ok(())
//! # }
//! ```

mod client;

pub mod test_client;

pub use self::client::dispatch::{
    BodyHandler, BodyOrErrorHandler, DispatchError, DispatchHandler, DispatchState,
    HandlerBinding, RequestHandler, bind,
};
pub use self::client::response::{
    EmptyResponse, ErrorKind, HandlerResult, RequestError, Response, ResponseFutureExt,
    ResponseState, ResponseWithError, ResponseWithErrorFutureExt, TransportOutcome,
};
pub use self::client::transport::{
    BoxError, BoxFuture, ReqwestTransport, SharedError, Transport, TransportError,
    TransportRequest, TransportResponse,
};
pub use self::client::{
    Authentication, AuthenticationError, AuthorizationStage, CanAddHeaders, CanAuthorize,
    CanBuild, CanSelectTransport, ClientBuildError, ClientBuilder, DEFAULT_API_KEY_HEADER,
    HeaderStage, HostStage, HttpClient, HttpScheme, OptionsStage, RequestBody, RequestCall,
    RouteStage, SecureString,
};
