use std::future::{Future, ready};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use tracing::warn;

use crate::RequestError;

/// Receives the raw response, whatever its status.
///
/// Use it when the handler does its own decoding.
pub trait RequestHandler: Send {
    /// Called with the buffered response.
    fn handle_request(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
        content: Bytes,
    ) -> impl Future<Output = ()> + Send;

    /// Called when no response was obtained. Logs the error by default.
    fn handle_exception(&mut self, error: RequestError) -> impl Future<Output = ()> + Send {
        warn!(%error, "request failed without response");
        ready(())
    }

    /// Releases the handler's resources, called once when the dispatch handler is disposed.
    fn close(&mut self) {}
}

/// Receives a successful body deserialized into `T`.
///
/// Every other outcome (error status, empty or malformed body, transport failure) goes to
/// [`handle_exception`](Self::handle_exception).
///
/// ```rust
/// use courier_core::{BodyHandler, RequestError};
/// use http::{HeaderMap, StatusCode};
///
/// #[derive(serde::Deserialize)]
/// struct Forecast {
///     summary: String,
/// }
///
/// #[derive(Default)]
/// struct LatestForecast {
///     summary: Option<String>,
/// }
///
/// impl BodyHandler<Forecast> for LatestForecast {
///     async fn handle_body(&mut self, _status: StatusCode, _headers: &HeaderMap, content: Forecast) {
///         self.summary = Some(content.summary);
///     }
///
///     async fn handle_exception(&mut self, _error: RequestError) {
///         self.summary = None;
///     }
/// }
/// ```
pub trait BodyHandler<T>: Send {
    /// Called with the deserialized body of a successful response.
    fn handle_body(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
        content: T,
    ) -> impl Future<Output = ()> + Send;

    /// Called for any outcome that did not produce a value.
    fn handle_exception(&mut self, error: RequestError) -> impl Future<Output = ()> + Send;

    /// Releases the handler's resources, called once when the dispatch handler is disposed.
    fn close(&mut self) {}
}

/// Receives a successful body as `T`, or an error body as `E`.
///
/// A body that fails to deserialize on either path goes to
/// [`handle_exception`](Self::handle_exception); `handle_body` and `handle_error` only ever
/// see complete values.
pub trait BodyOrErrorHandler<T, E>: Send {
    /// Called with the deserialized body of a successful response.
    fn handle_body(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
        content: T,
    ) -> impl Future<Output = ()> + Send;

    /// Called with the deserialized body of a non-success response.
    fn handle_error(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
        content: E,
    ) -> impl Future<Output = ()> + Send;

    /// Called when neither a value nor an error body could be produced.
    fn handle_exception(&mut self, error: RequestError) -> impl Future<Output = ()> + Send;

    /// Releases the handler's resources, called once when the dispatch handler is disposed.
    fn close(&mut self) {}
}
