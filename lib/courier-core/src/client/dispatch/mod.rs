//! Reusable request/response bindings.
//!
//! A [`DispatchHandler`] binds an HTTP method and a path to a handler. Each call to
//! [`dispatch`](DispatchHandler::dispatch) sends one request and routes its outcome to
//! the handler:
//!
//! | Binding | Handler contract | Success | Failure |
//! |---|---|---|---|
//! | [`bind::raw`] | [`RequestHandler`] | `handle_request` with the raw body, any status | `handle_exception` |
//! | [`bind::body`] | [`BodyHandler<T>`] | `handle_body` | `handle_exception` |
//! | [`bind::body_or_error`] | [`BodyOrErrorHandler<T, E>`] | `handle_body` / `handle_error` | `handle_exception` |
//! | [`bind::callback`] | closure | called with the raw response | logged |
//!
//! The handler is owned by the dispatch handler and closed exactly once, on
//! [`dispose`](DispatchHandler::dispose) or drop.

use std::fmt;
use std::future::Future;

use http::{HeaderMap, Method};
use tracing::trace;

use super::transport::BoxFuture;
use super::{HttpClient, RequestBody};

pub mod bind;
pub use self::bind::HandlerBinding;

mod contracts;
pub use self::contracts::{BodyHandler, BodyOrErrorHandler, RequestHandler};

/// Lifecycle of a [`DispatchHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    /// Never dispatched.
    Created,
    /// A request is in flight.
    Dispatching,
    /// The last dispatch completed.
    Idle,
    /// Disposed, the handler is closed.
    Disposed,
}

/// Error returned by [`DispatchHandler::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum DispatchError {
    /// The dispatch handler was disposed.
    #[display("dispatch handler for '{path}' used after disposal")]
    Disposed {
        /// The bound path.
        path: String,
    },
}

/// A method, a path and a handler, ready to be dispatched repeatedly.
///
/// Created by [`HttpClient::create_handler`] and its per-method shortcuts.
///
/// ```rust,no_run
/// use courier_core::{BodyHandler, HttpClient, RequestError, bind};
/// use http::{HeaderMap, StatusCode};
///
/// #[derive(serde::Deserialize)]
/// struct Forecast {
///     summary: String,
/// }
///
/// struct PrintForecast;
///
/// impl BodyHandler<Forecast> for PrintForecast {
///     async fn handle_body(&mut self, _: StatusCode, _: &HeaderMap, forecast: Forecast) {
///         println!("{}", forecast.summary);
///     }
///
///     async fn handle_exception(&mut self, error: RequestError) {
///         eprintln!("{error}");
///     }
/// }
///
/// # async fn example(client: HttpClient) -> Result<(), courier_core::DispatchError> {
/// let mut handler = client.create_get_handler("/api", bind::body::<Forecast, _>(PrintForecast));
/// handler.dispatch(None).await?;
/// handler.dispatch(None).await?;
/// handler.dispose();
/// # Ok(())
/// # }
/// ```
pub struct DispatchHandler<B>
where
    B: HandlerBinding,
{
    client: HttpClient,
    method: Method,
    path: String,
    binding: B,
    state: DispatchState,
}

impl<B> DispatchHandler<B>
where
    B: HandlerBinding,
{
    /// The bound path, as given at creation.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The bound method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The current lifecycle state.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Sends one request and routes its outcome to the handler.
    ///
    /// `GET` and `DELETE` handlers ignore the body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Disposed`] once the handler has been disposed. Request
    /// failures are not errors: they reach the handler's exception path.
    pub async fn dispatch(&mut self, body: Option<RequestBody>) -> Result<(), DispatchError> {
        self.run(body, None).await
    }

    /// Like [`dispatch`](Self::dispatch), abandoning the request when `signal` completes
    /// first. The handler then receives [`RequestError::Cancelled`](crate::RequestError::Cancelled).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Disposed`] once the handler has been disposed.
    pub async fn dispatch_with_cancellation(
        &mut self,
        body: Option<RequestBody>,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), DispatchError> {
        self.run(body, Some(Box::pin(signal))).await
    }

    /// Closes the handler. Later calls, and dropping the dispatch handler, do nothing more.
    pub fn dispose(&mut self) {
        if self.state != DispatchState::Disposed {
            self.transition(DispatchState::Disposed);
            self.binding.close();
        }
    }

    async fn run(
        &mut self,
        body: Option<RequestBody>,
        cancellation: Option<BoxFuture<'static, ()>>,
    ) -> Result<(), DispatchError> {
        if self.state == DispatchState::Disposed {
            return Err(DispatchError::Disposed {
                path: self.path.clone(),
            });
        }

        self.transition(DispatchState::Dispatching);
        // back to idle when the dispatch completes or its future is dropped
        let _in_flight = InFlight {
            method: &self.method,
            path: &self.path,
            state: &mut self.state,
        };
        let outcome = self
            .client
            .execute(
                self.method.clone(),
                &self.path,
                HeaderMap::new(),
                body,
                cancellation,
            )
            .await;
        self.binding.deliver(outcome).await;

        Ok(())
    }

    fn transition(&mut self, state: DispatchState) {
        trace_transition(&self.method, &self.path, self.state, state);
        self.state = state;
    }
}

struct InFlight<'a> {
    method: &'a Method,
    path: &'a str,
    state: &'a mut DispatchState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.state == DispatchState::Dispatching {
            trace_transition(self.method, self.path, *self.state, DispatchState::Idle);
            *self.state = DispatchState::Idle;
        }
    }
}

fn trace_transition(method: &Method, path: &str, from: DispatchState, to: DispatchState) {
    trace!(%method, path, ?from, ?to, "dispatch handler");
}

impl<B> fmt::Debug for DispatchHandler<B>
where
    B: HandlerBinding,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandler")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B> Drop for DispatchHandler<B>
where
    B: HandlerBinding,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl HttpClient {
    /// Binds `method` and `path` to a handler.
    pub fn create_handler<B>(
        &self,
        method: Method,
        path: impl Into<String>,
        binding: B,
    ) -> DispatchHandler<B>
    where
        B: HandlerBinding,
    {
        DispatchHandler {
            client: self.clone(),
            method,
            path: path.into(),
            binding,
            state: DispatchState::Created,
        }
    }

    /// Binds a `GET` request on `path` to a handler.
    pub fn create_get_handler<B>(&self, path: impl Into<String>, binding: B) -> DispatchHandler<B>
    where
        B: HandlerBinding,
    {
        self.create_handler(Method::GET, path, binding)
    }

    /// Binds a `POST` request on `path` to a handler.
    pub fn create_post_handler<B>(&self, path: impl Into<String>, binding: B) -> DispatchHandler<B>
    where
        B: HandlerBinding,
    {
        self.create_handler(Method::POST, path, binding)
    }

    /// Binds a `PUT` request on `path` to a handler.
    pub fn create_put_handler<B>(&self, path: impl Into<String>, binding: B) -> DispatchHandler<B>
    where
        B: HandlerBinding,
    {
        self.create_handler(Method::PUT, path, binding)
    }

    /// Binds a `DELETE` request on `path` to a handler.
    pub fn create_delete_handler<B>(
        &self,
        path: impl Into<String>,
        binding: B,
    ) -> DispatchHandler<B>
    where
        B: HandlerBinding,
    {
        self.create_handler(Method::DELETE, path, binding)
    }
}
