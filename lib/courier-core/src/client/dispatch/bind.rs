//! Adapters selecting which handler contract a [`DispatchHandler`](super::DispatchHandler)
//! drives.
//!
//! A handler type may implement several contracts; the binding makes the choice explicit
//! at the call site:
//!
//! ```rust,ignore
//! client.create_get_handler("weatherforecast", bind::body::<Vec<Forecast>, _>(handler));
//! ```

use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{BodyHandler, BodyOrErrorHandler, RequestHandler};
use crate::client::response::{Response, ResponseWithError, TransportOutcome};

/// Routes a transport outcome to a handler.
pub trait HandlerBinding: Send {
    /// Converts the outcome and calls the matching handler method.
    fn deliver(&mut self, outcome: TransportOutcome) -> impl Future<Output = ()> + Send;

    /// Closes the bound handler.
    fn close(&mut self);
}

/// Binding for a [`RequestHandler`].
#[derive(Debug)]
pub struct RawBinding<H> {
    handler: H,
}

/// Binding for a [`BodyHandler`].
#[derive(Debug)]
pub struct BodyBinding<T, H> {
    handler: H,
    body: PhantomData<fn() -> T>,
}

/// Binding for a [`BodyOrErrorHandler`].
#[derive(Debug)]
pub struct BodyOrErrorBinding<T, E, H> {
    handler: H,
    body: PhantomData<fn() -> (T, E)>,
}

/// Binding for a closure receiving the raw response.
#[derive(Debug)]
pub struct CallbackBinding<F> {
    callback: F,
}

/// Binds a handler receiving the raw response.
pub fn raw<H>(handler: H) -> RawBinding<H>
where
    H: RequestHandler,
{
    RawBinding { handler }
}

/// Binds a handler receiving the body deserialized into `T`.
pub fn body<T, H>(handler: H) -> BodyBinding<T, H>
where
    H: BodyHandler<T>,
{
    BodyBinding {
        handler,
        body: PhantomData,
    }
}

/// Binds a handler receiving the body as `T` on success and as `E` otherwise.
pub fn body_or_error<T, E, H>(handler: H) -> BodyOrErrorBinding<T, E, H>
where
    H: BodyOrErrorHandler<T, E>,
{
    BodyOrErrorBinding {
        handler,
        body: PhantomData,
    }
}

/// Binds a closure called with the raw response.
///
/// A closure has no exception path: when no response is obtained, the failure is logged
/// and the closure is not called.
pub fn callback<F, Fut>(callback: F) -> CallbackBinding<F>
where
    F: FnMut(StatusCode, HeaderMap, Bytes) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    CallbackBinding { callback }
}

impl<H> HandlerBinding for RawBinding<H>
where
    H: RequestHandler,
{
    fn deliver(&mut self, outcome: TransportOutcome) -> impl Future<Output = ()> + Send {
        async move {
            match outcome {
                Ok(response) => {
                    let (status, headers, content) = response.into_parts();
                    self.handler
                        .handle_request(status, &headers, content)
                        .await;
                }
                Err(error) => self.handler.handle_exception(error).await,
            }
        }
    }

    fn close(&mut self) {
        self.handler.close();
    }
}

impl<T, H> HandlerBinding for BodyBinding<T, H>
where
    T: DeserializeOwned + Send,
    H: BodyHandler<T>,
{
    fn deliver(&mut self, outcome: TransportOutcome) -> impl Future<Output = ()> + Send {
        async move {
            match Response::<T>::from_json(outcome) {
                Response::Success {
                    status,
                    headers,
                    value,
                } => self.handler.handle_body(status, &headers, value).await,
                Response::HttpStatusError { error, .. } | Response::Exception { error } => {
                    self.handler.handle_exception(error).await;
                }
            }
        }
    }

    fn close(&mut self) {
        self.handler.close();
    }
}

impl<T, E, H> HandlerBinding for BodyOrErrorBinding<T, E, H>
where
    T: DeserializeOwned + Send,
    E: DeserializeOwned + Send,
    H: BodyOrErrorHandler<T, E>,
{
    fn deliver(&mut self, outcome: TransportOutcome) -> impl Future<Output = ()> + Send {
        async move {
            match ResponseWithError::<T, E>::from_json(outcome) {
                ResponseWithError::Success {
                    status,
                    headers,
                    value,
                } => self.handler.handle_body(status, &headers, value).await,
                ResponseWithError::HttpStatusError {
                    status,
                    headers,
                    error_value,
                } => self.handler.handle_error(status, &headers, error_value).await,
                ResponseWithError::Exception { error } => {
                    self.handler.handle_exception(error).await;
                }
            }
        }
    }

    fn close(&mut self) {
        self.handler.close();
    }
}

impl<F, Fut> HandlerBinding for CallbackBinding<F>
where
    F: FnMut(StatusCode, HeaderMap, Bytes) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    fn deliver(&mut self, outcome: TransportOutcome) -> impl Future<Output = ()> + Send {
        let call = match outcome {
            Ok(response) => {
                let (status, headers, content) = response.into_parts();
                Some((self.callback)(status, headers, content))
            }
            Err(error) => {
                warn!(%error, "request failed without response, callback skipped");
                None
            }
        };

        async move {
            if let Some(call) = call {
                call.await;
            }
        }
    }

    fn close(&mut self) {}
}
