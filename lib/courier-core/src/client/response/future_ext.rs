use std::future::Future;

use http::{HeaderMap, StatusCode};

use super::{HandlerResult, RequestError, Response, ResponseWithError};
use crate::client::transport::BoxFuture;

/// Combinators on a pending [`Response`]: the future is awaited, then the combinator runs.
///
/// ```rust,no_run
/// use courier_core::{HttpClient, HttpScheme, ResponseFutureExt};
/// # #[derive(serde::Deserialize)]
/// # struct Forecast { temperature_c: i32 }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::builder()
///     .with_host("weather.example.com", HttpScheme::Https, None)
///     .with_base_route("api")
///     .build()?;
///
/// let forecast = client
///     .get("weatherforecast")
///     .as_json::<Forecast>()
///     .ensure_async(|forecast| forecast.temperature_c > -90)
///     .handle_async(
///         |status, _, forecast| {
///             println!("{status}: {}", forecast.temperature_c);
///             Ok(())
///         },
///         |error| {
///             eprintln!("{error}");
///             Ok(())
///         },
///     )
///     .await;
/// # Ok(())
/// # }
/// ```
pub trait ResponseFutureExt<T>: Future<Output = Response<T>> + Send + Sized {
    /// Awaits the response, then applies [`Response::ensure`].
    fn ensure_async<P>(self, predicate: P) -> impl Future<Output = Response<T>> + Send
    where
        T: Send,
        P: FnOnce(&T) -> bool + Send,
    {
        async move { self.await.ensure(predicate) }
    }

    /// Awaits the response, then applies [`Response::ensure_or`].
    fn ensure_async_or<P, F>(
        self,
        predicate: P,
        error_factory: F,
    ) -> impl Future<Output = Response<T>> + Send
    where
        T: Send,
        P: FnOnce(&T) -> bool + Send,
        F: FnOnce() -> RequestError + Send,
    {
        async move { self.await.ensure_or(predicate, error_factory) }
    }

    /// Awaits the response, then applies [`Response::ensure_headers`].
    fn ensure_headers_async<P>(self, predicate: P) -> impl Future<Output = Response<T>> + Send
    where
        T: Send,
        P: FnOnce(&HeaderMap) -> bool + Send,
    {
        async move { self.await.ensure_headers(predicate) }
    }

    /// Awaits the response, then applies [`Response::ensure_with`] with an async predicate.
    fn ensure_with<P>(self, predicate: P) -> impl Future<Output = Response<T>> + Send
    where
        T: Send + Sync,
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool> + Send,
    {
        async move { self.await.ensure_with(predicate).await }
    }

    /// Awaits the response, then applies [`Response::ensure_with_or`].
    fn ensure_with_or<P, F>(
        self,
        predicate: P,
        error_factory: F,
    ) -> impl Future<Output = Response<T>> + Send
    where
        T: Send + Sync,
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool> + Send,
        F: FnOnce() -> RequestError + Send,
    {
        async move { self.await.ensure_with_or(predicate, error_factory).await }
    }

    /// Awaits the response, then applies [`Response::handle`].
    fn handle_async<OnValue, OnError>(
        self,
        on_value: OnValue,
        on_error: OnError,
    ) -> impl Future<Output = Response<T>> + Send
    where
        T: Send,
        OnValue: FnOnce(StatusCode, &HeaderMap, &T) -> HandlerResult + Send,
        OnError: FnOnce(&RequestError) -> HandlerResult + Send,
    {
        async move { self.await.handle(on_value, on_error) }
    }

    /// Awaits the response, then applies [`Response::handle_with`] with async callbacks.
    fn handle_with<OnValue, OnError>(
        self,
        on_value: OnValue,
        on_error: OnError,
    ) -> impl Future<Output = Response<T>> + Send
    where
        T: Send + Sync,
        OnValue: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a T) -> BoxFuture<'a, HandlerResult>
            + Send,
        OnError: for<'a> FnOnce(&'a RequestError) -> BoxFuture<'a, HandlerResult> + Send,
    {
        async move { self.await.handle_with(on_value, on_error).await }
    }
}

impl<T, F> ResponseFutureExt<T> for F where F: Future<Output = Response<T>> + Send {}

/// Combinators on a pending [`ResponseWithError`].
///
/// The method names differ from [`ResponseFutureExt`] so both traits can be imported together.
pub trait ResponseWithErrorFutureExt<T, E>:
    Future<Output = ResponseWithError<T, E>> + Send + Sized
{
    /// Awaits the response, then applies [`ResponseWithError::ensure`].
    fn ensure_value_async<P>(
        self,
        predicate: P,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send,
        E: Send,
        P: FnOnce(&T) -> bool + Send,
    {
        async move { self.await.ensure(predicate) }
    }

    /// Awaits the response, then applies [`ResponseWithError::ensure_or`].
    fn ensure_value_async_or<P, F>(
        self,
        predicate: P,
        error_factory: F,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send,
        E: Send,
        P: FnOnce(&T) -> bool + Send,
        F: FnOnce() -> RequestError + Send,
    {
        async move { self.await.ensure_or(predicate, error_factory) }
    }

    /// Awaits the response, then applies [`ResponseWithError::ensure_with`].
    fn ensure_value_with<P>(
        self,
        predicate: P,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send + Sync,
        E: Send,
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool> + Send,
    {
        async move { self.await.ensure_with(predicate).await }
    }

    /// Awaits the response, then applies [`ResponseWithError::ensure_with_or`].
    fn ensure_value_with_or<P, F>(
        self,
        predicate: P,
        error_factory: F,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send + Sync,
        E: Send,
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool> + Send,
        F: FnOnce() -> RequestError + Send,
    {
        async move { self.await.ensure_with_or(predicate, error_factory).await }
    }

    /// Awaits the response, then applies the three-way [`ResponseWithError::handle`].
    fn handle_outcome_async<OnValue, OnError, OnException>(
        self,
        on_value: OnValue,
        on_error: OnError,
        on_exception: OnException,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send,
        E: Send,
        OnValue: FnOnce(StatusCode, &HeaderMap, &T) -> HandlerResult + Send,
        OnError: FnOnce(StatusCode, &HeaderMap, &E) -> HandlerResult + Send,
        OnException: FnOnce(&RequestError) -> HandlerResult + Send,
    {
        async move { self.await.handle(on_value, on_error, on_exception) }
    }

    /// Awaits the response, then applies [`ResponseWithError::handle_with`].
    fn handle_outcome_with<OnValue, OnError, OnException>(
        self,
        on_value: OnValue,
        on_error: OnError,
        on_exception: OnException,
    ) -> impl Future<Output = ResponseWithError<T, E>> + Send
    where
        T: Send + Sync,
        E: Send + Sync,
        OnValue: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a T) -> BoxFuture<'a, HandlerResult>
            + Send,
        OnError: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a E) -> BoxFuture<'a, HandlerResult>
            + Send,
        OnException: for<'a> FnOnce(&'a RequestError) -> BoxFuture<'a, HandlerResult> + Send,
    {
        async move {
            self.await
                .handle_with(on_value, on_error, on_exception)
                .await
        }
    }
}

impl<T, E, F> ResponseWithErrorFutureExt<T, E> for F where
    F: Future<Output = ResponseWithError<T, E>> + Send
{
}
