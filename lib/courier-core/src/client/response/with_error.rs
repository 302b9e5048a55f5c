use http::{HeaderMap, StatusCode};
use tracing::warn;

use super::{HandlerResult, RequestError, ResponseState};
use crate::client::transport::BoxFuture;

/// Outcome of a request expecting a value of type `T`, or an error body of type `E`.
///
/// Unlike [`Response`](super::Response), a non-success status carries the deserialized
/// error body. When that body cannot be deserialized the response is an `Exception`.
#[derive(Debug)]
pub enum ResponseWithError<T, E> {
    /// The request succeeded and produced a value.
    Success {
        /// The response status code.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The deserialized body.
        value: T,
    },

    /// The server answered with a non-success status and a typed error body.
    HttpStatusError {
        /// The response status code.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The deserialized error body.
        error_value: E,
    },

    /// The request failed without a usable answer.
    Exception {
        /// The failure.
        error: RequestError,
    },
}

impl<T, E> ResponseWithError<T, E> {
    /// Creates a successful response.
    pub fn success(status: StatusCode, headers: HeaderMap, value: T) -> Self {
        Self::Success {
            status,
            headers,
            value,
        }
    }

    /// Creates a response carrying a typed error body.
    pub fn http_status_error(status: StatusCode, headers: HeaderMap, error_value: E) -> Self {
        Self::HttpStatusError {
            status,
            headers,
            error_value,
        }
    }

    /// Creates a failed response without status code.
    pub fn exception(error: impl Into<RequestError>) -> Self {
        Self::Exception {
            error: error.into(),
        }
    }

    /// The response state.
    pub fn state(&self) -> ResponseState {
        match self {
            Self::Success { .. } => ResponseState::Success,
            Self::HttpStatusError { .. } => ResponseState::HttpStatusError,
            Self::Exception { .. } => ResponseState::Exception,
        }
    }

    /// Whether the response holds a value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The status code, absent for exceptions.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Success { status, .. } | Self::HttpStatusError { status, .. } => Some(*status),
            Self::Exception { .. } => None,
        }
    }

    /// The response headers, absent for exceptions.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Success { headers, .. } | Self::HttpStatusError { headers, .. } => Some(headers),
            Self::Exception { .. } => None,
        }
    }

    /// The value, present only on success.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The typed error body, present only for HTTP status errors.
    pub fn error_value(&self) -> Option<&E> {
        match self {
            Self::HttpStatusError { error_value, .. } => Some(error_value),
            _ => None,
        }
    }

    /// The exception, present only for exceptions.
    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Exception { error } => Some(error),
            _ => None,
        }
    }

    /// Consumes the response, keeping the value.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Rejects a successful response whose value does not satisfy the predicate.
    #[must_use]
    pub fn ensure<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        self.ensure_or(predicate, || RequestError::PredicateFailed {
            combinator: "ensure",
        })
    }

    /// Like [`ensure`](Self::ensure), with the error built by `error_factory`.
    #[must_use]
    pub fn ensure_or<P, F>(self, predicate: P, error_factory: F) -> Self
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce() -> RequestError,
    {
        if let Self::Success { value, .. } = &self
            && !predicate(value)
        {
            return Self::Exception {
                error: error_factory(),
            };
        }
        self
    }

    /// Async version of [`ensure`](Self::ensure): the predicate returns a future.
    pub async fn ensure_with<P>(self, predicate: P) -> Self
    where
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool>,
    {
        self.ensure_with_or(predicate, || RequestError::PredicateFailed {
            combinator: "ensure_with",
        })
        .await
    }

    /// Like [`ensure_with`](Self::ensure_with), with the error built by `error_factory`.
    pub async fn ensure_with_or<P, F>(self, predicate: P, error_factory: F) -> Self
    where
        P: for<'a> FnOnce(&'a T) -> BoxFuture<'a, bool>,
        F: FnOnce() -> RequestError,
    {
        if let Self::Success { value, .. } = &self
            && !predicate(value).await
        {
            return Self::Exception {
                error: error_factory(),
            };
        }
        self
    }

    /// Calls exactly one of the callbacks, depending on the state, and returns the response.
    ///
    /// If the callback fails, the response becomes an `Exception` carrying
    /// [`RequestError::Handler`].
    #[must_use]
    pub fn handle<OnValue, OnError, OnException>(
        self,
        on_value: OnValue,
        on_error: OnError,
        on_exception: OnException,
    ) -> Self
    where
        OnValue: FnOnce(StatusCode, &HeaderMap, &T) -> HandlerResult,
        OnError: FnOnce(StatusCode, &HeaderMap, &E) -> HandlerResult,
        OnException: FnOnce(&RequestError) -> HandlerResult,
    {
        let outcome = match &self {
            Self::Success {
                status,
                headers,
                value,
            } => on_value(*status, headers, value),
            Self::HttpStatusError {
                status,
                headers,
                error_value,
            } => on_error(*status, headers, error_value),
            Self::Exception { error } => on_exception(error),
        };
        self.after_handle(outcome)
    }

    /// Async version of [`handle`](Self::handle): the callbacks return futures.
    pub async fn handle_with<OnValue, OnError, OnException>(
        self,
        on_value: OnValue,
        on_error: OnError,
        on_exception: OnException,
    ) -> Self
    where
        OnValue: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a T) -> BoxFuture<'a, HandlerResult>,
        OnError: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a E) -> BoxFuture<'a, HandlerResult>,
        OnException: for<'a> FnOnce(&'a RequestError) -> BoxFuture<'a, HandlerResult>,
    {
        let outcome = match &self {
            Self::Success {
                status,
                headers,
                value,
            } => on_value(*status, headers, value).await,
            Self::HttpStatusError {
                status,
                headers,
                error_value,
            } => on_error(*status, headers, error_value).await,
            Self::Exception { error } => on_exception(error).await,
        };
        self.after_handle(outcome)
    }

    fn after_handle(self, outcome: HandlerResult) -> Self {
        match outcome {
            Ok(()) => self,
            Err(error) => {
                warn!(%error, state = %self.state(), "response handler failed");
                Self::Exception {
                    error: RequestError::handler(error),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rstest::rstest;

    use super::*;

    fn sample(state: ResponseState) -> ResponseWithError<i32, String> {
        match state {
            ResponseState::Success => {
                ResponseWithError::success(StatusCode::OK, HeaderMap::new(), 25)
            }
            ResponseState::HttpStatusError => ResponseWithError::http_status_error(
                StatusCode::BAD_REQUEST,
                HeaderMap::new(),
                "invalid".to_string(),
            ),
            ResponseState::Exception => ResponseWithError::exception(RequestError::Cancelled),
        }
    }

    #[rstest]
    #[case(ResponseState::Success, "value")]
    #[case(ResponseState::HttpStatusError, "error")]
    #[case(ResponseState::Exception, "exception")]
    fn handle_should_dispatch_on_state(#[case] state: ResponseState, #[case] expected: &str) {
        let calls = RefCell::new(Vec::new());

        let response = sample(state).handle(
            |_, _, _| {
                calls.borrow_mut().push("value");
                Ok(())
            },
            |status, _, error_value| {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(error_value, "invalid");
                calls.borrow_mut().push("error");
                Ok(())
            },
            |_| {
                calls.borrow_mut().push("exception");
                Ok(())
            },
        );

        assert_eq!(response.state(), state);
        assert_eq!(calls.into_inner(), vec![expected]);
    }

    #[rstest]
    #[case(ResponseState::Success)]
    #[case(ResponseState::HttpStatusError)]
    #[case(ResponseState::Exception)]
    fn should_keep_one_payload_per_state(#[case] state: ResponseState) {
        let response = sample(state);

        let payloads = [
            response.value().is_some(),
            response.error_value().is_some(),
            response.error().is_some(),
        ];
        assert_eq!(payloads.iter().filter(|present| **present).count(), 1);
    }

    #[test]
    fn handle_should_convert_error_callback_failure() {
        let response = sample(ResponseState::HttpStatusError).handle(
            |_, _, _| Ok(()),
            |_, _, _| Err("cannot log error body".into()),
            |_| Ok(()),
        );

        assert_eq!(response.state(), ResponseState::Exception);
        assert!(matches!(response.error(), Some(RequestError::Handler(_))));
    }

    #[test]
    fn ensure_should_only_gate_success() {
        let response = sample(ResponseState::HttpStatusError).ensure(|_| false);
        assert_eq!(response.state(), ResponseState::HttpStatusError);

        let response = sample(ResponseState::Success).ensure(|value| *value < 0);
        assert_eq!(response.state(), ResponseState::Exception);
    }

    #[tokio::test]
    async fn handle_with_should_await_error_branch() {
        let response = sample(ResponseState::HttpStatusError)
            .handle_with(
                |_, _, _| Box::pin(async { HandlerResult::Ok(()) }),
                |_, _, error_value| {
                    Box::pin(async move {
                        if error_value.is_empty() {
                            HandlerResult::Ok(())
                        } else {
                            Err(format!("server said {error_value}").into())
                        }
                    })
                },
                |_| Box::pin(async { HandlerResult::Ok(()) }),
            )
            .await;

        let error = response.error().expect("handler failure");
        insta::assert_snapshot!(error, @"Response handler failed: server said invalid");
    }

    #[tokio::test]
    async fn ensure_with_or_should_use_factory_error() {
        let response = sample(ResponseState::Success)
            .ensure_with_or(
                |value| Box::pin(async move { *value > 30 }),
                || RequestError::custom("too cold"),
            )
            .await;

        assert_eq!(response.state(), ResponseState::Exception);
        insta::assert_snapshot!(response.error().expect("rejected"), @"too cold");
    }

    #[tokio::test]
    async fn ensure_with_should_not_touch_typed_error() {
        let response = sample(ResponseState::HttpStatusError)
            .ensure_with(|_| Box::pin(async { false }))
            .await;

        assert_eq!(response.error_value().map(String::as_str), Some("invalid"));
    }
}
