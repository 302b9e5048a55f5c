//! The three-state outcome of a request and the combinators working on it.
//!
//! Every request resolves into one of three states:
//!
//! - **Success**: the server answered in the `[200, 400)` range and the body (if a typed
//!   value was requested) deserialized into a value.
//! - **HTTP status error**: the server answered outside that range. With
//!   [`ResponseWithError`] the error body is deserialized into a typed error value.
//! - **Exception**: no usable answer: transport failure, cancellation, invalid input,
//!   or a body that could not be deserialized.
//!
//! The states are plain enum variants, so the data each one carries is always present:
//! a `Success` always has a value, a failure always has an error.
//!
//! Responses are consumed by the combinators:
//!
//! - `ensure*` turns a success into a failure when a predicate rejects it;
//! - `handle*` runs side-effecting callbacks and hands the response back unchanged,
//!   unless a callback fails, in which case the response becomes an `Exception`.
//!
//! ```rust
//! use courier_core::{Response, ResponseState};
//! use http::{HeaderMap, StatusCode};
//!
//! let response = Response::success(StatusCode::OK, HeaderMap::new(), 25)
//!     .ensure(|temperature| *temperature > 30);
//!
//! assert_eq!(response.state(), ResponseState::Exception);
//! ```

use http::{HeaderMap, StatusCode};
use tracing::warn;

use crate::client::transport::{BoxError, BoxFuture};

mod convert;
mod error;
mod future_ext;
mod with_error;

pub use self::convert::TransportOutcome;
pub use self::error::{ErrorKind, RequestError};
pub use self::future_ext::{ResponseFutureExt, ResponseWithErrorFutureExt};
pub use self::with_error::ResponseWithError;

/// What `handle` callbacks return: an error turns the response into an `Exception`.
pub type HandlerResult = Result<(), BoxError>;

/// The response of a call that does not read the body.
pub type EmptyResponse = Response<()>;

/// State of a [`Response`] or [`ResponseWithError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ResponseState {
    /// A value is available.
    #[display("success")]
    Success,
    /// The server answered with a non-success status.
    #[display("HTTP status error")]
    HttpStatusError,
    /// No usable answer was obtained.
    #[display("exception")]
    Exception,
}

/// Outcome of a request expecting a value of type `T`.
#[derive(Debug)]
pub enum Response<T> {
    /// The request succeeded and produced a value.
    Success {
        /// The response status code.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The deserialized body.
        value: T,
    },

    /// The server answered, but not with a usable success.
    HttpStatusError {
        /// The response status code.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// Either [`RequestError::HttpStatus`] or [`RequestError::EmptyBody`].
        error: RequestError,
    },

    /// The request failed without a usable answer.
    Exception {
        /// The failure.
        error: RequestError,
    },
}

impl<T> Response<T> {
    /// Creates a successful response.
    pub fn success(status: StatusCode, headers: HeaderMap, value: T) -> Self {
        Self::Success {
            status,
            headers,
            value,
        }
    }

    /// Creates a response for a non-success status.
    pub fn http_status_error(status: StatusCode, headers: HeaderMap, error: RequestError) -> Self {
        Self::HttpStatusError {
            status,
            headers,
            error,
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
            Self::HttpStatusError { .. } | Self::Exception { .. } => None,
        }
    }

    /// The error, present only on failure.
    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Success { .. } => None,
            Self::HttpStatusError { error, .. } | Self::Exception { error } => Some(error),
        }
    }

    /// Consumes the response, keeping the value.
    pub fn into_value(self) -> Option<T> {
        self.into_result().ok()
    }

    /// Converts into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`RequestError`] when the response is not a success.
    pub fn into_result(self) -> Result<T, RequestError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::HttpStatusError { error, .. } | Self::Exception { error } => Err(error),
        }
    }

    /// Rejects a successful response whose value does not satisfy the predicate.
    ///
    /// A failed response is returned unchanged. A rejected response becomes an
    /// `Exception` carrying [`RequestError::PredicateFailed`].
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

    /// Rejects a successful response whose headers do not satisfy the predicate.
    #[must_use]
    pub fn ensure_headers<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&HeaderMap) -> bool,
    {
        self.ensure_headers_or(predicate, || RequestError::PredicateFailed {
            combinator: "ensure_headers",
        })
    }

    /// Like [`ensure_headers`](Self::ensure_headers), with the error built by `error_factory`.
    #[must_use]
    pub fn ensure_headers_or<P, F>(self, predicate: P, error_factory: F) -> Self
    where
        P: FnOnce(&HeaderMap) -> bool,
        F: FnOnce() -> RequestError,
    {
        if let Self::Success { headers, .. } = &self
            && !predicate(headers)
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

    /// Calls `on_value` on success, `on_error` otherwise, and returns the response.
    ///
    /// If the callback fails, the response becomes an `Exception` carrying
    /// [`RequestError::Handler`].
    #[must_use]
    pub fn handle<OnValue, OnError>(self, on_value: OnValue, on_error: OnError) -> Self
    where
        OnValue: FnOnce(StatusCode, &HeaderMap, &T) -> HandlerResult,
        OnError: FnOnce(&RequestError) -> HandlerResult,
    {
        let outcome = match &self {
            Self::Success {
                status,
                headers,
                value,
            } => on_value(*status, headers, value),
            Self::HttpStatusError { error, .. } | Self::Exception { error } => on_error(error),
        };
        self.after_handle(outcome)
    }

    /// Async version of [`handle`](Self::handle): the callbacks return futures.
    pub async fn handle_with<OnValue, OnError>(self, on_value: OnValue, on_error: OnError) -> Self
    where
        OnValue: for<'a> FnOnce(StatusCode, &'a HeaderMap, &'a T) -> BoxFuture<'a, HandlerResult>,
        OnError: for<'a> FnOnce(&'a RequestError) -> BoxFuture<'a, HandlerResult>,
    {
        let outcome = match &self {
            Self::Success {
                status,
                headers,
                value,
            } => on_value(*status, headers, value).await,
            Self::HttpStatusError { error, .. } | Self::Exception { error } => {
                on_error(error).await
            }
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
