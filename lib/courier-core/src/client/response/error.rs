use http::StatusCode;

use crate::client::transport::{SharedError, TransportError};

/// Why a request did not produce a success value.
///
/// A `RequestError` is never returned as `Err` by request methods: it is carried by the
/// failure states of [`Response`](super::Response) and
/// [`ResponseWithError`](super::ResponseWithError).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RequestError {
    /// The server answered outside the `[200, 400)` range.
    #[display("HTTP request failed with status {status}")]
    #[from(skip)]
    HttpStatus {
        /// The response status code.
        status: StatusCode,
    },

    /// A typed value was expected but the response body was empty.
    #[display("Response with status {status} has an empty body")]
    #[from(skip)]
    EmptyBody {
        /// The response status code.
        status: StatusCode,
    },

    /// The body deserialized to nothing (JSON `null`, or a converter returning `None`).
    #[display("Deserializing the response body with status {status} returned null")]
    #[from(skip)]
    DeserializedNull {
        /// The response status code.
        status: StatusCode,
    },

    /// The body is not valid JSON for the target type.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    Json {
        /// The response status code.
        status: StatusCode,
        /// Path of the offending element inside the JSON document.
        path: String,
        /// The underlying `serde_json` error.
        error: serde_json::Error,
        /// The body, truncated when too long.
        body: String,
    },

    /// The request body could not be serialized.
    #[display("Failed to serialize the request body: {error}")]
    #[from(skip)]
    Serialization {
        /// The underlying `serde_json` error.
        error: serde_json::Error,
    },

    /// The request could not be built (invalid route, header, ...).
    #[display("Invalid argument: {message}")]
    #[from(skip)]
    InvalidArgument {
        /// What was wrong with the input.
        message: String,
    },

    /// The cancellation signal fired before the transport answered.
    #[display("Request was cancelled")]
    #[from(skip)]
    Cancelled,

    /// No response could be obtained.
    #[display("{_0}")]
    Transport(TransportError),

    /// An `ensure` predicate rejected the response.
    #[display("{combinator} predicate rejected the response")]
    #[from(skip)]
    PredicateFailed {
        /// The combinator that rejected the response.
        combinator: &'static str,
    },

    /// A `handle` callback failed.
    #[display("Response handler failed: {_0}")]
    #[from(skip)]
    Handler(SharedError),

    /// An error supplied by the caller, typically from an `ensure` error factory.
    #[display("{_0}")]
    #[from(skip)]
    Custom(SharedError),
}

/// Classification of a [`RequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input from the caller, including cancellation.
    Argument,
    /// Network or connection failure.
    Transport,
    /// The server's HTTP-level judgment: non-success status or empty body.
    HttpStatus,
    /// Malformed, mismatched or null JSON.
    Deserialization,
    /// Rejected by an `ensure` predicate.
    Rejected,
    /// A `handle` callback failed.
    Handler,
}

impl RequestError {
    /// Wraps any error as a [`RequestError::Custom`].
    pub fn custom(error: impl Into<crate::BoxError>) -> Self {
        Self::Custom(SharedError::from(error.into()))
    }

    pub(crate) fn handler(error: crate::BoxError) -> Self {
        Self::Handler(SharedError::from(error))
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Serialization { .. } | Self::InvalidArgument { .. } | Self::Cancelled => {
                ErrorKind::Argument
            }
            Self::Transport(_) => ErrorKind::Transport,
            Self::HttpStatus { .. } | Self::EmptyBody { .. } => ErrorKind::HttpStatus,
            Self::DeserializedNull { .. } | Self::Json { .. } => ErrorKind::Deserialization,
            Self::PredicateFailed { .. } | Self::Custom(_) => ErrorKind::Rejected,
            Self::Handler(_) => ErrorKind::Handler,
        }
    }

    /// The status code attached to the error, if the server answered.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status }
            | Self::EmptyBody { status }
            | Self::DeserializedNull { status }
            | Self::Json { status, .. } => Some(*status),
            _ => None,
        }
    }
}
