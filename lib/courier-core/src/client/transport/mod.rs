//! The boundary between the client and the HTTP stack.
//!
//! [`HttpClient`](crate::HttpClient) never talks to the network itself: it prepares a
//! [`TransportRequest`] and hands it to a [`Transport`]. The default implementation,
//! [`ReqwestTransport`], wraps a [`reqwest::Client`]. Tests and alternative stacks plug
//! in through the same trait.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use super::RequestBody;

mod reqwest_transport;

pub use self::reqwest_transport::ReqwestTransport;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed, sendable error, as returned by user callbacks.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A shared error, used where an error must be stored inside another error.
pub type SharedError = Arc<dyn Error + Send + Sync>;

/// Executes prepared HTTP requests.
///
/// Implementations must be safe for concurrent use: one transport is shared by every
/// clone of the [`HttpClient`](crate::HttpClient) and every dispatch handler built from it.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Sends the request and buffers the whole response.
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}

/// A request ready to be sent: absolute URL, final headers, and optional body.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, base address already applied.
    pub url: Url,
    /// Default, authentication, per-request and content-type headers.
    pub headers: HeaderMap,
    /// The request body, if any.
    pub body: Option<RequestBody>,
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TransportResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the status is in the `[200, 400)` range.
    pub fn is_success(&self) -> bool {
        self.status.is_success() || self.status.is_redirection()
    }

    /// Splits the response into status, headers and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// Failure to obtain a response at all.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// The `reqwest` client failed (connection, protocol, body read, ...).
    #[display("HTTP transport failure: {_0}")]
    Reqwest(reqwest::Error),

    /// Any other transport failure.
    #[display("Transport failure: {_0}")]
    #[from(skip)]
    Other(SharedError),
}

impl TransportError {
    /// Wraps an arbitrary error coming from a custom transport.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(Arc::from(error.into()))
    }
}
