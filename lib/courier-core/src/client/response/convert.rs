use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use super::{RequestError, Response, ResponseWithError};
use crate::client::transport::{BoxFuture, TransportResponse};

const BODY_MAX_LENGTH: usize = 1024;

/// What a transport call produced: a buffered response, or the reason there is none.
pub type TransportOutcome = Result<TransportResponse, RequestError>;

impl Response<()> {
    /// Converts a transport outcome without reading the body.
    pub fn from_status(outcome: TransportOutcome) -> Self {
        match outcome {
            Err(error) => Self::Exception { error },
            Ok(response) if response.is_success() => {
                let (status, headers, _) = response.into_parts();
                Self::Success {
                    status,
                    headers,
                    value: (),
                }
            }
            Ok(response) => status_error(response),
        }
    }
}

impl<T> Response<T>
where
    T: DeserializeOwned,
{
    /// Converts a transport outcome, deserializing a successful JSON body into `T`.
    ///
    /// - a non-success status gives an `HttpStatusError` with [`RequestError::HttpStatus`];
    /// - an empty body gives an `HttpStatusError` with [`RequestError::EmptyBody`];
    /// - malformed JSON or a JSON `null` gives an `Exception`.
    pub fn from_json(outcome: TransportOutcome) -> Self {
        let response = match outcome {
            Err(error) => return Self::Exception { error },
            Ok(response) if !response.is_success() => return status_error(response),
            Ok(response) => response,
        };

        let (status, headers, body) = response.into_parts();
        if is_blank(&body) {
            return Self::HttpStatusError {
                status,
                headers,
                error: RequestError::EmptyBody { status },
            };
        }

        match deserialize(status, &body) {
            Ok(value) => Self::Success {
                status,
                headers,
                value,
            },
            Err(error) => Self::Exception { error },
        }
    }
}

impl<T> Response<T> {
    /// Converts a transport outcome with a custom converter for the successful body.
    ///
    /// A converter returning `None` gives an `Exception` with
    /// [`RequestError::DeserializedNull`].
    pub fn from_content<F>(outcome: TransportOutcome, converter: F) -> Self
    where
        F: FnOnce(StatusCode, &HeaderMap, Bytes) -> Option<T>,
    {
        match Self::successful_parts(outcome) {
            Ok((status, headers, body)) => {
                let value = converter(status, &headers, body);
                Self::converted(status, headers, value)
            }
            Err(failure) => failure,
        }
    }

    /// Like [`from_content`](Self::from_content), with a converter returning a future.
    pub async fn from_content_with<F>(outcome: TransportOutcome, converter: F) -> Self
    where
        F: for<'a> FnOnce(StatusCode, &'a HeaderMap, Bytes) -> BoxFuture<'a, Option<T>>,
    {
        match Self::successful_parts(outcome) {
            Ok((status, headers, body)) => {
                let value = converter(status, &headers, body).await;
                Self::converted(status, headers, value)
            }
            Err(failure) => failure,
        }
    }

    fn successful_parts(outcome: TransportOutcome) -> Result<(StatusCode, HeaderMap, Bytes), Self> {
        match outcome {
            Err(error) => Err(Self::Exception { error }),
            Ok(response) if !response.is_success() => Err(status_error(response)),
            Ok(response) => Ok(response.into_parts()),
        }
    }

    fn converted(status: StatusCode, headers: HeaderMap, value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Success {
                status,
                headers,
                value,
            },
            None => Self::Exception {
                error: RequestError::DeserializedNull { status },
            },
        }
    }
}

impl<T, E> ResponseWithError<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    /// Converts a transport outcome, deserializing the body into `T` on success and into
    /// `E` otherwise.
    ///
    /// Every deserialization failure, on either path, gives an `Exception`. So does an
    /// empty body.
    pub fn from_json(outcome: TransportOutcome) -> Self {
        let response = match outcome {
            Err(error) => return Self::Exception { error },
            Ok(response) => response,
        };

        let success = response.is_success();
        let (status, headers, body) = response.into_parts();
        if is_blank(&body) {
            return Self::Exception {
                error: RequestError::EmptyBody { status },
            };
        }

        if success {
            match deserialize(status, &body) {
                Ok(value) => Self::Success {
                    status,
                    headers,
                    value,
                },
                Err(error) => Self::Exception { error },
            }
        } else {
            match deserialize(status, &body) {
                Ok(error_value) => Self::HttpStatusError {
                    status,
                    headers,
                    error_value,
                },
                Err(error) => Self::Exception { error },
            }
        }
    }
}

fn status_error<T>(response: TransportResponse) -> Response<T> {
    let (status, headers, _) = response.into_parts();
    Response::HttpStatusError {
        status,
        headers,
        error: RequestError::HttpStatus { status },
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn deserialize<T>(status: StatusCode, body: &[u8]) -> Result<T, RequestError>
where
    T: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let value: Option<T> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| RequestError::Json {
            status,
            path: err.path().to_string(),
            error: err.into_inner(),
            body: body_excerpt(body),
        })?;
    deserializer.end().map_err(|error| RequestError::Json {
        status,
        path: ".".to_string(),
        error,
        body: body_excerpt(body),
    })?;

    value.ok_or(RequestError::DeserializedNull { status })
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_MAX_LENGTH {
        return text.into_owned();
    }

    let mut end = BODY_MAX_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", text.get(..end).unwrap_or_default())
}
