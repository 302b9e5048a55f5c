use std::future::{Future, IntoFuture};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::response::{RequestError, Response, ResponseWithError, TransportOutcome};
use super::transport::BoxFuture;
use super::{HttpClient, RequestBody};

/// A request being prepared.
///
/// Created by [`HttpClient::get`], [`post`](HttpClient::post), [`put`](HttpClient::put),
/// [`delete`](HttpClient::delete) or [`call`](HttpClient::call). Configuration errors
/// (an unserializable body, an invalid header) do not fail eagerly: they come back as an
/// `Exception` response once the call is sent.
///
/// Awaiting a `RequestCall` directly sends it without reading the body:
///
/// ```rust,no_run
/// # use courier_core::{HttpClient, HttpScheme};
/// # async fn example(client: HttpClient) {
/// let response = client.delete("/forecasts/42").await;
/// assert!(response.is_success());
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct RequestCall {
    client: HttpClient,
    method: Method,
    route: String,
    headers: HeaderMap,
    body: Option<RequestBody>,
    deferred_error: Option<RequestError>,
    #[debug(ignore)]
    cancellation: Option<BoxFuture<'static, ()>>,
}

impl RequestCall {
    pub(super) fn new(client: HttpClient, method: Method, route: String) -> Self {
        Self {
            client,
            method,
            route,
            headers: HeaderMap::new(),
            body: None,
            deferred_error: None,
            cancellation: None,
        }
    }

    /// Sends `body` serialized as JSON.
    ///
    /// `GET` and `DELETE` requests never send a body.
    #[must_use]
    pub fn json<B>(mut self, body: &B) -> Self
    where
        B: Serialize + ?Sized,
    {
        match RequestBody::json(body) {
            Ok(body) => self.body = Some(body),
            Err(error) => self.defer(error),
        }
        self
    }

    /// Sends a plain text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::text(text));
        self
    }

    /// Sends a prepared body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header to this request only, overriding a default header with the same name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| err.to_string())
            .and_then(|name| {
                HeaderValue::from_str(value)
                    .map(|value| (name, value))
                    .map_err(|err| err.to_string())
            });
        match header {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(message) => self.defer(RequestError::InvalidArgument {
                message: format!("invalid header '{name}': {message}"),
            }),
        }
        self
    }

    /// Abandons the request when `signal` completes first.
    ///
    /// The response is then an `Exception` carrying [`RequestError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, signal: impl Future<Output = ()> + Send + 'static) -> Self {
        self.cancellation = Some(Box::pin(signal));
        self
    }

    /// Sends the request and returns the buffered response as is.
    ///
    /// # Errors
    ///
    /// Returns the reason no response was obtained: invalid input, cancellation or a
    /// transport failure. HTTP error statuses are not errors here.
    pub async fn as_raw(self) -> TransportOutcome {
        let Self {
            client,
            method,
            route,
            headers,
            body,
            deferred_error,
            cancellation,
        } = self;

        if let Some(error) = deferred_error {
            return Err(error);
        }
        client
            .execute(method, &route, headers, body, cancellation)
            .await
    }

    /// Sends the request without reading the body.
    pub async fn send(self) -> Response<()> {
        Response::from_status(self.as_raw().await)
    }

    /// Sends the request and deserializes a successful JSON body into `T`.
    pub async fn as_json<T>(self) -> Response<T>
    where
        T: DeserializeOwned,
    {
        Response::from_json(self.as_raw().await)
    }

    /// Sends the request and deserializes the JSON body into `T` on success, `E` otherwise.
    pub async fn as_json_or_error<T, E>(self) -> ResponseWithError<T, E>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        ResponseWithError::from_json(self.as_raw().await)
    }

    /// Sends the request and converts a successful body with `converter`.
    pub async fn as_content<T, F>(self, converter: F) -> Response<T>
    where
        F: FnOnce(StatusCode, &HeaderMap, Bytes) -> Option<T>,
    {
        Response::from_content(self.as_raw().await, converter)
    }

    /// Sends the request and converts a successful body with an async `converter`.
    pub async fn as_content_with<T, F>(self, converter: F) -> Response<T>
    where
        F: for<'a> FnOnce(StatusCode, &'a HeaderMap, Bytes) -> BoxFuture<'a, Option<T>>,
    {
        Response::from_content_with(self.as_raw().await, converter).await
    }

    fn defer(&mut self, error: RequestError) {
        if self.deferred_error.is_none() {
            self.deferred_error = Some(error);
        }
    }
}

impl IntoFuture for RequestCall {
    type Output = Response<()>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;
    use serde::Deserialize;

    use super::*;
    use crate::client::testing::MockTransport;
    use crate::{ErrorKind, ResponseFutureExt, ResponseState};

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Forecast {
        temperature_c: i32,
    }

    struct NotSerializable;

    impl Serialize for NotSerializable {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("not serializable"))
        }
    }

    #[tokio::test]
    async fn should_get_json() {
        let transport = MockTransport::default();
        transport.respond(StatusCode::OK, r#"{"temperatureC":25}"#);
        let client = transport.client();

        let response = client
            .get("/weather")
            .as_json::<Forecast>()
            .ensure_async(|forecast| forecast.temperature_c == 25)
            .await;

        assert_eq!(response.value().map(|it| it.temperature_c), Some(25));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        insta::assert_snapshot!(requests[0].url, @"http://localhost:5000/api/weather");
    }

    #[tokio::test]
    async fn should_post_json_body() {
        let transport = MockTransport::default();
        transport.respond(StatusCode::OK, "");
        let client = transport.client();

        let response = client
            .post("post")
            .json(&serde_json::json!({ "message": "hello" }))
            .with_header("x-request-id", "42")
            .await;

        assert!(response.is_success());
        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            request.headers.get("x-request-id"),
            Some(&HeaderValue::from_static("42"))
        );
    }

    #[tokio::test]
    async fn should_defer_serialization_error() {
        let transport = MockTransport::default();
        let client = transport.client();

        let response = client.put("forecast").json(&NotSerializable).send().await;

        assert_eq!(response.state(), ResponseState::Exception);
        assert_eq!(
            response.error().map(RequestError::kind),
            Some(ErrorKind::Argument)
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn should_defer_invalid_header() {
        let transport = MockTransport::default();
        let client = transport.client();

        let response = client.get("forecast").with_header("bad header", "x").await;

        assert!(matches!(
            response.error(),
            Some(RequestError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn should_capture_transport_failure() {
        let transport = MockTransport::default();
        transport.fail("connection refused");
        let client = transport.client();

        let response = client.get("forecast").as_json::<Forecast>().await;

        assert_eq!(response.state(), ResponseState::Exception);
        let error = response.error().expect("transport error");
        assert_eq!(error.kind(), ErrorKind::Transport);
        insta::assert_snapshot!(error, @"Transport failure: connection refused");
    }

    #[tokio::test]
    async fn should_convert_raw_content() {
        let transport = MockTransport::default();
        transport.respond(StatusCode::OK, "42");
        let client = transport.client();

        let response = client
            .get("answer")
            .as_content(|_, _, body| std::str::from_utf8(&body).ok()?.parse::<u8>().ok())
            .await;

        assert_eq!(response.into_value(), Some(42));
    }

    #[tokio::test]
    async fn should_convert_content_with_async_converter() {
        let transport = MockTransport::default();
        transport.respond(StatusCode::OK, "42").respond(StatusCode::NOT_FOUND, "");
        let client = transport.client();

        let response = client
            .get("answer")
            .as_content_with(|status, _, body| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    Some(format!("{status} {}", body.len()))
                })
            })
            .await;
        assert_eq!(response.into_value().as_deref(), Some("200 OK 2"));

        let response = client
            .get("answer")
            .as_content_with(|_, _, _| Box::pin(async { Some(()) }))
            .await;
        assert_eq!(response.state(), ResponseState::HttpStatusError);
    }
}
