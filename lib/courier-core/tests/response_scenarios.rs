#![allow(missing_docs)]

use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;

use courier_core::test_client::TestClient;
use courier_core::{
    ErrorKind, HttpClient, HttpScheme, RequestError, ResponseFutureExt, ResponseState,
    ResponseWithErrorFutureExt,
};
use http::StatusCode;
use rstest::rstest;
use tracing::info;

mod common;
pub use self::common::*;

#[rstest]
#[tokio::test]
async fn should_get_typed_forecast(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app
        .get("/weatherforecast")
        .as_json::<Forecast>()
        .ensure_async(|forecast| forecast.summary.is_some())
        .await;

    assert_eq!(response.state(), ResponseState::Success);
    assert_eq!(response.status_code(), Some(StatusCode::OK));
    let forecast = response.into_value().expect("a forecast");
    assert_eq!(forecast.temperature_c, 25);
    assert_eq!(forecast.summary.as_deref(), Some("Hot"));
}

#[rstest]
#[tokio::test]
async fn should_get_forecast_list(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let forecasts = app
        .get("weatherforecasts")
        .as_json::<Vec<Forecast>>()
        .await
        .into_result()
        .expect("forecasts");

    assert_eq!(forecasts.len(), 5);
    assert_eq!(forecasts[0].date, "2026-10-16");
}

#[rstest]
#[tokio::test]
async fn should_deserialize_typed_error(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app
        .get("/weather/error?error=true")
        .as_json_or_error::<Forecast, ErrorResponse>()
        .await;

    assert_eq!(response.state(), ResponseState::HttpStatusError);
    assert_eq!(response.status_code(), Some(StatusCode::BAD_REQUEST));
    assert!(response.value().is_none());
    assert_eq!(
        response.error_value(),
        Some(&ErrorResponse {
            message: "invalid forecast request".to_string(),
            code: 400,
        })
    );
}

#[rstest]
#[tokio::test]
async fn should_route_typed_outcomes_to_callbacks(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;
    let calls = Calls::default();

    for error in [false, true] {
        let _ = app
            .get(format!("/weather/error?error={error}"))
            .as_json_or_error::<Forecast, ErrorResponse>()
            .handle_outcome_async(
                |status, _, forecast| {
                    calls.push(format!("{status} {}", forecast.temperature_c));
                    Ok(())
                },
                |status, _, error| {
                    calls.push(format!("{status} {}", error.message));
                    Ok(())
                },
                |error| {
                    calls.push(error.to_string());
                    Ok(())
                },
            )
            .await;
    }

    insta::assert_debug_snapshot!(calls.list(), @r#"
    [
        "200 OK 25",
        "400 Bad Request invalid forecast request",
    ]
    "#);
}

#[rstest]
#[tokio::test]
async fn should_report_empty_body(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app.get("/empty").as_json::<Forecast>().await;

    assert_ne!(response.state(), ResponseState::Success);
    assert!(matches!(
        response.error(),
        Some(RequestError::EmptyBody { status }) if *status == StatusCode::OK
    ));
}

#[rstest]
#[tokio::test]
async fn should_report_null_body_as_exception(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app.get("/null").as_json::<Forecast>().await;

    assert_eq!(response.state(), ResponseState::Exception);
    assert_eq!(
        response.error().map(RequestError::kind),
        Some(ErrorKind::Deserialization)
    );
}

#[rstest]
#[case::not_found(404)]
#[case::conflict(409)]
#[case::server_error(500)]
#[case::unavailable(503)]
#[tokio::test]
async fn should_report_error_status(
    #[future] app: TestClient<WeatherServer>,
    #[case] code: u16,
) {
    let app = app.await;

    let response = app.get(format!("/status/{code}")).send().await;

    assert_eq!(response.state(), ResponseState::HttpStatusError);
    assert_eq!(response.status_code().map(|it| it.as_u16()), Some(code));
    assert_eq!(
        response.error().map(RequestError::kind),
        Some(ErrorKind::HttpStatus)
    );
}

#[rstest]
#[case::ok(200)]
#[case::no_content(204)]
#[case::not_modified(304)]
#[tokio::test]
async fn should_accept_success_and_redirect_status(
    #[future] app: TestClient<WeatherServer>,
    #[case] code: u16,
) {
    let app = app.await;

    let response = app.get(format!("/status/{code}")).await;

    assert!(response.is_success(), "{code} should be a success");
}

#[rstest]
#[tokio::test]
async fn should_reject_with_predicate(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app
        .get("/weatherforecast")
        .as_json::<Forecast>()
        .ensure_async_or(
            |forecast| forecast.temperature_c < 0,
            || RequestError::custom("forecast is not freezing"),
        )
        .await;

    assert_eq!(response.state(), ResponseState::Exception);
    let error = response.error().expect("rejected");
    assert_eq!(error.kind(), ErrorKind::Rejected);
    insta::assert_snapshot!(error, @"forecast is not freezing");
}

#[rstest]
#[tokio::test]
async fn should_echo_posted_and_put_json(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;
    let message = Message {
        message: "hello".to_string(),
    };

    let posted = app.post("/echo").json(&message).as_json::<Message>().await;
    let put = app.put("echo").json(&message).as_json::<Message>().await;

    assert_eq!(posted.status_code(), Some(StatusCode::CREATED));
    assert_eq!(posted.value(), Some(&message));
    assert_eq!(put.value(), Some(&message));
}

#[rstest]
#[tokio::test]
async fn should_delete(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app.delete("/weatherforecast").await;

    assert_eq!(response.status_code(), Some(StatusCode::NO_CONTENT));
}

#[rstest]
#[tokio::test]
async fn should_send_authentication_and_default_headers(
    #[future] app: TestClient<WeatherServer>,
) {
    let app = app.await;
    let client = HttpClient::builder()
        .with_host("127.0.0.1", HttpScheme::Http, Some(app.local_addr().port()))
        .with_base_route("/api/")
        .with_api_key_header("secret-key")
        .with_header("x-tenant", "acme")
        .build()
        .expect("valid client");

    let headers = client
        .get("headers")
        .with_header("x-request-id", "42")
        .as_json::<std::collections::BTreeMap<String, String>>()
        .await
        .into_value()
        .expect("headers");
    info!(?headers, "received");

    assert_eq!(headers.get("x-api-key").map(String::as_str), Some("secret-key"));
    assert_eq!(headers.get("x-tenant").map(String::as_str), Some("acme"));
    assert_eq!(headers.get("x-request-id").map(String::as_str), Some("42"));
    assert!(!headers.contains_key("authorization"));
}

#[rstest]
#[tokio::test]
async fn should_cancel_slow_request(#[future] app: TestClient<WeatherServer>) {
    let app = app.await;

    let response = app
        .get("/slow")
        .with_cancellation(tokio::time::sleep(Duration::from_millis(50)))
        .await;

    assert_eq!(response.state(), ResponseState::Exception);
    assert!(matches!(response.error(), Some(RequestError::Cancelled)));
}

#[tokio::test]
async fn should_report_connection_failure() {
    init_tracing();
    let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .and_then(|listener| listener.local_addr())
        .expect("free port")
        .port();
    let client = HttpClient::builder()
        .with_host("127.0.0.1", HttpScheme::Http, Some(port))
        .build()
        .expect("valid client");

    let response = client.get("/weatherforecast").as_json::<Forecast>().await;

    assert_eq!(response.state(), ResponseState::Exception);
    assert_eq!(
        response.error().map(RequestError::kind),
        Some(ErrorKind::Transport)
    );
}
