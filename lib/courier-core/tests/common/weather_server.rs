use std::collections::BTreeMap;
use std::net::TcpListener;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use courier_core::HttpClient;
use courier_core::test_client::{HealthStatus, TestServer, TestServerConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub date: String,
    pub temperature_c: i32,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorQuery {
    #[serde(default)]
    error: bool,
}

fn hot_forecast() -> Forecast {
    Forecast {
        date: "2026-10-16".to_string(),
        temperature_c: 25,
        summary: Some("Hot".to_string()),
    }
}

async fn forecast() -> Json<Forecast> {
    Json(hot_forecast())
}

async fn forecasts() -> Json<Vec<Forecast>> {
    let forecasts = (0..5)
        .map(|day| Forecast {
            date: format!("2026-10-{}", 16 + day),
            temperature_c: 20 + day,
            summary: None,
        })
        .collect();
    Json(forecasts)
}

async fn weather_error(Query(query): Query<ErrorQuery>) -> Response {
    if query.error {
        let error = ErrorResponse {
            message: "invalid forecast request".to_string(),
            code: 400,
        };
        (StatusCode::BAD_REQUEST, Json(error)).into_response()
    } else {
        Json(hot_forecast()).into_response()
    }
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn null() -> Json<Option<Forecast>> {
    Json(None)
}

async fn echo(Json(message): Json<Message>) -> (StatusCode, Json<Message>) {
    (StatusCode::CREATED, Json(message))
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(headers)
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(10)).await;
    StatusCode::OK
}

pub fn router() -> Router {
    let api = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route(
            "/weatherforecast",
            get(forecast).delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route("/weatherforecasts", get(forecasts))
        .route("/weather/error", get(weather_error))
        .route(
            "/weather/exception",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/status/{code}", get(status))
        .route("/empty", get(|| async { StatusCode::OK }))
        .route("/null", get(null))
        .route("/echo", post(echo).put(echo))
        .route("/headers", get(echo_headers))
        .route("/slow", get(slow));

    Router::new().nest("/api", api)
}

#[derive(Debug)]
pub struct WeatherServer;

impl TestServer for WeatherServer {
    type Error = std::io::Error;

    async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(listener)?;
        info!(?listener, "launching weather server");
        axum::serve(listener, router()).await
    }

    async fn is_healthy(&self, client: &HttpClient) -> Result<HealthStatus, Self::Error> {
        let response = client.get("/health").await;
        Ok(if response.is_success() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        })
    }

    fn config(&self) -> TestServerConfig {
        TestServerConfig {
            base_route: "api".to_string(),
            ..TestServerConfig::default()
        }
    }
}
