#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use courier_core::test_client::TestClient;
use rstest::fixture;
use tracing::info;

mod weather_server;
pub use self::weather_server::*;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub async fn app() -> TestClient<WeatherServer> {
    init_tracing();
    match TestClient::start(WeatherServer).await {
        Ok(app) => app,
        Err(error) => {
            panic!("fail to start test app: {error:?}");
        }
    }
}

/// Shared list of handler calls, cloned into handlers.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().expect("not poisoned").push(call.into());
    }

    pub fn list(&self) -> Vec<String> {
        self.0.lock().expect("not poisoned").clone()
    }
}
