#![allow(dead_code)]

use raindrop_client::{ClientConfig, RaindropClient};
use wiremock::MockServer;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:8080/oauth/callback";
pub const ACCESS_TOKEN: &str = "tok1";

/// A client whose API and OAuth hosts both point at a local mock server.
pub struct TestEnvironment {
    pub server: MockServer,
    pub client: RaindropClient,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI)
            .with_api_host(server.uri())
            .with_auth_host(server.uri());
        let client = RaindropClient::new(config).expect("Failed to create test client");

        Self { server, client }
    }

    /// Absolute URL of `path` on the mock server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Every request the mock server has seen so far.
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
    }
}

pub fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
