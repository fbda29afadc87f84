//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests: a mock backend and apps wired to it.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragna_client::{BackendClient, BackendSettings};
use ragna_config::ConversationSettings;
use ragna_engine::{App, Screen};

/// Start a mock server that simulates the assistant backend
pub async fn start_backend_mock() -> MockServer {
    MockServer::start().await
}

pub fn backend_settings(server: &MockServer) -> BackendSettings {
    BackendSettings {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
    }
}

pub fn app_for(server: &MockServer, screen: Screen) -> App {
    let client = BackendClient::new(&backend_settings(server)).expect("mock backend client");
    App::new(client, screen, ConversationSettings::default())
}

/// Mount `/validate-key` answering with `status`
pub async fn mount_validate_key(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/validate-key"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount a JSON POST endpoint returning `{field: content}`
pub async fn mount_text_response(server: &MockServer, endpoint: &str, field: &str, content: &str) {
    let mut body = serde_json::Map::new();
    body.insert(field.to_string(), Value::String(content.to_string()));
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Object(body)))
        .mount(server)
        .await;
}

/// Mount an endpoint that fails with `status` and a JSON error body
pub async fn mount_failure(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"detail": "failure"})))
        .mount(server)
        .await;
}

/// An app on `screen` whose key "abc" has already been accepted
pub async fn validated_app(server: &MockServer, screen: Screen) -> App {
    mount_validate_key(server, 200).await;
    let mut app = app_for(server, screen);
    app.submit_api_key("abc").expect("local key check passes");
    app.settle().await;
    assert!(app.is_validated(), "mock backend accepted the key");
    app
}
