//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use story_server::config::{RetryConfig, SeedUserConfig, ServerConfig};
use story_server::lifecycle;
use story_server::subscription::Role;
use story_server::HttpServer;

pub const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const PLAYER_TOKEN: &str = "player-token";

/// A successful completion body carrying `text`.
pub fn completion_body(text: &str) -> Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": text } }
        ]
    })
}

/// Respond to every completion request with `template`.
pub async fn mount_completion(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Respond with `template` for the next `times` completion requests only.
pub async fn mount_completion_times(server: &MockServer, template: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(template)
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Config pointing at `ai_url` with millisecond backoff and two seeded users.
pub fn test_config(ai_url: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.ai.base_url = format!("{ai_url}/api/v1");
    config.ai.api_token = "test-token".into();
    config.retries = RetryConfig {
        max_retries: 3,
        initial_delay_ms: 1,
        max_delay_ms: 5,
    };
    config.subscriptions.sweep_enabled = false;
    config.subscriptions.users = vec![
        SeedUserConfig {
            id: 1,
            name: "admin".into(),
            role: Role::Admin,
            token: ADMIN_TOKEN.into(),
        },
        SeedUserConfig {
            id: 2,
            name: "player".into(),
            role: Role::User,
            token: PLAYER_TOKEN.into(),
        },
    ];
    config
}

/// Build the full router, middleware included.
pub async fn build_app(config: ServerConfig) -> Router {
    let app = lifecycle::build(config).await.unwrap();
    HttpServer::new(&app.config, app.state).router()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
