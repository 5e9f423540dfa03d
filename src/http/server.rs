//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, metrics, and a
//!   timeout on the non-story routes)
//! - Serve on a listener until shutdown is triggered

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{track_requests, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::{story, subscription};
use crate::lifecycle::ShutdownListener;
use crate::story::StoryService;
use crate::subscription::SubscriptionService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub stories: Arc<StoryService>,
    pub subscriptions: Arc<SubscriptionService>,
}

impl AppState {
    pub fn new(stories: StoryService, subscriptions: Arc<SubscriptionService>) -> Self {
        Self {
            stories: Arc::new(stories),
            subscriptions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// HTTP server for the story backend.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request timeout covers only the subscription and health routes.
    /// Story routes run their retry sequence to completion and always answer
    /// with the story text or one normalized error.
    #[allow(deprecated)]
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let story_routes = Router::new()
            .route("/ai/send-message-start", post(story::start_story))
            .route("/ai/send-message", post(story::continue_story))
            .route("/ai/get-actions", post(story::list_actions));

        let timed_routes = Router::new()
            .route("/subscription", get(subscription::list_subscriptions))
            .route("/subscription/{id}", get(subscription::get_subscription))
            .route("/subscription/update/{id}", post(subscription::update_subscription))
            .route("/subscription/purchase/{id}", post(subscription::purchase_subscription))
            .route("/health", get(health))
            .route_layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        let api = story_routes
            .merge(timed_routes)
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state);

        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        });

        api.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                .layer(trace)
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes)),
        )
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
