//! Subscription endpoints under `/subscription`.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::error::ServiceError;
use crate::http::request::BearerToken;
use crate::http::server::AppState;
use crate::subscription::{Subscription, SubscriptionPatch, User};

/// `GET /subscription/{id}`
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, ServiceError> {
    state.subscriptions.get_subscription(id).await.map(Json)
}

/// `GET /subscription`
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, ServiceError> {
    state.subscriptions.list_subscriptions().await.map(Json)
}

/// `POST /subscription/update/{id}` (admin only)
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    token: BearerToken,
    Json(patch): Json<SubscriptionPatch>,
) -> Result<Json<Subscription>, ServiceError> {
    state
        .subscriptions
        .update_subscription(id, &patch, token.as_deref())
        .await
        .map(Json)
}

/// `POST /subscription/purchase/{id}`
pub async fn purchase_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    token: BearerToken,
) -> Result<Json<User>, ServiceError> {
    state
        .subscriptions
        .purchase_subscription(id, token.as_deref(), Utc::now())
        .await
        .map(Json)
}
