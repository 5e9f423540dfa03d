//! Story endpoints under `/ai`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::http::server::AppState;
use crate::story::{StoryOpening, StoryText};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContinueRequest {
    #[serde(default)]
    pub message: String,
    /// The action the player chose.
    #[serde(default)]
    pub prompt: String,
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::BadRequest(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

/// `POST /ai/send-message-start`
pub async fn start_story(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<StoryOpening>, ServiceError> {
    let premise = require("message", &request.message)?;
    let opening = state.stories.start_story(premise).await?;
    Ok(Json(opening))
}

/// `POST /ai/send-message`
pub async fn continue_story(
    State(state): State<AppState>,
    Json(request): Json<ContinueRequest>,
) -> Result<Json<StoryText>, ServiceError> {
    let story = require("message", &request.message)?;
    let action = require("prompt", &request.prompt)?;
    let text = state.stories.continue_story(story, action).await?;
    Ok(Json(text))
}

/// `POST /ai/get-actions`
pub async fn list_actions(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<StoryText>, ServiceError> {
    let story = require("message", &request.message)?;
    let text = state.stories.list_actions(story).await?;
    Ok(Json(text))
}
