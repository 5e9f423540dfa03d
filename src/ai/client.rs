//! Chat completion client.
//!
//! # Responsibilities
//! - POST a single-message conversation to `{base_url}/chat/completions`
//! - Return the first choice's text
//! - Translate transport and HTTP failures into [`UpstreamFailure`]
//!
//! Retries are not done here; the story service wraps each call in the
//! retry executor.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};

use crate::ai::types::{ApiErrorBody, ChatMessage, CompletionRequest, CompletionResponse};
use crate::config::AiConfig;
use crate::error::ServiceError;
use crate::resilience::classify::{CODE_RESET, CODE_TIMEOUT};
use crate::resilience::UpstreamFailure;

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure>;
}

/// HTTP implementation of [`CompletionBackend`].
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_token: String,
}

impl HttpCompletionClient {
    pub fn new(config: &AiConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_token", &!self.api_token.is_empty())
            .finish()
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if !self.api_token.is_empty() {
            builder = builder.bearer_auth(&self.api_token);
        }

        let response = builder.send().await.map_err(transport_failure)?;
        if !response.status().is_success() {
            return Err(status_failure(response).await);
        }

        let bytes = response.bytes().await.map_err(transport_failure)?;
        let body: CompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamFailure::new(format!("invalid completion response: {e}")))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| UpstreamFailure::new("completion response contained no choices"))?;

        tracing::debug!(model = %self.model, chars = text.len(), "Completion received");
        Ok(text)
    }
}

/// Map a reqwest transport error (no HTTP status) to a failure description.
pub fn transport_failure(err: reqwest::Error) -> UpstreamFailure {
    if err.is_timeout() {
        return UpstreamFailure::new(format!("{CODE_TIMEOUT}: {err}")).with_code(CODE_TIMEOUT);
    }
    if connection_reset(&err) {
        return UpstreamFailure::new(format!("{CODE_RESET}: {err}")).with_code(CODE_RESET);
    }
    if err.is_connect() || err.is_request() {
        return UpstreamFailure::new(format!("Network error: {err}"));
    }
    UpstreamFailure::new(err.to_string())
}

fn connection_reset(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

/// Map a non-2xx response to a failure description.
async fn status_failure(response: Response) -> UpstreamFailure {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body: ApiErrorBody = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => ApiErrorBody::default(),
    };

    let status_line = match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    };
    let message = match body.message.as_deref().or(body.error.as_deref()) {
        Some(detail) if !detail.is_empty() => format!("{status_line}: {detail}"),
        _ => status_line,
    };

    let mut failure = UpstreamFailure::new(message).with_status(status.as_u16());
    failure.retry_after = retry_after;
    failure.response_message = body.message;
    failure.response_error = body.error;
    failure
}
