//! Service-level error type shared by the story and subscription services.

use thiserror::Error;

/// Prefix of every normalized upstream failure message.
pub const UPSTREAM_FAILURE_PREFIX: &str = "failed to send message";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The completion service failed terminally (or ran out of retries).
    #[error("{UPSTREAM_FAILURE_PREFIX} - {0}")]
    Upstream(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("access denied")]
    Forbidden,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the fault lies with this server or its dependencies rather
    /// than with the caller's input.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServiceError::Upstream(_) | ServiceError::Internal(_))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_embeds_cause() {
        let err = ServiceError::Upstream("503 Service Unavailable".into());
        assert_eq!(err.to_string(), "failed to send message - 503 Service Unavailable");
        assert!(err.is_server_error());
        assert!(!ServiceError::Forbidden.is_server_error());
    }
}
