//! Structured description of a failed upstream call.
//!
//! Callers translate whatever their transport produced (reqwest errors, HTTP
//! status lines, JSON error bodies) into an [`UpstreamFailure`] before handing
//! it to the retry executor. The executor never inspects transport types.

use std::fmt;

/// Description used when a failure carries no text at all.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Minimal, transport-agnostic view of a failed attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// Primary failure text.
    pub message: Option<String>,
    /// Numeric status, wherever the transport reported it.
    pub status: Option<u16>,
    /// String-valued error code (e.g. `ETIMEDOUT`).
    pub code: Option<String>,
    /// Retry-after hint in seconds, unparsed.
    pub retry_after: Option<String>,
    /// `message` field of the upstream's error body.
    pub response_message: Option<String>,
    /// `error` field of the upstream's error body.
    pub response_error: Option<String>,
}

impl UpstreamFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A failure that only carries a status code.
    pub fn from_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_retry_after(mut self, hint: impl Into<String>) -> Self {
        self.retry_after = Some(hint.into());
        self
    }

    pub fn with_response_message(mut self, message: impl Into<String>) -> Self {
        self.response_message = Some(message.into());
        self
    }

    pub fn with_response_error(mut self, error: impl Into<String>) -> Self {
        self.response_error = Some(error.into());
        self
    }

    /// Best-effort human readable description.
    ///
    /// Priority: explicit message, then the body's `message`, then the body's
    /// `error`, then [`UNKNOWN_ERROR`]. Empty strings count as absent.
    pub fn describe(&self) -> &str {
        [&self.message, &self.response_message, &self.response_error]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ERROR)
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl std::error::Error for UpstreamFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_priority() {
        let failure = UpstreamFailure::new("top")
            .with_response_message("body message")
            .with_response_error("body error");
        assert_eq!(failure.describe(), "top");

        let failure = UpstreamFailure::from_status(500)
            .with_response_message("body message")
            .with_response_error("body error");
        assert_eq!(failure.describe(), "body message");

        let failure = UpstreamFailure::from_status(500).with_response_error("body error");
        assert_eq!(failure.describe(), "body error");

        assert_eq!(UpstreamFailure::from_status(500).describe(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_empty_message_is_skipped() {
        let failure = UpstreamFailure::new("").with_response_error("quota exceeded");
        assert_eq!(failure.to_string(), "quota exceeded");
    }
}
