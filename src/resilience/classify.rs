//! Retryable vs terminal classification of upstream failures.

use crate::resilience::failure::UpstreamFailure;

/// Error code reported for timed-out connections or requests.
pub const CODE_TIMEOUT: &str = "ETIMEDOUT";
/// Error code reported for connections reset by the peer.
pub const CODE_RESET: &str = "ECONNRESET";

/// Case-sensitive markers that make a failure retryable when they appear
/// anywhere in its description.
pub const RETRYABLE_MARKERS: &[&str] = &[
    CODE_TIMEOUT,
    CODE_RESET,
    "ENOTFOUND",
    "Network error",
    "Too Many Requests",
];

/// Status codes worth retrying: rate limiting and upstream gateway trouble.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 502, 503, 504];

/// Status signalling rate limiting; gets its own backoff curve.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient infrastructure trouble; eligible for another attempt.
    Retryable,
    /// Anything else.
    Terminal,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::Retryable)
    }
}

/// Classify a failed attempt.
pub fn classify(failure: &UpstreamFailure) -> FailureClass {
    let description = failure.describe();
    let by_message = RETRYABLE_MARKERS.iter().any(|m| description.contains(m));
    let by_status = failure
        .status
        .is_some_and(|s| RETRYABLE_STATUSES.contains(&s));
    let by_code = failure
        .code
        .as_deref()
        .is_some_and(|c| c == CODE_TIMEOUT || c == CODE_RESET);

    if by_message || by_status || by_code {
        FailureClass::Retryable
    } else {
        FailureClass::Terminal
    }
}

/// Whether the failure was a rate-limit rejection.
pub fn is_rate_limited(failure: &UpstreamFailure) -> bool {
    failure.status == Some(STATUS_TOO_MANY_REQUESTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_markers() {
        for msg in [
            "connect ETIMEDOUT 10.0.0.1:443",
            "read ECONNRESET",
            "getaddrinfo ENOTFOUND api.example.com",
            "Network error: connection refused",
            "429 Too Many Requests",
        ] {
            assert_eq!(classify(&UpstreamFailure::new(msg)), FailureClass::Retryable, "{msg}");
        }
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert_eq!(
            classify(&UpstreamFailure::new("network error")),
            FailureClass::Terminal
        );
        assert_eq!(
            classify(&UpstreamFailure::new("too many requests")),
            FailureClass::Terminal
        );
    }

    #[test]
    fn test_marker_in_response_body() {
        let failure = UpstreamFailure::from_status(500).with_response_error("upstream ECONNRESET");
        assert!(classify(&failure).is_retryable());
    }

    #[test]
    fn test_statuses() {
        for status in [429, 502, 503, 504] {
            assert!(classify(&UpstreamFailure::from_status(status)).is_retryable());
        }
        for status in [400, 401, 403, 404, 422, 500, 501] {
            assert!(!classify(&UpstreamFailure::from_status(status)).is_retryable());
        }
    }

    #[test]
    fn test_codes() {
        assert!(classify(&UpstreamFailure::default().with_code(CODE_TIMEOUT)).is_retryable());
        assert!(classify(&UpstreamFailure::default().with_code(CODE_RESET)).is_retryable());
        assert!(!classify(&UpstreamFailure::default().with_code("EACCES")).is_retryable());
    }

    #[test]
    fn test_plain_failure_is_terminal() {
        assert_eq!(
            classify(&UpstreamFailure::new("Cannot read properties of undefined")),
            FailureClass::Terminal
        );
        assert_eq!(classify(&UpstreamFailure::default()), FailureClass::Terminal);
    }
}
