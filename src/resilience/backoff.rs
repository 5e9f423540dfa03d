//! Exponential backoff without jitter.
//!
//! Two curves:
//! - generic transient failures: `min(initial * 2^attempt, max)`
//! - rate limiting (429) without a usable retry-after hint:
//!   `min(initial * 2^(attempt + 2), max * 2)`
//!
//! A parseable retry-after hint on a 429 overrides both curves.

use std::time::Duration;

use crate::resilience::classify::is_rate_limited;
use crate::resilience::failure::UpstreamFailure;
use crate::resilience::retries::RetryPolicy;

/// Delay before the attempt following the zero-based `attempt` that failed.
pub fn calculate_backoff(policy: &RetryPolicy, attempt: u32, failure: &UpstreamFailure) -> Duration {
    let initial_ms = millis(policy.initial_delay);
    let max_ms = millis(policy.max_delay);

    let delay_ms = if is_rate_limited(failure) {
        match failure.retry_after.as_deref().and_then(parse_retry_after) {
            Some(secs) => secs.saturating_mul(1000),
            None => exponential(initial_ms, attempt.saturating_add(2), max_ms.saturating_mul(2)),
        }
    } else {
        exponential(initial_ms, attempt, max_ms)
    };

    Duration::from_millis(delay_ms)
}

/// `min(base * 2^exponent, cap)` with saturating arithmetic.
pub fn exponential(base_ms: u64, exponent: u32, cap_ms: u64) -> u64 {
    let factor = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(cap_ms)
}

/// Parse a retry-after hint in whole seconds.
///
/// Leading whitespace is ignored and trailing garbage after the digits is
/// dropped (`"7s"` → 7). Anything without leading digits, including negative
/// numbers and HTTP dates, is unparseable.
pub fn parse_retry_after(hint: &str) -> Option<u64> {
    let trimmed = hint.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
