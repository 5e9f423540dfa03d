//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the completion service:
//!     → operation fails with an UpstreamFailure (failure.rs)
//!     → classify.rs (retryable or terminal)
//!     → backoff.rs (delay for the next attempt, 429-aware)
//!     → retries.rs (sleep, try again, or give up with one normalized error)
//! ```
//!
//! # Design Decisions
//! - Callers normalize their own error shapes; the executor sees one struct
//! - Policy is passed in, not global, so tests can shrink it
//! - Delays go through a Sleeper so tests never wait on a real timer
//! - No jitter: delays are deterministic functions of attempt and failure

pub mod backoff;
pub mod classify;
pub mod failure;
pub mod retries;

pub use classify::{classify, FailureClass};
pub use failure::UpstreamFailure;
pub use retries::{RecordingSleeper, RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
