//! Completion service integration.
//!
//! # Data Flow
//! ```text
//! story service builds a prompt
//!     → client.rs (HTTP POST, bearer token, per-attempt timeout)
//!     → types.rs (request/response wire shapes)
//!     → text, or an UpstreamFailure for the retry executor
//! ```

pub mod client;
pub mod types;

pub use client::{CompletionBackend, HttpCompletionClient};
