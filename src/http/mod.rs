//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, bearer token, metrics)
//!     → story.rs / subscription.rs (handlers)
//!     → response.rs (service errors → status + JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod story;
pub mod subscription;

pub use request::{BearerToken, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{AppState, HttpServer};
