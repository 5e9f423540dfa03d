//! Story game backend library

pub mod ai;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod story;
pub mod subscription;

pub use config::schema::ServerConfig;
pub use error::{ServiceError, ServiceResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
