//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::subscription::Role;

/// Root configuration for the story server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry policy for calls to the completion service.
    pub retries: RetryConfig,

    /// Completion service settings.
    pub ai: AiConfig,

    /// Key-value cache settings.
    pub cache: CacheConfig,

    /// Subscription plans and the expiry sweep.
    pub subscriptions: SubscriptionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 256 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for the subscription and health routes, in seconds.
    ///
    /// Story routes are not covered; their retry sequence is never cut short.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts allowed after the first one.
    pub max_retries: u32,

    /// Base backoff unit in milliseconds.
    pub initial_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the chat completion API.
    pub base_url: String,

    /// Model name sent with every completion request.
    pub model: String,

    /// Bearer token. Overridden by the `AI_TOKEN` environment variable.
    pub api_token: String,

    /// Per-attempt HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gigachat.devices.sberbank.ru/api/v1".to_string(),
            model: "GigaChat:latest".to_string(),
            api_token: String::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Key-value cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of cached subscription lookups in seconds.
    pub subscription_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            subscription_ttl_secs: 3600,
        }
    }
}

/// Subscription configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Plan created at startup when no plan with the same name exists.
    pub default_plan: DefaultPlanConfig,

    /// Run the expiry sweep.
    pub sweep_enabled: bool,

    /// UTC hour (0-23) at which the daily expiry sweep runs.
    pub sweep_hour_utc: u32,

    /// Accounts loaded into the in-process user directory at startup.
    pub users: Vec<SeedUserConfig>,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            default_plan: DefaultPlanConfig::default(),
            sweep_enabled: true,
            sweep_hour_utc: 0,
            users: Vec::new(),
        }
    }
}

/// The plan seeded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultPlanConfig {
    pub name: String,
    pub description: String,
    pub price: String,
    pub days_period: u32,
}

impl Default for DefaultPlanConfig {
    fn default() -> Self {
        Self {
            name: "Well-Read".to_string(),
            description: "No ads at all. +10 karma".to_string(),
            price: "300".to_string(),
            days_period: 30,
        }
    }
}

/// A user account and the bearer token that resolves to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUserConfig {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub token: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
