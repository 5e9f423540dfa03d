//! Configuration validation.
//!
//! Serde handles syntax; this pass checks value ranges and reports every
//! problem at once rather than stopping at the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    let retries = &config.retries;
    if retries.initial_delay_ms == 0 {
        errors.push(ValidationError::new("retries.initial_delay_ms", "must be > 0"));
    }
    if retries.max_delay_ms < retries.initial_delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            "must be >= retries.initial_delay_ms",
        ));
    }

    if url::Url::parse(&config.ai.base_url).is_err() {
        errors.push(ValidationError::new(
            "ai.base_url",
            format!("'{}' is not a valid URL", config.ai.base_url),
        ));
    }
    if config.ai.model.trim().is_empty() {
        errors.push(ValidationError::new("ai.model", "must not be empty"));
    }
    if config.ai.request_timeout_secs == 0 {
        errors.push(ValidationError::new("ai.request_timeout_secs", "must be > 0"));
    }

    if config.cache.subscription_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.subscription_ttl_secs", "must be > 0"));
    }

    let subs = &config.subscriptions;
    if subs.sweep_hour_utc > 23 {
        errors.push(ValidationError::new("subscriptions.sweep_hour_utc", "must be 0-23"));
    }
    if subs.default_plan.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "subscriptions.default_plan.name",
            "must not be empty",
        ));
    }
    if subs.default_plan.days_period == 0 {
        errors.push(ValidationError::new(
            "subscriptions.default_plan.days_period",
            "must be > 0",
        ));
    }

    let mut tokens = std::collections::HashSet::new();
    for user in &subs.users {
        if user.token.trim().is_empty() {
            errors.push(ValidationError::new(
                "subscriptions.users.token",
                format!("user {} has an empty token", user.id),
            ));
        } else if !tokens.insert(user.token.as_str()) {
            errors.push(ValidationError::new(
                "subscriptions.users.token",
                format!("token of user {} is already in use", user.id),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.retries.initial_delay_ms = 5000;
        config.retries.max_delay_ms = 100;
        config.ai.base_url = "::nope".into();
        config.subscriptions.sweep_hour_utc = 24;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "retries.max_delay_ms",
                "ai.base_url",
                "subscriptions.sweep_hour_utc",
            ]
        );
    }

    #[test]
    fn test_duplicate_user_tokens() {
        use crate::config::schema::SeedUserConfig;
        use crate::subscription::Role;

        let mut config = ServerConfig::default();
        for id in [1, 2] {
            config.subscriptions.users.push(SeedUserConfig {
                id,
                name: format!("u{id}"),
                role: Role::User,
                token: "shared".into(),
            });
        }

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "token of user 2 is already in use");
    }

    #[test]
    fn test_zero_max_retries_is_allowed() {
        let mut config = ServerConfig::default();
        config.retries.max_retries = 0;
        assert!(validate_config(&config).is_ok());
    }
}
