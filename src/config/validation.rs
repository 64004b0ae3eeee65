//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities > 0, timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Check a parsed config for values that cannot work.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let baskets = &config.baskets;
    if baskets.default_capacity == 0 {
        errors.push(ValidationError::new("baskets.default_capacity", "must be positive"));
    }
    if baskets.max_capacity < baskets.default_capacity {
        errors.push(ValidationError::new(
            "baskets.max_capacity",
            "must not be below default_capacity",
        ));
    }
    if baskets.page_size == 0 {
        errors.push(ValidationError::new("baskets.page_size", "must be positive"));
    }
    if baskets.config_body_limit == 0 {
        errors.push(ValidationError::new("baskets.config_body_limit", "must be positive"));
    }

    if config.forwarding.timeout_secs == 0 {
        errors.push(ValidationError::new("forwarding.timeout_secs", "must be positive"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
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
