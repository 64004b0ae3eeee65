//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::basket::page::DEFAULT_PAGE_SIZE;

/// Root configuration for the basket service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Basket defaults and limits.
    pub baskets: BasketSettings,

    /// Forwarding behaviour.
    pub forwarding: ForwardingSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// The part of the config that can change while running.
    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            baskets: self.baskets.clone(),
            forwarding: self.forwarding.clone(),
        }
    }
}

/// Hot-reloadable settings, swapped atomically on config change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSettings {
    pub baskets: BasketSettings,
    pub forwarding: ForwardingSettings,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:55555").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:55555".to_string(),
        }
    }
}

/// Basket defaults and limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BasketSettings {
    /// Capacity of a basket created without one.
    pub default_capacity: usize,

    /// Largest capacity a client may request.
    pub max_capacity: usize,

    /// Page size when `max` is missing or invalid.
    pub page_size: usize,

    /// Maximum size of a create/update config body in bytes.
    pub config_body_limit: usize,

    /// Captured bodies are truncated to this many bytes.
    pub max_capture_body_bytes: usize,
}

impl Default for BasketSettings {
    fn default() -> Self {
        Self {
            default_capacity: 200,
            max_capacity: 2000,
            page_size: DEFAULT_PAGE_SIZE,
            config_body_limit: 2048,
            max_capture_body_bytes: 64 * 1024,
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForwardingSettings {
    /// Relay captured requests to configured forward URLs.
    pub enabled: bool,

    /// Per-relay timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ForwardingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
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
