//! A single basket: name, config, token and request log.

use parking_lot::RwLock;
use serde::Serialize;

use crate::basket::config::BasketConfig;
use crate::basket::log::RequestLog;
use crate::basket::token::{generate_token, tokens_match};

/// Public representation, never carries the token.
#[derive(Debug, Clone, Serialize)]
pub struct BasketView {
    pub name: String,
    #[serde(flatten)]
    pub config: BasketConfig,
}

/// Representation returned once, on creation.
#[derive(Debug, Clone, Serialize)]
pub struct BasketAuthView {
    pub token: String,
    pub name: String,
    #[serde(flatten)]
    pub config: BasketConfig,
}

/// A named capture endpoint.
#[derive(Debug)]
pub struct Basket {
    name: String,
    token: String,
    /// Registry-assigned sequence, orders listings by creation.
    seq: u64,
    config: RwLock<BasketConfig>,
    requests: RequestLog,
}

impl Basket {
    /// Create a basket with a freshly generated token.
    pub fn new(name: impl Into<String>, config: BasketConfig, seq: u64) -> Self {
        Self::with_token(name, config, seq, generate_token())
    }

    pub(crate) fn with_token(
        name: impl Into<String>,
        config: BasketConfig,
        seq: u64,
        token: String,
    ) -> Self {
        let requests = RequestLog::new(config.capacity);
        Self {
            name: name.into(),
            token,
            seq,
            config: RwLock::new(config),
            requests,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Exact, constant-time token check.
    pub fn authenticate(&self, provided: &str) -> bool {
        tokens_match(&self.token, provided)
    }

    /// Snapshot of the current config.
    pub fn config(&self) -> BasketConfig {
        self.config.read().clone()
    }

    /// Forward URL in effect right now.
    pub fn forward_url(&self) -> Option<String> {
        self.config.read().forward_url.clone()
    }

    /// Replace the stored config wholesale.
    ///
    /// The request log keeps the capacity it was created with.
    pub fn update_config(&self, config: BasketConfig) {
        *self.config.write() = config;
    }

    pub fn requests(&self) -> &RequestLog {
        &self.requests
    }

    pub fn to_public_view(&self) -> BasketView {
        BasketView {
            name: self.name.clone(),
            config: self.config(),
        }
    }

    pub fn to_auth_view(&self) -> BasketAuthView {
        BasketAuthView {
            token: self.token.clone(),
            name: self.name.clone(),
            config: self.config(),
        }
    }
}
