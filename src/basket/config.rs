//! Per-basket configuration and its validation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::BasketSettings;
use crate::error::{BasketError, BasketResult};

/// Paths owned by the service itself that cannot be basket names.
pub const RESERVED_NAMES: &[&str] = &["baskets", "health"];

/// Longest accepted basket name.
pub const MAX_NAME_LENGTH: usize = 250;

/// Configuration of a single basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketConfig {
    /// Absolute URL that captured requests are relayed to.
    #[serde(default, alias = "forward_url", skip_serializing_if = "Option::is_none")]
    pub forward_url: Option<String>,

    /// Maximum number of requests kept in the basket.
    pub capacity: usize,
}

/// Body shape accepted on create/update; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasketConfigBody {
    #[serde(default, alias = "forward_url")]
    forward_url: Option<String>,
    #[serde(default)]
    capacity: Option<i64>,
}

impl BasketConfig {
    /// Default config for a new basket.
    pub fn with_defaults(settings: &BasketSettings) -> Self {
        Self {
            forward_url: None,
            capacity: settings.default_capacity,
        }
    }

    /// Parse and validate a JSON config body.
    ///
    /// An empty (or whitespace-only) body yields the defaults.
    pub fn from_body(body: &[u8], settings: &BasketSettings) -> BasketResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::with_defaults(settings));
        }

        let parsed: BasketConfigBody = serde_json::from_slice(body)
            .map_err(|e| BasketError::Validation(format!("invalid basket config: {}", e)))?;

        let capacity = match parsed.capacity {
            None => settings.default_capacity,
            Some(c) if c <= 0 => {
                return Err(BasketError::Validation(format!(
                    "capacity must be positive, got {}",
                    c
                )))
            }
            Some(c) if c as u64 > settings.max_capacity as u64 => {
                return Err(BasketError::Validation(format!(
                    "capacity {} exceeds maximum {}",
                    c, settings.max_capacity
                )))
            }
            Some(c) => c as usize,
        };

        let forward_url = match parsed.forward_url {
            Some(url) if !url.is_empty() => Some(validate_forward_url(&url)?),
            _ => None,
        };

        Ok(Self { forward_url, capacity })
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_forward_url(raw: &str) -> BasketResult<String> {
    let url = Url::parse(raw)
        .map_err(|e| BasketError::Validation(format!("invalid forward URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url.to_string()),
        _ => Err(BasketError::Validation(format!(
            "forward URL must be an absolute http(s) URL, got '{}'",
            raw
        ))),
    }
}

/// Check that a basket name is usable as a single path segment.
pub fn validate_name(name: &str) -> BasketResult<()> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(BasketError::Validation(format!(
            "basket name must be 1 to {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
    {
        return Err(BasketError::Validation(format!(
            "invalid basket name '{}'",
            name
        )));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(BasketError::Validation(format!(
            "basket name '{}' is reserved",
            name
        )));
    }
    Ok(())
}
