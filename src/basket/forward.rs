//! Best-effort relay of captured requests.
//!
//! # Responsibilities
//! - Rebuild a captured request and send it to the basket's forward URL
//! - Keep the basket token away from the forward target
//! - Bound every relay with a timeout
//!
//! # Design Decisions
//! - Each relay runs on its own detached task, after the log mutation,
//!   holding no registry or log lock
//! - Fire-once: failures are logged and counted, never retried or surfaced
//! - Deleting a basket does not cancel relays already in flight

use arc_swap::ArcSwap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use url::Url;

use crate::basket::record::RequestRecord;
use crate::config::ServiceSettings;
use crate::observability::metrics;

/// Headers never relayed to the forward target.
const STRIPPED_HEADERS: &[&str] = &[
    "authorization",
    "host",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Why a relay did not succeed. Stays inside the forwarder.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid forward target '{0}'")]
    InvalidTarget(String),

    #[error("invalid method '{0}'")]
    InvalidMethod(String),

    #[error("forward request timed out")]
    Timeout,

    #[error("forward request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("forward target responded with {0}")]
    Status(StatusCode),
}

/// Dispatches captured requests to their basket's forward URL.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    settings: Arc<ArcSwap<ServiceSettings>>,
}

impl Forwarder {
    pub fn new(settings: Arc<ArcSwap<ServiceSettings>>) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Relay `record` to `target` on a detached task.
    ///
    /// Returns `None` when forwarding is disabled service-wide. Callers are not
    /// expected to await the handle.
    pub fn forward(
        &self,
        basket: &str,
        record: RequestRecord,
        target: String,
    ) -> Option<JoinHandle<()>> {
        let settings = self.settings.load();
        if !settings.forwarding.enabled {
            tracing::debug!(basket = %basket, "Forwarding disabled, skipping relay");
            return None;
        }
        let timeout = Duration::from_secs(settings.forwarding.timeout_secs);

        let client = self.client.clone();
        let basket = basket.to_string();
        Some(tokio::spawn(async move {
            match send(&client, &record, &target, timeout).await {
                Ok(status) => {
                    metrics::record_forward("success");
                    tracing::debug!(
                        basket = %basket,
                        target = %target,
                        status = %status,
                        "Request forwarded"
                    );
                }
                Err(e) => {
                    metrics::record_forward(outcome_label(&e));
                    tracing::warn!(
                        basket = %basket,
                        target = %target,
                        error = %e,
                        "Forwarding failed"
                    );
                }
            }
        }))
    }
}

fn outcome_label(err: &ForwardError) -> &'static str {
    match err {
        ForwardError::Timeout => "timeout",
        ForwardError::Status(_) => "bad_status",
        ForwardError::InvalidTarget(_) | ForwardError::InvalidMethod(_) => "invalid",
        ForwardError::Request(_) => "error",
    }
}

async fn send(
    client: &Client,
    record: &RequestRecord,
    target: &str,
    timeout: Duration,
) -> Result<StatusCode, ForwardError> {
    let url = target_url(target, &record.query)?;
    let method = Method::from_bytes(record.method.as_bytes())
        .map_err(|_| ForwardError::InvalidMethod(record.method.clone()))?;

    let request = client
        .request(method, url)
        .headers(relay_headers(record))
        .body(record.body.clone())
        .timeout(timeout);

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ForwardError::Timeout
        } else {
            ForwardError::Request(e)
        }
    })?;

    let status = response.status();
    if status.is_success() {
        Ok(status)
    } else {
        Err(ForwardError::Status(status))
    }
}

/// Forward target with the captured query string appended.
fn target_url(target: &str, query: &str) -> Result<Url, ForwardError> {
    let mut url = Url::parse(target).map_err(|_| ForwardError::InvalidTarget(target.to_string()))?;
    if !query.is_empty() {
        let merged = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
            _ => query.to_string(),
        };
        url.set_query(Some(&merged));
    }
    Ok(url)
}

fn relay_headers(record: &RequestRecord) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, values) in &record.headers {
        if STRIPPED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            continue;
        };
        for value in values {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.append(name.clone(), value);
            }
        }
    }
    headers
}
