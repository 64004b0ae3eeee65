//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 `x-request-id` for every request
//! - Parse pagination query parameters leniently
//! - Read the basket token from `Authorization`
//! - Read capture bodies up to a byte limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Bad `max`/`skip` values fall back to defaults instead of rejecting
//! - Oversized capture bodies are truncated, not rejected

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use futures_util::StreamExt;
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::basket::PageRequest;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of a request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Raw `max` / `skip` query values.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub max: Option<String>,
    pub skip: Option<String>,
}

impl PageParams {
    /// Effective page; missing or non-numeric values use the defaults.
    pub fn page(&self, default_max: usize) -> PageRequest {
        let max = parse_int(self.max.as_deref()).unwrap_or(default_max as i64);
        let skip = parse_int(self.skip.as_deref()).unwrap_or(0);
        PageRequest::new(max, skip, default_max)
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Token sent by the client, empty if absent or not valid UTF-8.
pub fn provided_token(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Read a body, keeping at most `limit` bytes.
///
/// Returns the kept bytes and the total number of bytes received.
pub async fn read_limited(body: Body, limit: usize) -> Result<(Vec<u8>, usize), axum::Error> {
    let mut stream = body.into_data_stream();
    let mut kept = Vec::new();
    let mut received = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        received += chunk.len();
        let room = limit.saturating_sub(kept.len());
        if room > 0 {
            kept.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
    }
    Ok((kept, received))
}
