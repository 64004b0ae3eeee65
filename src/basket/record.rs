//! Captured request snapshots.

use axum::http::{request::Parts, HeaderMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Header name -> values, in arrival order per name.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Immutable snapshot of one captured HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Arrival time in milliseconds since the Unix epoch.
    pub date: u64,
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    pub headers: Headers,
    /// Raw body bytes, truncated to the capture limit. Rendered as text in JSON.
    #[serde(serialize_with = "body_as_text", deserialize_with = "body_from_text")]
    pub body: Vec<u8>,
    /// Bytes received before truncation.
    pub content_length: usize,
    pub remote_addr: String,
}

impl RequestRecord {
    /// Snapshot a request from its parts and (already limited) body.
    ///
    /// `received` is the number of body bytes that arrived, which may exceed
    /// `body.len()` when the capture limit truncated it.
    pub fn capture(parts: &Parts, body: &[u8], received: usize, remote: SocketAddr) -> Self {
        Self {
            date: now_millis(),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            headers: collect_headers(&parts.headers),
            body: body.to_vec(),
            content_length: received,
            remote_addr: remote.to_string(),
        }
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }
}

/// Group header values by name, keeping repeated headers.
pub fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers.iter() {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

fn body_as_text<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}

fn body_from_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    String::deserialize(deserializer).map(String::into_bytes)
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
pub(crate) fn test_record(path: &str) -> RequestRecord {
    RequestRecord {
        date: now_millis(),
        method: "POST".to_string(),
        path: path.to_string(),
        query: String::new(),
        headers: Headers::new(),
        body: Vec::new(),
        content_length: 0,
        remote_addr: "127.0.0.1:40000".to_string(),
    }
}
