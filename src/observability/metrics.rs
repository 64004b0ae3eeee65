//! Metrics collection and exposition.
//!
//! # Metrics
//! - `baskets_created_total` (counter)
//! - `baskets_deleted_total` (counter)
//! - `baskets_active` (gauge): current registry size
//! - `basket_requests_captured_total` (counter)
//! - `basket_requests_evicted_total` (counter)
//! - `basket_forwards_total` (counter): by `outcome`
//! - `basket_auth_failures_total` (counter)
//!
//! # Design Decisions
//! - No per-basket labels; basket names are client-chosen and unbounded

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint. Needs a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_basket_created(active: usize) {
    metrics::counter!("baskets_created_total").increment(1);
    metrics::gauge!("baskets_active").set(active as f64);
}

pub fn record_basket_deleted(active: usize) {
    metrics::counter!("baskets_deleted_total").increment(1);
    metrics::gauge!("baskets_active").set(active as f64);
}

pub fn record_capture() {
    metrics::counter!("basket_requests_captured_total").increment(1);
}

pub fn record_eviction() {
    metrics::counter!("basket_requests_evicted_total").increment(1);
}

pub fn record_forward(outcome: &'static str) {
    metrics::counter!("basket_forwards_total", "outcome" => outcome).increment(1);
}

pub fn record_auth_failure() {
    metrics::counter!("basket_auth_failures_total").increment(1);
}
