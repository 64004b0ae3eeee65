//! Basket storage engine.
//!
//! # Data Flow
//! ```text
//! Inbound capture (any path under /{name}/...)
//!     → registry.rs (resolve basket by name)
//!     → log.rs (append record, evict oldest when full)
//!     → forward.rs (detached relay, if a forward URL is set)
//!
//! Administration (/baskets/...)
//!     → registry.rs (create / get / delete / list)
//!     → basket.rs (token check, config, views)
//!     → log.rs (page / clear)
//! ```
//!
//! # Design Decisions
//! - One lock domain per basket log; the registry uses a sharded map
//! - Tokens are generated once and only revealed by `create`
//! - Forwarding never blocks or fails a capture

pub mod basket;
pub mod config;
pub mod forward;
pub mod log;
pub mod page;
pub mod record;
pub mod registry;
pub mod token;

pub use basket::{Basket, BasketAuthView, BasketView};
pub use config::BasketConfig;
pub use forward::Forwarder;
pub use log::{RequestLog, RequestPage};
pub use page::PageRequest;
pub use record::RequestRecord;
pub use registry::{BasketPage, BasketRegistry};

use crate::error::BasketResult;
use crate::observability::metrics;

/// Record an inbound request into the named basket and relay it if configured.
///
/// Returns once the record is stored; forwarding continues in the background.
pub fn capture(
    registry: &BasketRegistry,
    forwarder: &Forwarder,
    name: &str,
    record: RequestRecord,
) -> BasketResult<()> {
    let basket = registry.get(name)?;
    let forward_url = basket.forward_url();

    // Keep a copy for the relay only when one will happen.
    let relay = forward_url.as_ref().map(|_| record.clone());

    if basket.requests().add(record).is_some() {
        metrics::record_eviction();
    }
    metrics::record_capture();

    if let (Some(target), Some(record)) = (forward_url, relay) {
        forwarder.forward(name, record, target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::record::test_record;
    use crate::config::ServiceSettings;
    use crate::error::BasketError;
    use arc_swap::ArcSwap;
    use std::sync::Arc;

    fn forwarder() -> Forwarder {
        let mut settings = ServiceSettings::default();
        settings.forwarding.timeout_secs = 1;
        Forwarder::new(Arc::new(ArcSwap::from_pointee(settings)))
    }

    #[tokio::test]
    async fn test_demo_scenario() {
        let registry = BasketRegistry::new();
        let forwarder = forwarder();
        let basket = registry
            .create("demo", BasketConfig { forward_url: None, capacity: 2 })
            .unwrap();
        let token = basket.to_auth_view().token;
        assert!(!token.is_empty());

        for path in ["/demo/A", "/demo/B", "/demo/C"] {
            capture(&registry, &forwarder, "demo", test_record(path)).unwrap();
        }

        let page = registry.get("demo").unwrap().requests().page(PageRequest::new(10, 0, 20));
        let paths: Vec<_> = page.requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/demo/C", "/demo/B"]);
        assert_eq!(page.count, 2);
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_capture_unknown_basket() {
        let registry = BasketRegistry::new();
        let err = capture(&registry, &forwarder(), "ghost", test_record("/ghost")).unwrap_err();
        assert_eq!(err, BasketError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn test_capture_with_unreachable_forward() {
        let registry = BasketRegistry::new();
        registry
            .create(
                "fwd",
                BasketConfig {
                    forward_url: Some("http://127.0.0.1:9/hook".into()),
                    capacity: 5,
                },
            )
            .unwrap();

        capture(&registry, &forwarder(), "fwd", test_record("/fwd")).unwrap();
        assert_eq!(registry.get("fwd").unwrap().requests().len(), 1);
    }
}
