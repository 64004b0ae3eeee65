//! Process-wide basket registry.
//!
//! # Responsibilities
//! - Own every basket, keyed by unique name
//! - Create, look up and delete baskets
//! - List names in creation order, paginated
//!
//! # Design Decisions
//! - `DashMap` gives sharded locking; baskets are fully built before insert
//! - Baskets are handed out as `Arc`, so a deleted basket stays usable by
//!   whoever already holds it
//! - Listing order comes from a monotonically increasing creation sequence

use dashmap::{mapref::entry::Entry, DashMap};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::basket::basket::Basket;
use crate::basket::config::BasketConfig;
use crate::basket::page::PageRequest;
use crate::error::{BasketError, BasketResult};
use crate::observability::metrics;

/// A page of basket names.
#[derive(Debug, Clone, Serialize)]
pub struct BasketPage {
    pub names: Vec<String>,
    /// Registry size at listing time.
    pub count: usize,
    pub has_more: bool,
    pub max: usize,
    pub skip: usize,
}

/// Name -> basket map.
#[derive(Debug, Default)]
pub struct BasketRegistry {
    baskets: DashMap<String, Arc<Basket>>,
    next_seq: AtomicU64,
}

impl BasketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new basket under `name`.
    ///
    /// Fails with `Conflict` if the name is taken; the existing basket is untouched.
    pub fn create(&self, name: &str, config: BasketConfig) -> BasketResult<Arc<Basket>> {
        // The entry guard holds a shard lock; `len()` must wait until it drops.
        let basket = match self.baskets.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(BasketError::Conflict(name.to_string())),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                let basket = Arc::new(Basket::new(name, config, seq));
                slot.insert(basket.clone());
                basket
            }
        };
        metrics::record_basket_created(self.baskets.len());
        Ok(basket)
    }

    /// Look up a basket by name. Does not authenticate.
    pub fn get(&self, name: &str) -> BasketResult<Arc<Basket>> {
        self.baskets
            .get(name)
            .map(|r| r.value().clone())
            .ok_or_else(|| BasketError::NotFound(name.to_string()))
    }

    /// Remove a basket and its history.
    pub fn delete(&self, name: &str) -> BasketResult<()> {
        match self.baskets.remove(name) {
            Some(_) => {
                metrics::record_basket_deleted(self.baskets.len());
                Ok(())
            }
            None => Err(BasketError::NotFound(name.to_string())),
        }
    }

    /// List names in creation order.
    pub fn list(&self, page: PageRequest) -> BasketPage {
        let mut entries: Vec<(u64, String)> = self
            .baskets
            .iter()
            .map(|r| (r.value().seq(), r.key().clone()))
            .collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);

        let count = entries.len();
        let (range, has_more) = page.window(count);
        let names = entries
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .map(|(_, name)| name)
            .collect();

        BasketPage {
            names,
            count,
            has_more,
            max: page.max,
            skip: page.skip,
        }
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}
