//! Bounded, thread-safe request history.
//!
//! # Design Decisions
//! - Ring buffer over a `VecDeque`: O(1) append, O(1) eviction of the oldest
//! - One lock per log, so busy baskets never block each other
//! - `add` and `clear` take the write lock; reads share the read lock
//! - Lifetime insertion counter survives `clear`

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;

use crate::basket::page::PageRequest;
use crate::basket::record::RequestRecord;

/// A page of captured requests, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPage {
    pub requests: Vec<RequestRecord>,
    /// Records currently held.
    pub count: usize,
    /// Records ever inserted.
    pub total_count: u64,
    pub has_more: bool,
    pub max: usize,
    pub skip: usize,
}

struct LogState {
    records: VecDeque<RequestRecord>,
    total_count: u64,
    last_date: u64,
}

/// Capacity-limited FIFO of request records.
pub struct RequestLog {
    capacity: usize,
    state: RwLock<LogState>,
}

impl RequestLog {
    /// Create an empty log holding at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: RwLock::new(LogState {
                records: VecDeque::with_capacity(capacity),
                total_count: 0,
                last_date: 0,
            }),
        }
    }

    /// Append a record, evicting the oldest one when full.
    ///
    /// Returns the evicted record, if any.
    pub fn add(&self, mut record: RequestRecord) -> Option<RequestRecord> {
        let mut state = self.state.write();

        // Dates are the sort key and must not go backwards within a log.
        if record.date < state.last_date {
            record.date = state.last_date;
        }
        state.last_date = record.date;

        let evicted = if state.records.len() >= self.capacity {
            state.records.pop_front()
        } else {
            None
        };
        state.records.push_back(record);
        state.total_count += 1;
        evicted
    }

    /// Drop every stored record.
    pub fn clear(&self) {
        self.state.write().records.clear();
    }

    /// Read a page of records, newest first.
    pub fn page(&self, page: PageRequest) -> RequestPage {
        let state = self.state.read();
        let len = state.records.len();
        let (range, has_more) = page.window(len);

        let requests = state
            .records
            .iter()
            .rev()
            .skip(range.start)
            .take(range.len())
            .cloned()
            .collect();

        RequestPage {
            requests,
            count: len,
            total_count: state.total_count,
            has_more,
            max: page.max,
            skip: page.skip,
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records ever inserted.
    pub fn total_count(&self) -> u64 {
        self.state.read().total_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RequestLog")
            .field("capacity", &self.capacity)
            .field("count", &state.records.len())
            .field("total_count", &state.total_count)
            .finish()
    }
}
