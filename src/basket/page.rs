//! Pagination shared by basket listing and request history.

use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// An effective page window after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub max: usize,
    pub skip: usize,
}

impl PageRequest {
    /// Clamp raw values: non-positive `max` becomes `default_max`,
    /// negative `skip` becomes 0. Never rejects.
    pub fn new(max: i64, skip: i64, default_max: usize) -> Self {
        let max = if max <= 0 { default_max.max(1) } else { max as usize };
        let skip = if skip < 0 { 0 } else { skip as usize };
        Self { max, skip }
    }

    /// Index range into a sequence of `len` items, and whether more follow.
    pub fn window(&self, len: usize) -> (std::ops::Range<usize>, bool) {
        let start = self.skip.min(len);
        let end = start.saturating_add(self.max).min(len);
        (start..end, end < len)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { max: DEFAULT_PAGE_SIZE, skip: 0 }
    }
}
