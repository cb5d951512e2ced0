//! Cache layer - the bounded FIFO working set of hot pages.
//!
//! # Components
//! - [`PageCache`] - capacity-bounded page cache with strict FIFO eviction
//! - [`AccessStats`] / [`StatsSnapshot`] - disk-access accounting

mod page_cache;
mod stats;

pub use page_cache::PageCache;
pub use stats::{AccessStats, StatsSnapshot};
