//! Disk-access statistics tracking.
//!
//! Disk accesses are a logical counter, not wall-clock latency: one unit
//! per page read from or written to the store. Hits are tallied too, but
//! they are free by definition.

use std::fmt;

/// Counters maintained by the page cache.
///
/// Plain integers, no atomics: the whole design is single-threaded by
/// contract, every operation runs to completion under `&mut self`.
#[derive(Debug, Default)]
pub struct AccessStats {
    pub(crate) hits: u64,
    pub(crate) misses: u64,
    pub(crate) evictions: u64,
    pub(crate) reads: u64,
    pub(crate) writes: u64,
}

impl AccessStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total disk accesses: page reads plus page writes.
    #[inline]
    pub fn disk_accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Number of fetches served without touching the store.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of fetches that had to read from the store.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of pages evicted (each one costs a write).
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Number of pages read from the store.
    #[inline]
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of pages written to the store.
    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get a detached copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            reads: self.reads,
            writes: self.writes,
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A point-in-time copy of the access counters.
///
/// Safe to hold across further cache activity; consumers that aggregate
/// per-round minima/maxima/averages work with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub reads: u64,
    pub writes: u64,
}

impl StatsSnapshot {
    /// Total disk accesses: page reads plus page writes.
    #[inline]
    pub fn disk_accesses(&self) -> u64 {
        self.reads + self.writes
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, accesses: {} }}",
            self.hits,
            self.misses,
            self.evictions,
            self.reads,
            self.writes,
            self.disk_accesses()
        )
    }
}
