//! DiskBTree - a disk-backed B-tree index with a FIFO page cache and
//! disk-access accounting.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                       DiskBTree                       │
//! ├───────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │              Index Layer (index/)               │  │
//! │  │        BTree: search / insert / split           │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                          ↓                            │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │              Cache Layer (cache/)               │  │
//! │  │   PageCache (strict FIFO) + AccessStats         │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                          ↓                            │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │             Storage Layer (storage/)            │  │
//! │  │   PageStore + Node encoding (CRC32 checksums)   │  │
//! │  └─────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The "disk" here is a simulated page store: its only observable effect is
//! a logical access counter. Every node traversal below the root goes
//! through the [`PageCache`], so cache misses and evictions are the exact
//! cost model the index reports via [`BTree::total_disk_accesses`].
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - The simulated page store and node wire format
//! - [`cache`] - The FIFO page cache and access statistics
//! - [`index`] - The B-tree itself
//!
//! # Quick Start
//! ```
//! use diskbtree::BTree;
//!
//! // Minimum degree 2, RAM budget of 64 key slots.
//! let mut tree = BTree::new(2, 64);
//!
//! tree.insert(42, 1000).unwrap();
//! let record = tree.search(42).unwrap().unwrap();
//! assert_eq!(record.payload, 1000);
//!
//! // Every page read or write against the store is one disk access.
//! println!("disk accesses: {}", tree.total_disk_accesses());
//! ```

pub mod cache;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use cache::{AccessStats, PageCache, StatsSnapshot};
pub use common::{Error, PageId, Result};
pub use index::BTree;
pub use storage::{Node, PageStore, Record};
