//! Error types for DiskBTree.
//!
//! All variants are corruption-class: they signal an invariant violation in
//! the page store, never a transient condition. Nothing here is retried,
//! and a missing key is *not* an error - search returns `Option<Record>`.

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write
/// `Result<T>`. This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in DiskBTree.
///
/// With the tree invariants intact none of these can occur: every `PageId`
/// reachable from a node's children resolves to a page that was written
/// before it was ever evicted. Each variant therefore indicates a logic bug
/// and must propagate to the caller rather than be swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The store was asked for a page that was never written.
    #[error("{0} has never been written")]
    UnwrittenPage(PageId),

    /// A stored page failed CRC32 verification.
    #[error("{0} failed checksum verification")]
    ChecksumMismatch(PageId),

    /// A stored page is too short or internally inconsistent to decode.
    #[error("{0} is truncated or malformed")]
    MalformedPage(PageId),
}
