//! Page store - the simulated secondary storage.
//!
//! The [`PageStore`] is the durable owner of every node ever created. It
//! models a disk whose only observable effect is the page traffic against
//! it: the [`PageCache`](crate::cache::PageCache) counts one disk access
//! per `read` or `write` it issues here.

use std::collections::HashMap;

use crate::common::{Error, PageId, Result};
use crate::storage::Node;

/// The single source of truth for a page that is not cached.
///
/// # Contract
/// `read` returns *exactly* the last content written for that page id.
/// Reading a page that was never written is a [`Error::UnwrittenPage`]
/// corruption error: with the tree invariants intact, every reachable page
/// id was written before its node was evicted from the cache.
///
/// # Thread Safety
/// `PageStore` is **single-threaded**. The page cache owns it and
/// serializes all access.
pub struct PageStore {
    /// Encoded page buffers by page id.
    pages: HashMap<PageId, Vec<u8>>,

    /// Next page id to hand out.
    next_page_id: u32,
}

impl PageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            next_page_id: 0,
        }
    }

    /// Allocate a new page id.
    ///
    /// Allocation only reserves the id; the page holds no content until the
    /// first `write`.
    pub fn allocate(&mut self) -> PageId {
        let page_id = PageId::new(self.next_page_id);
        self.next_page_id += 1;
        page_id
    }

    /// Persist or overwrite the full content of a page.
    ///
    /// The simulated medium always succeeds.
    pub fn write(&mut self, page_id: PageId, node: &Node) {
        self.pages.insert(page_id, node.encode());
    }

    /// Read back the exact last-written content of a page.
    ///
    /// # Errors
    /// - [`Error::UnwrittenPage`] if the page was never written
    /// - [`Error::ChecksumMismatch`] / [`Error::MalformedPage`] if the
    ///   stored buffer fails verification
    pub fn read(&self, page_id: PageId) -> Result<Node> {
        let buf = self
            .pages
            .get(&page_id)
            .ok_or(Error::UnwrittenPage(page_id))?;
        Node::decode(page_id, buf)
    }

    /// Number of pages that have been written at least once.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Flip one byte of a stored page, for corruption tests.
    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, page_id: PageId, offset: usize) {
        let buf = self.pages.get_mut(&page_id).expect("page must exist");
        buf[offset] ^= 0xFF;
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}
