//! Page identifier type.

use std::fmt;

/// Identifies a page in the store.
///
/// A `PageId` is a stable surrogate key for one node: it names a page
/// without implying whether the authoritative copy currently sits in the
/// cache (hot) or in the store (cold). Ids are handed out sequentially by
/// [`PageStore::allocate`](crate::storage::PageStore::allocate) and never
/// reused.
///
/// # Example
/// ```
/// use diskbtree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.as_u32(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page": the id a cache starts with before any root
    /// is pinned, and the one value `allocate` will never hand out in
    /// practice.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// The raw id, as encoded into a page's child list.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INVALID => write!(f, "Page(INVALID)"),
            PageId(id) => write!(f, "Page({})", id),
        }
    }
}
