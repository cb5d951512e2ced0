//! Page cache - the bounded in-memory working set.
//!
//! The [`PageCache`] mediates every node access:
//! - resident pages are returned with no disk access
//! - misses read from the store (1 access) and admit the page
//! - admissions over capacity evict the oldest entry, writing it back
//!   (1 access) before removal
//!
//! Eviction is strict FIFO: re-accessing a resident page does *not* move
//! it to the back of the queue. The root page is pinned for the life of
//! the tree and never enters the queue at all.

use std::collections::{HashMap, VecDeque};

use crate::cache::AccessStats;
use crate::common::{PageId, Result};
use crate::storage::{Node, PageStore};

/// A capacity-bounded FIFO cache of B-tree nodes.
///
/// # Ownership
/// The cache exclusively owns the in-memory `Node` objects; the store owns
/// the durable byte-level representation. While a page is resident, the
/// cached node is the authoritative copy and may be mutated in place
/// through the reference [`fetch`](PageCache::fetch) returns. Eviction
/// flushes the node back to the store before removal, so the two owners
/// never disagree.
///
/// # Capacity
/// `capacity` bounds the evictable working set. The pinned root sits
/// outside it, mirroring the model where the root stays in RAM for the
/// life of the tree.
pub struct PageCache {
    /// Durable home for every page; single source of truth when cold.
    store: PageStore,

    /// Resident nodes by page id.
    nodes: HashMap<PageId, Node>,

    /// Admission order of evictable pages (front = oldest).
    queue: VecDeque<PageId>,

    /// The pinned root page, exempt from eviction.
    root: PageId,

    /// Maximum number of evictable resident pages (fixed for life).
    capacity: usize,

    /// Disk-access accounting.
    stats: AccessStats,
}

impl PageCache {
    /// Create a new page cache in front of `store`.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, store: PageStore) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            store,
            nodes: HashMap::new(),
            queue: VecDeque::new(),
            root: PageId::INVALID,
            capacity,
            stats: AccessStats::new(),
        }
    }

    /// Allocate a fresh page id from the store.
    pub fn allocate(&mut self) -> PageId {
        self.store.allocate()
    }

    /// Fetch a page, reading it from the store if it is not resident.
    ///
    /// The returned node is the authoritative hot copy; the caller may
    /// mutate it in place. A hit costs no disk access and does not change
    /// the eviction order.
    ///
    /// # Errors
    /// Corruption errors from [`PageStore::read`] on a miss.
    pub fn fetch(&mut self, page_id: PageId) -> Result<&mut Node> {
        if self.nodes.contains_key(&page_id) {
            self.stats.hits += 1;
        } else {
            let node = self.store.read(page_id)?;
            self.stats.reads += 1;
            self.stats.misses += 1;
            self.admit(page_id, node);
        }

        Ok(self
            .nodes
            .get_mut(&page_id)
            .expect("page is resident after admission"))
    }

    /// Admit a freshly created node without a store read.
    ///
    /// Follows the same eviction rule as a miss if capacity is exceeded.
    pub fn insert_new(&mut self, page_id: PageId, node: Node) {
        self.admit(page_id, node);
    }

    /// Pin `page_id` as the root page.
    ///
    /// The previous root, if any, re-enters the FIFO queue as the
    /// newest-admitted entry.
    pub fn set_root(&mut self, page_id: PageId) {
        if self.root.is_valid() && self.nodes.contains_key(&self.root) {
            self.queue.push_back(self.root);
        }
        self.root = page_id;
        // Root growth promotes a page that was never evictable, but keep
        // the queue consistent if a queued page is ever re-pinned.
        self.queue.retain(|queued| *queued != page_id);
        self.evict_over_capacity();
    }

    /// Write every resident page back to the store, root included.
    ///
    /// Each write counts as one disk access. Residency is unchanged.
    pub fn flush_all(&mut self) {
        // Deterministic order keeps the accounting reproducible.
        let mut resident: Vec<PageId> = self.nodes.keys().copied().collect();
        resident.sort_unstable();

        for page_id in resident {
            if let Some(node) = self.nodes.get(&page_id) {
                self.store.write(page_id, node);
                self.stats.writes += 1;
            }
        }
    }

    /// Check whether a page is currently resident.
    #[inline]
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.nodes.contains_key(&page_id)
    }

    /// Number of resident pages, pinned root included.
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.nodes.len()
    }

    /// The configured capacity of the evictable working set.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Disk-access accounting.
    #[inline]
    pub fn stats(&self) -> &AccessStats {
        &self.stats
    }

    /// Reset all access counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Insert a page as the newest admission and evict down to capacity.
    fn admit(&mut self, page_id: PageId, node: Node) {
        self.nodes.insert(page_id, node);
        if page_id != self.root {
            self.queue.push_back(page_id);
        }
        self.evict_over_capacity();
    }

    /// Evict oldest-admitted pages while the queue exceeds capacity.
    ///
    /// The victim is always written back before removal: in this model a
    /// released page must be stored, since its payloads may have changed.
    fn evict_over_capacity(&mut self) {
        while self.queue.len() > self.capacity {
            let Some(victim) = self.queue.pop_front() else {
                break;
            };
            if let Some(node) = self.nodes.remove(&victim) {
                self.store.write(victim, &node);
                self.stats.writes += 1;
                self.stats.evictions += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Record;

    /// A store pre-populated with `count` distinct single-record leaves.
    fn seeded_cache(capacity: usize, count: u32) -> (PageCache, Vec<PageId>) {
        let mut store = PageStore::new();
        let mut ids = Vec::new();
        for key in 0..count {
            let page_id = store.allocate();
            let node = Node {
                is_leaf: true,
                records: vec![Record::new(u64::from(key), u64::from(key) * 10)],
                children: Vec::new(),
            };
            // Seeding writes go straight to the store: not counted.
            store.write(page_id, &node);
            ids.push(page_id);
        }
        (PageCache::new(capacity, store), ids)
    }

    #[test]
    fn test_miss_then_hit() {
        let (mut cache, ids) = seeded_cache(4, 1);

        cache.fetch(ids[0]).unwrap();
        assert_eq!(cache.stats().reads(), 1);
        assert_eq!(cache.stats().misses(), 1);

        cache.fetch(ids[0]).unwrap();
        assert_eq!(cache.stats().reads(), 1);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().disk_accesses(), 1);
    }

    #[test]
    fn test_fifo_eviction_accounting() {
        // Capacity 2, fetch A, B, C: exactly 3 reads and 1 write, with A
        // evicted when C is admitted.
        let (mut cache, ids) = seeded_cache(2, 3);

        cache.fetch(ids[0]).unwrap();
        cache.fetch(ids[1]).unwrap();
        cache.fetch(ids[2]).unwrap();

        assert_eq!(cache.stats().reads(), 3);
        assert_eq!(cache.stats().writes(), 1);
        assert_eq!(cache.stats().evictions(), 1);
        assert!(!cache.is_resident(ids[0]));
        assert!(cache.is_resident(ids[1]));
        assert!(cache.is_resident(ids[2]));
    }

    #[test]
    fn test_hit_does_not_reorder() {
        let (mut cache, ids) = seeded_cache(2, 3);

        cache.fetch(ids[0]).unwrap();
        cache.fetch(ids[1]).unwrap();
        // Re-access A: strict FIFO, A stays the oldest admission.
        cache.fetch(ids[0]).unwrap();
        cache.fetch(ids[2]).unwrap();

        assert!(!cache.is_resident(ids[0]));
        assert!(cache.is_resident(ids[1]));
    }

    #[test]
    fn test_eviction_roundtrip_preserves_content() {
        let (mut cache, ids) = seeded_cache(1, 2);

        // Mutate A in place while hot.
        cache.fetch(ids[0]).unwrap().records[0].payload = 777;

        // B evicts A; A is flushed, then read back on re-fetch.
        cache.fetch(ids[1]).unwrap();
        assert!(!cache.is_resident(ids[0]));

        let node = cache.fetch(ids[0]).unwrap();
        assert_eq!(node.records[0].payload, 777);
    }

    #[test]
    fn test_insert_new_counts_no_read() {
        let (mut cache, _ids) = seeded_cache(2, 0);

        let page_id = cache.allocate();
        cache.insert_new(page_id, Node::leaf());

        assert_eq!(cache.stats().disk_accesses(), 0);
        assert!(cache.is_resident(page_id));
    }

    #[test]
    fn test_insert_new_respects_capacity() {
        let (mut cache, _ids) = seeded_cache(1, 0);

        let a = cache.allocate();
        let b = cache.allocate();
        cache.insert_new(a, Node::leaf());
        cache.insert_new(b, Node::leaf());

        assert!(!cache.is_resident(a));
        assert!(cache.is_resident(b));
        assert_eq!(cache.stats().writes(), 1);
        assert_eq!(cache.stats().evictions(), 1);

        // The evicted new page is durable and can be fetched back.
        cache.fetch(a).unwrap();
        assert_eq!(cache.stats().reads(), 1);
    }

    #[test]
    fn test_root_is_exempt_from_eviction() {
        let (mut cache, ids) = seeded_cache(1, 3);

        let root = cache.allocate();
        cache.set_root(root);
        cache.insert_new(root, Node::leaf());

        // Churn well past capacity; the root must stay resident.
        for &id in &ids {
            cache.fetch(id).unwrap();
        }
        assert!(cache.is_resident(root));
        assert_eq!(cache.resident_count(), 2); // root + one working page
    }

    #[test]
    fn test_set_root_unpins_previous_root() {
        let (mut cache, ids) = seeded_cache(1, 2);

        let old_root = cache.allocate();
        cache.set_root(old_root);
        cache.insert_new(old_root, Node::leaf());

        let new_root = cache.allocate();
        cache.set_root(new_root);
        cache.insert_new(new_root, Node::leaf());

        // The old root is now the newest evictable entry; two more
        // admissions push it out.
        cache.fetch(ids[0]).unwrap();
        cache.fetch(ids[1]).unwrap();
        assert!(!cache.is_resident(old_root));
        assert!(cache.is_resident(new_root));
    }

    #[test]
    fn test_flush_all_counts_writes() {
        let (mut cache, ids) = seeded_cache(4, 2);

        cache.fetch(ids[0]).unwrap();
        cache.fetch(ids[1]).unwrap();
        cache.reset_stats();

        cache.flush_all();
        assert_eq!(cache.stats().writes(), 2);
        assert_eq!(cache.resident_count(), 2);
    }

    #[test]
    fn test_fetch_unwritten_page_propagates() {
        let (mut cache, _ids) = seeded_cache(2, 0);
        let page_id = cache.allocate();

        let result = cache.fetch(page_id);
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        PageCache::new(0, PageStore::new());
    }
}
