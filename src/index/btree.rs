//! B-tree index over the page cache.
//!
//! A minimum-degree-`t` B-tree in the classic form: proactive splits on the
//! way down keep insertion single-pass with no backtracking. Every node
//! traversal below the root goes through [`PageCache::fetch`], so the
//! disk-access counter reflects exactly the page transfers the traversal
//! caused - cost is charged on the *edges* of the walk, never on inspecting
//! an already-resident node.

use crate::cache::{PageCache, StatsSnapshot};
use crate::common::config::cache_capacity;
use crate::common::{PageId, Result};
use crate::storage::{Node, PageStore, Record};

/// An ordered key→payload index whose nodes live on a simulated disk.
///
/// # Example
/// ```
/// use diskbtree::BTree;
///
/// let mut tree = BTree::new(2, 64);
/// for key in [10, 20, 5, 6, 12, 30, 7, 17] {
///     tree.insert(key, key * 100).unwrap();
/// }
/// assert_eq!(tree.search(6).unwrap().unwrap().payload, 600);
/// assert_eq!(tree.search(99).unwrap(), None);
/// ```
pub struct BTree {
    /// Minimum degree `t`: nodes hold `t-1..=2t-1` records (root excepted).
    min_degree: usize,

    /// Page id of the current root, pinned in the cache.
    root: PageId,

    /// The working set; owns the store underneath it.
    cache: PageCache,

    /// Number of distinct keys in the tree.
    len: u64,
}

/// Outcome of inspecting one node on the insertion path.
enum Step {
    /// The record was placed (or replaced); `true` means a new key.
    Done(bool),
    /// Descend into child `i`.
    Descend(usize),
}

impl BTree {
    /// Create an empty tree.
    ///
    /// `key_budget` is the RAM budget expressed in key slots; the cache
    /// holds `key_budget / (2t - 1)` nodes (at least one), and the root is
    /// kept resident on top of that.
    ///
    /// # Panics
    /// Panics if `min_degree < 2`.
    pub fn new(min_degree: usize, key_budget: usize) -> Self {
        assert!(min_degree >= 2, "minimum degree must be at least 2");

        let capacity = cache_capacity(key_budget, min_degree);
        let mut cache = PageCache::new(capacity, PageStore::new());

        let root = cache.allocate();
        cache.set_root(root);
        cache.insert_new(root, Node::leaf());

        Self {
            min_degree,
            root,
            cache,
            len: 0,
        }
    }

    /// Look up a key, returning its record if present.
    ///
    /// Searching an empty tree or a missing key is `Ok(None)`, never an
    /// error. The root is always resident, so a search costs one disk read
    /// per non-resident node on the path below it.
    pub fn search(&mut self, key: u64) -> Result<Option<Record>> {
        let mut page_id = self.root;
        loop {
            let node = self.cache.fetch(page_id)?;
            let i = node.records.partition_point(|r| r.key < key);
            if i < node.records.len() && node.records[i].key == key {
                return Ok(Some(node.records[i]));
            }
            if node.is_leaf {
                return Ok(None);
            }
            page_id = node.children[i];
        }
    }

    /// Insert a key with its payload.
    ///
    /// Inserting a key that is already present replaces its payload in
    /// place. A full root is split first (growing the tree by one level);
    /// full children are split proactively on the way down.
    pub fn insert(&mut self, key: u64, payload: u64) -> Result<()> {
        if self.cache.fetch(self.root)?.is_full(self.min_degree) {
            self.grow_root()?;
        }
        self.insert_non_full(Record::new(key, payload))
    }

    /// Total disk accesses since construction or the last reset.
    #[inline]
    pub fn total_disk_accesses(&self) -> u64 {
        self.cache.stats().disk_accesses()
    }

    /// Zero the disk-access counters.
    pub fn reset_disk_access_counter(&mut self) {
        self.cache.reset_stats();
    }

    /// A detached copy of the full access counters.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.cache.stats().snapshot()
    }

    /// Number of distinct keys in the tree.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check whether the tree holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The tree's minimum degree `t`.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// The cache this tree resolves pages through.
    #[inline]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Height of the tree: number of edges from the root to any leaf.
    ///
    /// Walks the leftmost path through the cache, so it may incur disk
    /// reads like any other traversal.
    pub fn height(&mut self) -> Result<usize> {
        let mut height = 0;
        let mut page_id = self.root;
        loop {
            let node = self.cache.fetch(page_id)?;
            if node.is_leaf {
                return Ok(height);
            }
            page_id = node.children[0];
            height += 1;
        }
    }

    /// All keys in ascending order, via a full in-order traversal.
    pub fn keys_in_order(&mut self) -> Result<Vec<u64>> {
        let mut keys = Vec::with_capacity(self.len as usize);
        self.collect_in_order(self.root, &mut keys)?;
        Ok(keys)
    }

    /// Verify the structural invariants of the whole tree.
    ///
    /// Checks, for every node: records strictly increasing, fan-out bounds
    /// (`t-1..=2t-1` records for non-root nodes, internal nodes with
    /// `records + 1` children), and that every leaf sits at the same depth.
    /// Global key uniqueness follows from the in-order sequence being
    /// strictly increasing.
    ///
    /// Violations panic: they are logic bugs, not runtime conditions. Like
    /// every traversal this routes through the cache and so perturbs the
    /// access counters.
    pub fn check_invariants(&mut self) -> Result<()> {
        let max = 2 * self.min_degree - 1;
        let min = self.min_degree - 1;

        // Walk the whole tree, tracking depth per node.
        let mut frontier = vec![(self.root, 0usize)];
        let mut leaf_depth: Option<usize> = None;

        while let Some((page_id, depth)) = frontier.pop() {
            let is_root = page_id == self.root;
            let (record_count, sorted, is_leaf, children) = {
                let node = self.cache.fetch(page_id)?;
                let sorted = node.records.windows(2).all(|w| w[0].key < w[1].key);
                (
                    node.records.len(),
                    sorted,
                    node.is_leaf,
                    node.children.clone(),
                )
            };

            assert!(sorted, "{page_id}: records out of order");
            assert!(record_count <= max, "{page_id}: over capacity");
            if !is_root {
                assert!(record_count >= min, "{page_id}: under-filled");
            }

            if is_leaf {
                assert!(children.is_empty(), "{page_id}: leaf with children");
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(expected) => {
                        assert_eq!(depth, expected, "{page_id}: leaf at unequal depth");
                    }
                }
            } else {
                assert_eq!(
                    children.len(),
                    record_count + 1,
                    "{page_id}: bad child count"
                );
                for child in children {
                    frontier.push((child, depth + 1));
                }
            }
        }

        let keys = self.keys_in_order()?;
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "in-order keys not strictly increasing"
        );
        assert_eq!(keys.len() as u64, self.len, "key count drifted");

        Ok(())
    }

    /// Replace a full root with a fresh internal node above it.
    fn grow_root(&mut self) -> Result<()> {
        let old_root = self.root;
        let new_root_id = self.cache.allocate();
        let new_root = Node {
            is_leaf: false,
            records: Vec::new(),
            children: vec![old_root],
        };

        // Pin the new root first so its admission never enqueues it; the
        // old root becomes the newest evictable entry.
        self.cache.set_root(new_root_id);
        self.cache.insert_new(new_root_id, new_root);
        self.root = new_root_id;

        self.split_child(new_root_id, 0)
    }

    /// Split the full child at position `i` of `parent_id`.
    ///
    /// The child keeps its lower `t - 1` records (and `t` children if
    /// internal); the upper `t - 1` records (and `t` children) move to a
    /// new right sibling; the median record is promoted into the parent at
    /// position `i`.
    fn split_child(&mut self, parent_id: PageId, i: usize) -> Result<()> {
        let t = self.min_degree;
        let child_id = self.cache.fetch(parent_id)?.children[i];

        let (median, sibling) = {
            let child = self.cache.fetch(child_id)?;
            debug_assert!(child.is_full(t), "split of a non-full child");

            let mut upper = child.records.split_off(t - 1);
            let median = upper.remove(0);
            let upper_children = if child.is_leaf {
                Vec::new()
            } else {
                child.children.split_off(t)
            };

            let sibling = Node {
                is_leaf: child.is_leaf,
                records: upper,
                children: upper_children,
            };
            (median, sibling)
        };

        let sibling_id = self.cache.allocate();
        self.cache.insert_new(sibling_id, sibling);

        // The admission above may have evicted the parent; fetch charges a
        // read and brings it back if so.
        let parent = self.cache.fetch(parent_id)?;
        parent.records.insert(i, median);
        parent.children.insert(i + 1, sibling_id);
        Ok(())
    }

    /// Descend from the root and place `record`, splitting full children
    /// before entering them.
    ///
    /// Iterative rather than recursive: the path is re-resolved through the
    /// cache at every hop, so eviction mid-insert is harmless.
    fn insert_non_full(&mut self, record: Record) -> Result<()> {
        let mut page_id = self.root;
        loop {
            let step = {
                let node = self.cache.fetch(page_id)?;
                let i = node.records.partition_point(|r| r.key < record.key);
                if i < node.records.len() && node.records[i].key == record.key {
                    node.records[i].payload = record.payload;
                    Step::Done(false)
                } else if node.is_leaf {
                    node.records.insert(i, record);
                    Step::Done(true)
                } else {
                    Step::Descend(i)
                }
            };

            match step {
                Step::Done(new_key) => {
                    if new_key {
                        self.len += 1;
                    }
                    return Ok(());
                }
                Step::Descend(mut i) => {
                    let child_id = self.cache.fetch(page_id)?.children[i];
                    if self.cache.fetch(child_id)?.is_full(self.min_degree) {
                        self.split_child(page_id, i)?;

                        // The split promoted a median into this node;
                        // re-evaluate which side the key belongs to.
                        let node = self.cache.fetch(page_id)?;
                        let promoted = node.records[i];
                        if record.key == promoted.key {
                            node.records[i].payload = record.payload;
                            return Ok(());
                        }
                        if record.key > promoted.key {
                            i += 1;
                        }
                        page_id = node.children[i];
                    } else {
                        page_id = child_id;
                    }
                }
            }
        }
    }

    /// Append the keys of the subtree at `page_id` in ascending order.
    fn collect_in_order(&mut self, page_id: PageId, out: &mut Vec<u64>) -> Result<()> {
        let (records, children) = {
            let node = self.cache.fetch(page_id)?;
            (node.records.clone(), node.children.clone())
        };

        if children.is_empty() {
            out.extend(records.iter().map(|r| r.key));
        } else {
            for (i, child) in children.iter().enumerate() {
                self.collect_in_order(*child, out)?;
                if i < records.len() {
                    out.push(records[i].key);
                }
            }
        }
        Ok(())
    }
}
