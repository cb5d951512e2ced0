//! Configuration constants for DiskBTree.

/// Default minimum degree `t` of the tree.
///
/// With `t = 512` a node holds between 511 and 1023 keys (root excepted on
/// the low end), which models a page that fits 1K integer keys with their
/// associated data.
pub const DEFAULT_MIN_DEGREE: usize = 512;

/// Default RAM budget expressed in key slots.
///
/// 64K key slots: the cache may keep as many nodes resident as fit in this
/// budget assuming every node takes a full page worth of key slots, whether
/// or not it is actually full.
pub const DEFAULT_KEY_BUDGET: usize = 64 * 1024;

/// Maximum number of records a node of minimum degree `t` can hold.
#[inline]
pub const fn max_keys_per_node(min_degree: usize) -> usize {
    2 * min_degree - 1
}

/// Number of nodes a RAM budget of `key_budget` key slots can hold.
///
/// A partially filled node still occupies a whole page, so the divisor is
/// the node's maximum capacity. The result is clamped to 1: the root is
/// always resident.
#[inline]
pub const fn cache_capacity(key_budget: usize, min_degree: usize) -> usize {
    let capacity = key_budget / max_keys_per_node(min_degree);
    if capacity == 0 {
        1
    } else {
        capacity
    }
}
