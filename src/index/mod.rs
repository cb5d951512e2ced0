//! Index layer - the B-tree.

mod btree;

pub use btree::BTree;
