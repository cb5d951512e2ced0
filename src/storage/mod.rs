//! Storage layer - the simulated page store and node wire format.
//!
//! This module handles the "disk" side of the index:
//! - [`Node`] / [`Record`] - the data model and its byte encoding
//! - [`PageStore`] - durable home for every page ever written

mod node;
mod page_store;

pub use node::{Node, Record};
pub use page_store::PageStore;
