//! B-tree node and record types, plus their byte-level page encoding.
//!
//! One node occupies one page in the store. The encoding carries a CRC32
//! checksum so a corrupted page is detected at read time instead of
//! silently feeding garbage back into the tree.

use crate::common::{Error, PageId, Result};

/// A key with its co-located payload.
///
/// Keys are strictly ordered and unique across the whole tree; the payload
/// is opaque to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub key: u64,
    pub payload: u64,
}

impl Record {
    /// Create a new record.
    #[inline]
    pub fn new(key: u64, payload: u64) -> Self {
        Self { key, payload }
    }
}

/// A B-tree node.
///
/// For a tree of minimum degree `t`, a non-root node holds between `t - 1`
/// and `2t - 1` records (the root may hold fewer). Records are strictly
/// increasing by key. An internal node has `records.len() + 1` children;
/// child `i` holds all keys strictly between `records[i - 1].key` and
/// `records[i].key`, open-ended at the boundaries.
///
/// # Page Layout
/// ```text
/// Offset  Size      Field
/// ------  ----      -----
/// 0       1         flags (bit 0: leaf)
/// 1       4         record count n (little-endian)
/// 5       4         checksum (CRC32, little-endian)
/// 9       16 * n    records: key u64 LE, payload u64 LE
/// ...     4*(n+1)   child page ids (u32 LE), internal nodes only
/// ```
///
/// # Checksum
/// The checksum is computed over the entire encoded page with the checksum
/// field itself set to zero. This allows verification without special
/// handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Whether this node is a leaf (has no children).
    pub is_leaf: bool,

    /// Records in strictly increasing key order.
    pub records: Vec<Record>,

    /// Child page ids; empty for leaves, `records.len() + 1` otherwise.
    pub children: Vec<PageId>,
}

/// Size of the fixed node header in bytes.
const HEADER_SIZE: usize = 9;

/// Offset of each header field.
const OFFSET_FLAGS: usize = 0;
const OFFSET_RECORD_COUNT: usize = 1;
const OFFSET_CHECKSUM: usize = 5;

/// Bytes one encoded record occupies.
const RECORD_SIZE: usize = 16;

/// Bytes one encoded child page id occupies.
const CHILD_SIZE: usize = 4;

impl Node {
    /// Create an empty leaf node.
    pub fn leaf() -> Self {
        Self {
            is_leaf: true,
            records: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Check whether the node has reached its `2t - 1` record capacity.
    #[inline]
    pub fn is_full(&self, min_degree: usize) -> bool {
        self.records.len() == 2 * min_degree - 1
    }

    /// Encode the node into a page buffer, checksum included.
    pub fn encode(&self) -> Vec<u8> {
        let body = self.records.len() * RECORD_SIZE
            + if self.is_leaf {
                0
            } else {
                self.children.len() * CHILD_SIZE
            };
        let mut buf = Vec::with_capacity(HEADER_SIZE + body);

        buf.push(u8::from(self.is_leaf));
        buf.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]); // checksum placeholder

        for record in &self.records {
            buf.extend_from_slice(&record.key.to_le_bytes());
            buf.extend_from_slice(&record.payload.to_le_bytes());
        }
        if !self.is_leaf {
            for child in &self.children {
                buf.extend_from_slice(&child.as_u32().to_le_bytes());
            }
        }

        let checksum = compute_checksum(&buf);
        buf[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 4].copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Decode a node from a page buffer, verifying length and checksum.
    ///
    /// `page_id` is only used for error context.
    pub fn decode(page_id: PageId, buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::MalformedPage(page_id));
        }

        let is_leaf = match buf[OFFSET_FLAGS] {
            0 => false,
            1 => true,
            _ => return Err(Error::MalformedPage(page_id)),
        };

        let count = u32::from_le_bytes(
            buf[OFFSET_RECORD_COUNT..OFFSET_RECORD_COUNT + 4]
                .try_into()
                .map_err(|_| Error::MalformedPage(page_id))?,
        ) as usize;

        let child_count = if is_leaf { 0 } else { count + 1 };
        let expected = HEADER_SIZE + count * RECORD_SIZE + child_count * CHILD_SIZE;
        if buf.len() != expected {
            return Err(Error::MalformedPage(page_id));
        }

        let stored = u32::from_le_bytes(
            buf[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 4]
                .try_into()
                .map_err(|_| Error::MalformedPage(page_id))?,
        );
        if stored != compute_checksum(buf) {
            return Err(Error::ChecksumMismatch(page_id));
        }

        let mut records = Vec::with_capacity(count);
        let mut offset = HEADER_SIZE;
        for _ in 0..count {
            let key = u64::from_le_bytes(
                buf[offset..offset + 8]
                    .try_into()
                    .map_err(|_| Error::MalformedPage(page_id))?,
            );
            let payload = u64::from_le_bytes(
                buf[offset + 8..offset + 16]
                    .try_into()
                    .map_err(|_| Error::MalformedPage(page_id))?,
            );
            records.push(Record::new(key, payload));
            offset += RECORD_SIZE;
        }

        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            let id = u32::from_le_bytes(
                buf[offset..offset + 4]
                    .try_into()
                    .map_err(|_| Error::MalformedPage(page_id))?,
            );
            children.push(PageId::new(id));
            offset += CHILD_SIZE;
        }

        Ok(Self {
            is_leaf,
            records,
            children,
        })
    }
}

/// Compute the CRC32 checksum of an encoded page.
///
/// The checksum field (bytes 5-8) is fed as zeros, so the checksum doesn't
/// include itself.
fn compute_checksum(buf: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf[..OFFSET_CHECKSUM]);
    hasher.update(&[0u8; 4]);
    hasher.update(&buf[OFFSET_CHECKSUM + 4..]);
    hasher.finalize()
}
