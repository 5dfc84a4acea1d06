//! Entropy pools and event encoding.
//!
//! Events are appended to a pool as `[source, length, data...]` and are
//! only hashed when the pool is folded into a reseed, so entropy sources
//! pay nothing beyond a buffer append.

use crate::error::UsageError;
use crate::primitives::{double_sha256, DIGEST_LEN};
use zeroize::Zeroize;

/// Number of pools owned by an accumulator.
pub const NUM_POOLS: usize = 32;

/// Largest event payload in bytes.
pub const MAX_EVENT_LEN: usize = 32;

/// A validated entropy event.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EntropyEvent<'a> {
    source: u8,
    pool: usize,
    data: &'a [u8],
}

impl<'a> EntropyEvent<'a> {
    /// Validates the pool index and payload length.
    ///
    /// The source identifier is a `u8`, so its `0..=255` range is enforced
    /// by the type.
    pub fn new(source: u8, pool: usize, data: &'a [u8]) -> Result<Self, UsageError> {
        if pool >= NUM_POOLS {
            return Err(UsageError::InvalidPool {
                pool,
                max: NUM_POOLS - 1,
            });
        }
        if data.is_empty() || data.len() > MAX_EVENT_LEN {
            return Err(UsageError::InvalidEventLength { len: data.len() });
        }
        Ok(Self { source, pool, data })
    }

    /// Returns the target pool index.
    pub fn pool(&self) -> usize {
        self.pool
    }

    /// Number of bytes the event occupies once encoded.
    pub fn encoded_len(&self) -> usize {
        self.data.len() + 2
    }
}

impl std::fmt::Debug for EntropyEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyEvent")
            .field("source", &self.source)
            .field("pool", &self.pool)
            .field("len", &self.data.len())
            .finish()
    }
}

/// One of the 32 accumulation buffers.
///
/// Only grows through [`EntropyPool::append`] and only shrinks, to empty,
/// when drained during a reseed.
#[derive(Default)]
pub struct EntropyPool {
    /// Encoded events since the last drain.
    buffer: Vec<u8>,
    /// Events appended since creation (for inspection).
    total_events: u64,
    /// Times this pool has been folded into a reseed.
    total_drains: u64,
}

impl EntropyPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an encoded event.
    pub fn append(&mut self, event: &EntropyEvent<'_>) {
        // data.len() <= 32, so the length always fits in one byte
        self.buffer.reserve(event.encoded_len());
        self.buffer.push(event.source);
        self.buffer.push(event.data.len() as u8);
        self.buffer.extend_from_slice(event.data);
        self.total_events += 1;
    }

    /// Hashes the pool contents with double SHA-256 and empties the pool.
    pub fn drain_digest(&mut self) -> [u8; DIGEST_LEN] {
        let digest = double_sha256(&self.buffer);
        self.buffer.zeroize();
        self.total_drains += 1;
        digest
    }

    /// Returns the current pool size in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the pool holds no events.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the raw pool contents (for display collaborators).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns total events ever appended.
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Returns total drains performed.
    pub fn total_drains(&self) -> u64 {
        self.total_drains
    }
}

impl std::fmt::Debug for EntropyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyPool")
            .field("len", &self.buffer.len())
            .field("total_events", &self.total_events)
            .field("total_drains", &self.total_drains)
            .finish()
    }
}

/// Round-robin pool selector for one entropy source.
///
/// Each source keeps its own cursor so its events spread evenly across
/// all pools.
#[derive(Debug, Default, Clone)]
pub struct PoolCursor {
    next: usize,
}

impl PoolCursor {
    /// Creates a cursor starting at pool 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pool for the next event and advances.
    pub fn next_pool(&mut self) -> usize {
        let pool = self.next;
        self.next = (self.next + 1) % NUM_POOLS;
        pool
    }

    /// Returns the pool the next event will go to.
    pub fn peek(&self) -> usize {
        self.next
    }
}
