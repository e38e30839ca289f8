//! The thread-safe storage contract and its single-shard implementation.
//!
//! [`Storage`] is the capability every front-end actually depends on: five
//! operations over byte-string keys and values, safe to call concurrently
//! from any number of threads. There is no trait hierarchy beneath it —
//! [`SimpleShard`] and [`crate::striped::StripedCache`] are two unrelated
//! implementations of the same flat contract, not a base type and a
//! subtype. [`SimpleShard`] is, semantically, a [`crate::striped::StripedCache`]
//! with exactly one stripe; the two are expected to behave identically for
//! the same sequence of operations, and the test suite checks exactly that.

use alloc::vec::Vec;
use parking_lot::Mutex;

use crate::config::ShardConfig;
use crate::shard::Shard;

/// Five operations over byte-string keys and values, safe for concurrent
/// callers.
pub trait Storage {
    /// Inserts or replaces `key`. Returns `false` if `key`/`value` alone
    /// cannot fit within the configured byte budget.
    fn put(&self, key: &[u8], value: &[u8]) -> bool;

    /// Inserts `key` only if it is absent. Returns `false` if the key was
    /// already present, or if the entry cannot fit within budget.
    fn put_if_absent(&self, key: &[u8], value: &[u8]) -> bool;

    /// Replaces the value for `key` only if it is already present. Returns
    /// `false` if the key was absent, or if the replacement cannot fit.
    fn set(&self, key: &[u8], value: &[u8]) -> bool;

    /// Removes `key`. Returns whether it was present.
    fn delete(&self, key: &[u8]) -> bool;

    /// Returns a copy of the value for `key`, or `None` if absent.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
}

/// A [`Storage`] implementation backed by exactly one mutex-guarded
/// [`Shard`].
///
/// This is what a caller with no concurrency requirements, or a test that
/// wants a single-shard baseline to compare a [`crate::striped::StripedCache`]
/// against, should reach for.
pub struct SimpleShard {
    shard: Mutex<Shard>,
}

impl SimpleShard {
    /// Creates an empty, single-shard store governed by `config`.
    pub fn new(config: ShardConfig) -> Self {
        Self {
            shard: Mutex::new(Shard::new(config)),
        }
    }

    /// Byte budget this store enforces.
    pub fn max_bytes(&self) -> u64 {
        self.shard.lock().max_bytes()
    }

    /// Sum of `key.len() + value.len()` across every entry currently held.
    pub fn current_bytes(&self) -> u64 {
        self.shard.lock().current_bytes()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.shard.lock().len()
    }

    /// Whether this store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.shard.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.shard.lock().clear();
    }
}

impl Storage for SimpleShard {
    fn put(&self, key: &[u8], value: &[u8]) -> bool {
        self.shard.lock().put(key.to_vec(), value.to_vec())
    }

    fn put_if_absent(&self, key: &[u8], value: &[u8]) -> bool {
        self.shard.lock().put_if_absent(key.to_vec(), value.to_vec())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> bool {
        self.shard.lock().set(key, value.to_vec())
    }

    fn delete(&self, key: &[u8]) -> bool {
        self.shard.lock().delete(key)
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.shard.lock().get(key)
    }
}

impl core::fmt::Debug for SimpleShard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimpleShard")
            .field("len", &self.len())
            .field("current_bytes", &self.current_bytes())
            .field("max_bytes", &self.max_bytes())
            .finish()
    }
}
