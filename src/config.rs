//! Configuration structures for the shard, the striped cache, and the task
//! executor.
//!
//! Configuration structs here have all-public fields for simple, literal
//! instantiation rather than a builder with a dozen chained setters.
//! Validation happens at the one place each struct is consumed
//! ([`crate::striped::StripedCache::new`], [`crate::executor::Executor::start`]),
//! which is where a descriptive error can actually be returned.
//!
//! # Sizing guidance
//!
//! `max_bytes` bounds the sum of `key.len() + value.len()` across every
//! entry a shard holds; it is not a count of entries and does not include
//! per-entry bookkeeping overhead (recency-list slot, index entry). Budget
//! accordingly: a shard holding mostly small keys with large values will
//! track `max_bytes` closely, while one holding many tiny entries will use
//! somewhat more memory than `max_bytes` alone suggests.

/// Configuration for a single [`crate::shard::Shard`].
#[derive(Debug, Clone, Copy)]
pub struct ShardConfig {
    /// Maximum total size in bytes of `key.len() + value.len()` across all
    /// entries this shard holds.
    pub max_bytes: u64,
}

impl ShardConfig {
    /// Convenience constructor equivalent to `ShardConfig { max_bytes }`.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

/// Default minimum number of bytes a single shard must be allotted.
///
/// Splitting `max_bytes` across too many stripes produces shards so small
/// that ordinary entries cannot fit and every `Put` degenerates into an
/// eviction of whatever the shard just inserted. 1 MiB is large enough to
/// hold a meaningful working set of typical cache entries (tens to low
/// hundreds of bytes each) per shard, while still allowing thousands of
/// stripes for a cache sized in the tens of gigabytes. This is only a
/// *default* — [`StripedCacheConfig::min_shard_bytes`] is a genuine,
/// per-construction override, not a hard-coded limit.
pub const MIN_SHARD_BYTES: u64 = 1024 * 1024;

/// Configuration for a [`crate::striped::StripedCache`].
///
/// `max_bytes` is the budget for the **entire** cache; it is divided evenly
/// across `stripe_count` shards, each of which enforces its own slice
/// independently. See [`crate::striped`] for why stripes do not rebalance
/// bytes between each other.
#[derive(Debug, Clone, Copy)]
pub struct StripedCacheConfig {
    /// Total byte budget across every stripe.
    pub max_bytes: u64,
    /// Number of independent, lock-striped shards.
    pub stripe_count: usize,
    /// Minimum bytes a single shard must be allotted. Construction fails if
    /// `max_bytes / stripe_count` falls below this. [`StripedCacheConfig::new`]
    /// fills in [`MIN_SHARD_BYTES`]; build the struct literal directly to
    /// choose a different floor.
    pub min_shard_bytes: u64,
}

impl StripedCacheConfig {
    /// Convenience constructor equivalent to the struct literal, using
    /// [`MIN_SHARD_BYTES`] as the per-shard floor.
    pub fn new(max_bytes: u64, stripe_count: usize) -> Self {
        Self {
            max_bytes,
            stripe_count,
            min_shard_bytes: MIN_SHARD_BYTES,
        }
    }
}

#[cfg(feature = "concurrent")]
pub use crate::executor::ExecutorConfig;
