//! Error types returned by fallible construction and lifecycle operations.
//!
//! Capacity misses and cache misses are not modeled as errors: `Get` on an
//! absent key and a `Put` that triggers eviction are both ordinary, expected
//! outcomes expressed through plain `bool`/`Option` returns. These types
//! cover the remaining two categories from the error-handling design:
//! configuration rejected at construction time, and lifecycle misuse of the
//! task executor. Both only come into play behind the `concurrent` feature,
//! so they can lean on `std` and `thiserror` without affecting the `no_std`
//! single-shard core.

use thiserror::Error;

/// Rejected at construction time, before a striped cache exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `stripe_count` was zero.
    #[error("stripe_count must be at least 1")]
    ZeroStripes,
    /// Dividing `max_bytes` across `stripe_count` stripes would leave each
    /// shard below the minimum viable floor.
    #[error(
        "max_bytes split across stripes yields {per_shard} bytes per shard, below the \
         minimum of {floor} bytes; lower stripe_count or raise max_bytes"
    )]
    ShardBelowFloor {
        /// Bytes each shard would receive.
        per_shard: u64,
        /// Minimum a shard must receive to be constructed.
        floor: u64,
    },
    /// `max_bytes` was zero; no shard could ever hold an entry.
    #[error("max_bytes must be at least 1")]
    ZeroCapacity,
}

/// Lifecycle misuse of an [`crate::executor::Executor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// `Start` was called on an executor that is already running.
    #[error("executor is already running")]
    AlreadyStarted,
    /// `low_watermark` was zero, or `high_watermark` was smaller than
    /// `low_watermark`.
    #[error(
        "invalid watermarks: low_watermark={low} must be >= 1 and high_watermark={high} \
         must be >= low_watermark"
    )]
    InvalidWatermarks {
        /// The configured lower bound.
        low: usize,
        /// The configured upper bound.
        high: usize,
    },
    /// A worker thread could not be spawned by the operating system.
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(String),
}
