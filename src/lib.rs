//! A byte-budgeted LRU store, a lock-striped fan-out over it, and an
//! elastic worker pool for dispatching per-connection work — the three
//! engine components behind a small memcached-style cache server.
//!
//! This crate is the *engine*, not the server: it has no socket, no wire
//! protocol, and no text-command parser. A front end owns the network loop,
//! parses whatever protocol it speaks, and for each request calls into one
//! of the two contracts this crate exposes:
//!
//! - [`storage::Storage`] — five operations (`put`, `put_if_absent`, `set`,
//!   `delete`, `get`) over byte-string keys and values, implemented by
//!   [`storage::SimpleShard`] (one shard, one lock) and
//!   [`striped::StripedCache`] (many independently locked shards, routed by
//!   key hash). Both are drop-in implementations of the same contract —
//!   there is no base/derived relationship between them.
//! - [`executor::Executor`] — a pool of worker threads that runs arbitrary
//!   `FnOnce() + Send + 'static` tasks, growing between a low and a high
//!   watermark and draining in an orderly fashion on shutdown.
//!
//! # Which pieces need `std`?
//!
//! The recency list ([`list`]), the entry type ([`entry`]), and the raw,
//! non-thread-safe [`shard::Shard`] only need `alloc` — they compile under
//! `#![no_std]` and have no opinion about concurrency; the caller decides
//! how (or whether) to synchronize access. Everything that actually takes
//! a lock or spawns a thread — [`storage`], [`striped`], [`executor`], and
//! the error types in [`error`] — lives behind the `concurrent` feature,
//! which pulls in `std`, [`parking_lot`] for the mutexes and condition
//! variables, `thiserror` for the error enums, and `log` for worker
//! diagnostics.
//!
//! ```
//! # #[cfg(feature = "concurrent")]
//! # fn main() {
//! use afina_core::config::StripedCacheConfig;
//! use afina_core::storage::Storage;
//! use afina_core::striped::StripedCache;
//!
//! let cache = StripedCache::new(StripedCacheConfig::new(16 * 1024 * 1024, 8)).unwrap();
//!
//! assert!(cache.put(b"greeting", b"hello"));
//! assert_eq!(cache.get(b"greeting"), Some(b"hello".to_vec()));
//! # }
//! # #[cfg(not(feature = "concurrent"))]
//! # fn main() {}
//! ```
//!
//! # Modules
//!
//! - [`entry`]: the key/value pair a shard holds, plus its size accounting.
//! - [`list`]: the arena-indexed recency list the shard's eviction order is
//!   built on.
//! - [`shard`]: the single-threaded, byte-budgeted LRU at the core of the
//!   engine.
//! - [`config`]: configuration structs for the shard, the striped cache,
//!   and the executor.
//! - [`error`]: construction- and lifecycle-time error types (`concurrent`
//!   only).
//! - [`storage`]: the `Storage` contract and its single-shard
//!   implementation (`concurrent` only).
//! - [`striped`]: the lock-striped, multi-shard `Storage` implementation
//!   (`concurrent` only).
//! - [`executor`]: the elastic worker pool (`concurrent` only).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The unit of storage held by a shard: a key/value pair plus cached size
/// and diagnostic timestamps.
pub mod entry;

/// An arena-indexed doubly linked list used as the shard's recency order.
///
/// Internal infrastructure: nodes are addressed by stable index rather
/// than by pointer, so tearing down even a very long list is an iterative
/// `Vec` free rather than a recursive pointer chain.
pub(crate) mod list;

/// Configuration structs for the shard, the striped cache, and the
/// executor.
pub mod config;

/// A single, non-thread-safe, byte-budgeted LRU shard — the algorithmic
/// core every [`storage::Storage`] implementation is built from.
pub mod shard;

/// Construction- and lifecycle-time error types.
///
/// Only relevant behind the `concurrent` feature: everything in the
/// single-shard core reports its expected outcomes (hit/miss,
/// accepted/rejected) as plain `bool`/`Option`, never as an `Err`.
#[cfg(feature = "concurrent")]
pub mod error;

/// The thread-safe `Storage` contract and its single-shard implementation.
#[cfg(feature = "concurrent")]
pub mod storage;

/// A lock-striped `Storage` implementation: independent shards selected by
/// key hash, for scalable concurrent access.
#[cfg(feature = "concurrent")]
pub mod striped;

/// An elastic pool of worker threads for dispatching opaque, zero-argument
/// tasks — submission, draining, and shutdown.
#[cfg(feature = "concurrent")]
pub mod executor;

#[cfg(feature = "concurrent")]
pub use error::{ConfigError, ExecutorError};
#[cfg(feature = "concurrent")]
pub use executor::{Executor, ExecutorConfig};
#[cfg(feature = "concurrent")]
pub use storage::{SimpleShard, Storage};
#[cfg(feature = "concurrent")]
pub use striped::StripedCache;

pub use config::ShardConfig;
pub use shard::Shard;
#[cfg(feature = "concurrent")]
pub use config::StripedCacheConfig;
