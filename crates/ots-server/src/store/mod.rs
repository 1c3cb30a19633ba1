//! TTL-keyed opaque blob storage behind the [`SecretStore`] trait.
//!
//! # Contract
//!
//! - `put` always overwrites and attaches a TTL; expiry is the store's job.
//!   Nothing in this crate sweeps or polls for expired entries.
//! - `take_and_delete` **must be atomic**: under concurrent calls for the same
//!   key, at most one caller receives the blob. Implementations must never
//!   approximate it with a read followed by a separate delete.
//! - `delete` is idempotent.
//!
//! Implementations:
//! - [`RedisStore`]: production backend (`GETDEL` or a Lua script).
//! - [`MemoryStore`]: single-process backend for tests and local runs.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout. Its effect on
    /// the store is unknown.
    #[error("secret store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Which Redis primitive backs [`SecretStore::take_and_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomicTake {
    /// Native `GETDEL` (Redis 6.2 and later).
    Getdel,
    /// A server-side Lua script running `GET` and `DEL` as one unit.
    Script,
}

/// Opaque blob store with per-entry time-to-live.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store `blob` under `key`, replacing any previous value, expiring after `ttl`.
    async fn put(&self, key: &str, blob: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Read the blob under `key` without consuming it.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Atomically read and remove the blob under `key`.
    async fn take_and_delete(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}
