//! [`MemoryStore`]: in-process TTL store.
//!
//! Entries live in a `HashMap` behind a single `tokio::sync::Mutex`, which is
//! what makes [`SecretStore::take_and_delete`] atomic here. Deadlines use
//! `tokio::time::Instant` so tests can drive expiry with paused time.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{SecretStore, StoreError};

#[derive(Debug)]
struct Entry {
    blob: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared, cloneable in-memory store.
///
/// Expired entries are never returned and are dropped lazily on the next
/// write or on access.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn put(&self, key: &str, blob: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        map.retain(|_, e| e.is_live(now));
        map.insert(
            key.to_owned(),
            Entry {
                blob: blob.to_vec(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        let live = match map.get(key) {
            Some(e) => e.is_live(now).then(|| e.blob.clone()),
            None => return Ok(None),
        };
        if live.is_none() {
            map.remove(key);
        }
        Ok(live)
    }

    async fn take_and_delete(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let taken = self.inner.lock().await.remove(key);
        Ok(taken.filter(|e| e.is_live(now)).map(|e| e.blob))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
