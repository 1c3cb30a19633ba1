//! [`RedisStore`]: networked TTL store backed by Redis.
//!
//! Commands used:
//! - `SET key blob PX <ms>` for [`SecretStore::put`]
//! - `GET` / `DEL` for reads and burns
//! - `GETDEL` or [`TAKE_SCRIPT`] for [`SecretStore::take_and_delete`]
//!
//! A `GET` followed by a separate `DEL` is never used for taking a secret: two
//! concurrent callers could both see the value between the two commands.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ::redis::{aio::ConnectionManager, Client, RedisError, Script};
use tracing::info;

use super::{AtomicTake, SecretStore, StoreError};

/// Lua fallback for servers without `GETDEL`. Redis runs scripts atomically.
pub const TAKE_SCRIPT: &str = r#"
local value = redis.call('GET', KEYS[1])
if value then
    redis.call('DEL', KEYS[1])
end
return value
"#;

/// Redis-backed [`SecretStore`].
///
/// The [`ConnectionManager`] multiplexes all requests over one connection and
/// reconnects transparently; it is cloned per call.
pub struct RedisStore {
    conn: ConnectionManager,
    atomic_take: AtomicTake,
    take_script: Script,
}

impl RedisStore {
    /// Connect to `url` and verify the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the server cannot be reached.
    pub async fn connect(url: &str, atomic_take: AtomicTake) -> Result<Self> {
        let client = Client::open(url).context("invalid REDIS_URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("failed to connect to Redis")?;
        info!(?atomic_take, "connected to Redis");
        Ok(Self {
            conn,
            atomic_take,
            take_script: Script::new(TAKE_SCRIPT),
        })
    }
}

/// TTL in milliseconds for `SET ... PX`. Redis rejects a zero expiry, so a
/// zero TTL becomes one millisecond.
fn px_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn unavailable(err: RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl SecretStore for RedisStore {
    async fn put(&self, key: &str, blob: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        ::redis::cmd("SET")
            .arg(key)
            .arg(blob)
            .arg("PX")
            .arg(px_millis(ttl))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        ::redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<Vec<u8>>>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn take_and_delete(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let taken = match self.atomic_take {
            AtomicTake::Getdel => {
                ::redis::cmd("GETDEL")
                    .arg(key)
                    .query_async::<_, Option<Vec<u8>>>(&mut conn)
                    .await
            }
            AtomicTake::Script => {
                self.take_script
                    .key(key)
                    .invoke_async::<_, Option<Vec<u8>>>(&mut conn)
                    .await
            }
        };
        taken.map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        ::redis::cmd("DEL")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(unavailable)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        ::redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(unavailable)
    }
}
