//! [`SecretService`]: orchestrates the sealer and the store.

use std::{future::Future, sync::Arc, time::Duration};

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{SecretError, StoredSecret, MAX_TTL_SECS};
use crate::crypto::{CryptoError, Sealer};
use crate::store::{SecretStore, StoreError};

/// Random bytes in an opaque key (hex-encoded to twice as many characters).
pub const KEY_BYTES: usize = 24;

/// TTL of the key written by the store health probe.
const HEALTH_PROBE_TTL: Duration = Duration::from_secs(60);

/// Result of a successful create.
#[derive(Debug, Clone)]
pub struct CreatedSecret {
    /// Opaque lookup key.
    pub key: String,
    /// Whether reveal needs a passphrase.
    pub has_passphrase: bool,
    /// When the store will drop the secret.
    pub expires_at: DateTime<Utc>,
    /// The TTL the secret was stored with.
    pub ttl: Duration,
}

/// Result of a peek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretStatus {
    pub has_passphrase: bool,
}

/// Create / peek / reveal / burn over any [`SecretStore`].
///
/// Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct SecretService {
    store: Arc<dyn SecretStore>,
    sealer: Sealer,
    store_timeout: Duration,
}

impl SecretService {
    /// Build a service. Every store call is bounded by `store_timeout`.
    pub fn new(store: Arc<dyn SecretStore>, sealer: Sealer, store_timeout: Duration) -> Self {
        Self {
            store,
            sealer,
            store_timeout,
        }
    }

    /// Encrypt `plaintext` and store it for `ttl_secs` seconds.
    ///
    /// # Errors
    ///
    /// - [`SecretError::InvalidTtl`] if `ttl_secs` exceeds [`MAX_TTL_SECS`].
    /// - [`SecretError::EmptySecret`] for an empty plaintext.
    /// - [`SecretError::StoreUnavailable`] if the store write fails.
    pub async fn create(
        &self,
        plaintext: String,
        passphrase: Option<String>,
        ttl_secs: u64,
    ) -> Result<CreatedSecret, SecretError> {
        if ttl_secs > MAX_TTL_SECS {
            return Err(SecretError::InvalidTtl(ttl_secs));
        }
        if plaintext.is_empty() {
            return Err(SecretError::EmptySecret);
        }

        let plaintext = Zeroizing::new(plaintext);
        let passphrase = normalise_passphrase(passphrase);
        let has_passphrase = passphrase.is_some();

        let sealer = self.sealer.clone();
        let envelope = run_blocking(move || {
            sealer.encrypt(plaintext.as_bytes(), passphrase.as_ref().map(|p| p.as_str()))
        })
        .await??;

        let key = generate_key();
        let ttl = Duration::from_secs(ttl_secs);
        let blob = StoredSecret::new(&envelope, has_passphrase).to_blob()?;
        self.bounded(self.store.put(&key, &blob, ttl)).await?;

        let expires_at = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);
        info!(
            key = %key_prefix(&key),
            has_passphrase,
            ttl_secs,
            version = self.sealer.encrypt_version().as_byte(),
            "secret created"
        );

        Ok(CreatedSecret {
            key,
            has_passphrase,
            expires_at,
            ttl,
        })
    }

    /// Report whether a secret exists and needs a passphrase, without consuming it.
    ///
    /// # Errors
    ///
    /// [`SecretError::NotFoundOrExpired`] if nothing is stored under `key`.
    pub async fn peek(&self, key: &str) -> Result<SecretStatus, SecretError> {
        if !is_well_formed_key(key) {
            return Err(SecretError::NotFoundOrExpired);
        }
        let blob = self
            .bounded(self.store.get(key))
            .await?
            .ok_or(SecretError::NotFoundOrExpired)?;
        let record = StoredSecret::from_blob(&blob)?;
        Ok(SecretStatus {
            has_passphrase: record.has_passphrase,
        })
    }

    /// Take the secret out of the store and decrypt it.
    ///
    /// The secret is gone from the store before decryption starts, whatever
    /// the outcome. A wrong passphrase therefore destroys the secret; this is
    /// what stops a caller from guessing passphrases.
    ///
    /// For secrets stored without a passphrase, `passphrase` is ignored.
    ///
    /// # Errors
    ///
    /// - [`SecretError::NotFoundOrExpired`] if there was nothing to take.
    /// - [`SecretError::WrongPassphrase`] if a passphrase-protected secret did
    ///   not authenticate.
    /// - [`SecretError::Crypto`] / [`SecretError::CorruptRecord`] if the stored
    ///   data is damaged.
    /// - [`SecretError::StoreUnavailable`] on store failure or timeout. The
    ///   secret must then be assumed consumed; callers must not retry.
    pub async fn reveal(&self, key: &str, passphrase: Option<String>) -> Result<String, SecretError> {
        if !is_well_formed_key(key) {
            return Err(SecretError::NotFoundOrExpired);
        }

        let taken = match self.bounded(self.store.take_and_delete(key)).await {
            Ok(taken) => taken,
            Err(e) => {
                warn!(
                    key = %key_prefix(key),
                    error = %e,
                    "take-and-delete failed; secret must be assumed consumed"
                );
                return Err(e.into());
            }
        };
        let Some(blob) = taken else {
            return Err(SecretError::NotFoundOrExpired);
        };

        let record = StoredSecret::from_blob(&blob).map_err(|e| {
            error!(key = %key_prefix(key), error = %e, "unreadable stored secret destroyed");
            e
        })?;
        let envelope = record.envelope()?;
        let attempt = if record.has_passphrase {
            normalise_passphrase(passphrase)
        } else {
            None
        };

        let sealer = self.sealer.clone();
        let opened = run_blocking(move || {
            sealer.decrypt(&envelope, attempt.as_ref().map(|p| p.as_str()))
        })
        .await?;

        match opened {
            Ok(plaintext) => {
                let text = std::str::from_utf8(&plaintext)
                    .map_err(|_| SecretError::CorruptRecord("plaintext is not UTF-8".into()))?
                    .to_owned();
                info!(key = %key_prefix(key), "secret revealed and destroyed");
                Ok(text)
            }
            Err(CryptoError::AuthenticationFailed) if record.has_passphrase => {
                info!(key = %key_prefix(key), "wrong passphrase; secret destroyed");
                Err(SecretError::WrongPassphrase)
            }
            Err(e) => {
                error!(
                    key = %key_prefix(key),
                    error = %e,
                    has_passphrase = record.has_passphrase,
                    "stored secret failed integrity checks"
                );
                Err(e.into())
            }
        }
    }

    /// Delete the secret if it exists. Succeeds whether or not it did.
    ///
    /// # Errors
    ///
    /// [`SecretError::StoreUnavailable`] if the store cannot be reached.
    pub async fn burn(&self, key: &str) -> Result<(), SecretError> {
        if is_well_formed_key(key) {
            self.bounded(self.store.delete(key)).await?;
        }
        info!(key = %key_prefix(key), "burn processed");
        Ok(())
    }

    /// Ping the store and round-trip a throwaway key through it.
    ///
    /// # Errors
    ///
    /// [`SecretError::StoreUnavailable`] if any step fails.
    pub async fn check_store(&self) -> Result<(), SecretError> {
        self.bounded(self.store.ping()).await?;

        // The `health:` prefix is not hex, so the public API can never reach it.
        let probe_key = format!("health:{}", Uuid::new_v4());
        self.bounded(self.store.put(&probe_key, b"ok", HEALTH_PROBE_TTL))
            .await?;
        let read = self.bounded(self.store.get(&probe_key)).await?;
        self.bounded(self.store.delete(&probe_key)).await?;

        if read.as_deref() != Some(&b"ok"[..]) {
            return Err(StoreError::Unavailable("health probe read back a different value".into()).into());
        }
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }
}

/// Run CPU-bound key derivation off the async worker threads.
async fn run_blocking<R, F>(f: F) -> Result<R, SecretError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SecretError::Internal(format!("crypto task failed: {e}")))
}

/// An empty passphrase counts as no passphrase.
fn normalise_passphrase(passphrase: Option<String>) -> Option<Zeroizing<String>> {
    passphrase.filter(|p| !p.is_empty()).map(Zeroizing::new)
}

/// 24 bytes from the OS CSPRNG, lowercase hex.
fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn is_well_formed_key(key: &str) -> bool {
    key.len() == KEY_BYTES * 2 && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Enough of a key to correlate log lines without making the line a credential.
fn key_prefix(key: &str) -> String {
    key.chars().take(8).collect()
}
