//! Shared application state injected into every Axum handler.

use crate::secret::SecretService;

/// Application state shared across all request handlers.
///
/// Cloned per request; [`SecretService`] is `Arc`-backed so this copies no
/// secret data.
#[derive(Clone)]
pub struct AppState {
    /// Create / peek / reveal / burn over the configured store.
    pub service: SecretService,
    /// Largest plaintext accepted by `POST /secrets`, in bytes.
    pub max_secret_bytes: usize,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(service: SecretService, max_secret_bytes: usize) -> Self {
        Self {
            service,
            max_secret_bytes,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a fresh [`MemoryStore`](crate::store::MemoryStore), suitable for tests.
    pub fn in_memory() -> Self {
        use std::{sync::Arc, time::Duration};

        use crate::crypto::{KdfVersion, MasterKey, Sealer};
        use crate::store::MemoryStore;

        let sealer = Sealer::new(MasterKey::new(b"http-test-master-key".to_vec()), KdfVersion::V1);
        let service = SecretService::new(Arc::new(MemoryStore::new()), sealer, Duration::from_secs(2));
        Self::new(service, 1024)
    }
}
