//! Configuration loading and validation for the secret service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::{KdfVersion, MasterKey};
use crate::store::AtomicTake;

/// Which [`SecretStore`](crate::store::SecretStore) implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master key material. **Required.** Redacted in `Debug` output.
    pub master_key: MasterKey,

    /// Envelope version byte used for newly created secrets.
    #[serde(default = "default_encrypt_version")]
    pub encrypt_version: u8,

    /// `redis` or `memory`.
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Redis connection URL, used when `store_backend` is `redis`.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// `getdel` (Redis 6.2+) or `script`.
    #[serde(default = "default_redis_atomic_take")]
    pub redis_atomic_take: AtomicTake,

    /// Upper bound on any single store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Largest accepted plaintext, in bytes.
    #[serde(default = "default_max_secret_bytes")]
    pub max_secret_bytes: usize,

    /// OTLP/gRPC endpoint. Span export is off when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_encrypt_version() -> u8 {
    1
}
fn default_store_backend() -> StoreBackend {
    StoreBackend::Redis
}
fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".into()
}
fn default_redis_atomic_take() -> AtomicTake {
    AtomicTake::Getdel
}
fn default_store_timeout_ms() -> u64 {
    2000
}
fn default_listen_port() -> u16 {
    8080
}
fn default_max_secret_bytes() -> usize {
    64 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Envelope version for new secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if `ENCRYPT_VERSION` names no known version.
    pub fn kdf_version(&self) -> Result<KdfVersion> {
        KdfVersion::try_from(self.encrypt_version)
            .with_context(|| format!("ENCRYPT_VERSION {} is not supported", self.encrypt_version))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.master_key.is_empty() {
            anyhow::bail!("MASTER_KEY is required and must not be empty");
        }
        self.kdf_version()?;
        if self.store_backend == StoreBackend::Redis {
            ensure_non_empty(&self.redis_url, "REDIS_URL")?;
        }
        if self.store_timeout_ms == 0 {
            anyhow::bail!("STORE_TIMEOUT_MS must be > 0");
        }
        if self.max_secret_bytes == 0 {
            anyhow::bail!("MAX_SECRET_BYTES must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}
