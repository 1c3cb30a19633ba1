//! Request and response types exchanged over the public JSON API.
//!
//! Types that carry a plaintext secret or a passphrase implement `Debug` by
//! hand so that neither value can end up in a log line by accident.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Request body for `POST /secrets`.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreateSecretRequest {
    /// The secret text to protect. Must be non-empty.
    pub plaintext: String,
    /// Optional passphrase the recipient must supply to reveal the secret.
    /// An empty string is treated as absent.
    #[serde(default)]
    pub passphrase: Option<String>,
    /// Lifetime of the secret in seconds, `0..=604800`.
    pub ttl_seconds: u64,
}

impl fmt::Debug for CreateSecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateSecretRequest")
            .field("plaintext", &"[REDACTED]")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Successful response body for `POST /secrets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    /// Opaque lookup key for the stored secret.
    pub key: String,
    /// Whether a passphrase is required to reveal the secret.
    pub has_passphrase: bool,
    /// Instant after which the secret can no longer be revealed.
    pub expires_at: DateTime<Utc>,
    /// Human-readable lifetime, e.g. `"7 days"` or `"1 hour"`.
    pub expires_in: String,
    /// Relative path to peek at / reveal the secret.
    pub secret_path: String,
    /// Relative path to burn the secret.
    pub burn_path: String,
}

// ---------------------------------------------------------------------------
// Peek
// ---------------------------------------------------------------------------

/// Response body for `GET /secrets/:key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretStatusResponse {
    /// Whether the reveal request must carry a passphrase.
    pub has_passphrase: bool,
}

// ---------------------------------------------------------------------------
// Reveal
// ---------------------------------------------------------------------------

/// Request body for `POST /secrets/:key/reveal`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RevealSecretRequest {
    /// Passphrase attempt. A wrong attempt destroys the secret.
    #[serde(default)]
    pub passphrase: Option<String>,
}

impl fmt::Debug for RevealSecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealSecretRequest")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Successful response body for `POST /secrets/:key/reveal`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RevealSecretResponse {
    /// The recovered secret. It no longer exists on the server.
    pub plaintext: String,
}

impl fmt::Debug for RevealSecretResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RevealSecretResponse { plaintext: \"[REDACTED]\" }")
    }
}

// ---------------------------------------------------------------------------
// Burn
// ---------------------------------------------------------------------------

/// Response body for `POST /secrets/:key/burn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnSecretResponse {
    /// When the burn was processed. Reported whether or not the key existed.
    pub burned_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Status of a single dependency probed by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// `"up"` or `"down"`.
    pub status: String,
    /// Wall-clock time the probe took, in milliseconds.
    pub response_time_ms: u64,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Result of the secret store round-trip probe.
    pub store: ComponentHealth,
}
