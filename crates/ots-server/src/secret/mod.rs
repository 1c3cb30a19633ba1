//! One-time secret lifecycle: create, peek, reveal-and-destroy, burn.
//!
//! # States
//!
//! ```text
//! Created ──reveal──► Revealed
//!    │ ├───burn────► Burned
//!    │ └───TTL─────► Expired
//! ```
//!
//! Every branch is terminal. Expiry is enforced by the store; this module never
//! sweeps.
//!
//! # Invariants
//!
//! - Reveal consumes the secret through one atomic
//!   [`SecretStore::take_and_delete`](crate::store::SecretStore::take_and_delete)
//!   call. Exactly one of any number of concurrent reveals can see the
//!   plaintext.
//! - A reveal that fails to decrypt has still consumed the secret. For
//!   passphrase-protected secrets this means one wrong guess destroys the
//!   secret, which rules out online guessing of the passphrase.
//! - Plaintext, passphrases and the master key are never logged. Opaque keys
//!   appear in logs only as a short prefix.

pub mod record;
pub mod service;

pub use record::StoredSecret;
pub use service::{CreatedSecret, SecretService, SecretStatus};

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::store::StoreError;

/// Longest allowed TTL: seven days.
pub const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Errors produced by [`SecretService`].
#[derive(Debug, Error)]
pub enum SecretError {
    /// Never existed, already revealed, burned, or expired.
    #[error("secret not found or expired")]
    NotFoundOrExpired,

    /// The passphrase attempt did not open a passphrase-protected secret.
    #[error("wrong passphrase")]
    WrongPassphrase,

    /// A secret failed to decode or decrypt for reasons no caller input
    /// explains: corruption or tampering.
    #[error("stored secret failed integrity checks: {0}")]
    Crypto(#[from] CryptoError),

    /// The stored blob is not a valid [`StoredSecret`] or its plaintext is not UTF-8.
    #[error("stored secret is corrupt: {0}")]
    CorruptRecord(String),

    /// The store could not be reached or timed out.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    /// The requested TTL is above [`MAX_TTL_SECS`].
    #[error("ttl of {0}s exceeds the maximum of {MAX_TTL_SECS}s")]
    InvalidTtl(u64),

    /// The plaintext was empty.
    #[error("secret must not be empty")]
    EmptySecret,

    /// A blocking crypto task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}
