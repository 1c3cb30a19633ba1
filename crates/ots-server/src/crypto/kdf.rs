//! Per-encryption key derivation.
//!
//! Every token is encrypted under a key derived with PBKDF2-HMAC-SHA256 from
//! the service master key (and the recipient passphrase, when there is one).
//! The iteration count is selected by the envelope version byte.
//!
//! The AEAD nonce of the token is used as the PBKDF2 salt. No separate salt is
//! stored. This is only sound because [`super::cipher::Nonce`] values are
//! freshly generated for every encryption and never reused.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::cipher::KEY_LEN;
use super::error::CryptoError;

/// A derived AEAD key. Zeroed when dropped.
pub type DerivedKey = Zeroizing<[u8; KEY_LEN]>;

/// Envelope versions and the key-derivation cost attached to each.
///
/// Adding a version means adding a variant, its byte in [`TryFrom<u8>`] and its
/// iteration count. Call sites never match on raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KdfVersion {
    V1,
    V2,
}

impl KdfVersion {
    /// PBKDF2 iteration count for this version.
    pub const fn iterations(self) -> u32 {
        match self {
            KdfVersion::V1 => 10_000,
            KdfVersion::V2 => 100_000,
        }
    }

    /// The byte written at offset 0 of the envelope.
    pub const fn as_byte(self) -> u8 {
        match self {
            KdfVersion::V1 => 1,
            KdfVersion::V2 => 2,
        }
    }
}

impl TryFrom<u8> for KdfVersion {
    type Error = CryptoError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            1 => Ok(KdfVersion::V1),
            2 => Ok(KdfVersion::V2),
            other => Err(CryptoError::UnsupportedVersion(other)),
        }
    }
}

/// Service-wide master key material.
///
/// Loaded from configuration and handed to [`super::Sealer`] at construction.
/// The bytes are zeroed on drop and never printed.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct MasterKey(Zeroizing<Vec<u8>>);

impl MasterKey {
    /// Wrap raw key material.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Length of the key material in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no key material is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for MasterKey {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Derive the AEAD key for one encryption or decryption.
///
/// The PBKDF2 password is the master key alone, or the master key followed by
/// the SHA-256 digest of the UTF-8 passphrase. The password buffer is zeroed
/// before returning.
pub fn derive_key(
    master_key: &MasterKey,
    passphrase: Option<&str>,
    salt: &[u8],
    version: KdfVersion,
) -> DerivedKey {
    let mut password = Zeroizing::new(Vec::with_capacity(master_key.len() + 32));
    password.extend_from_slice(master_key.as_bytes());
    if let Some(passphrase) = passphrase {
        password.extend_from_slice(&Sha256::digest(passphrase.as_bytes()));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(&password, salt, version.iterations(), key.as_mut());
    key
}
