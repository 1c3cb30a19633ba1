//! Errors produced by the envelope, key-derivation and cipher layers.

use thiserror::Error;

use super::envelope::PREFIX_LEN;

/// Errors produced by the crypto layer.
///
/// None of these are handled inside `crypto`; they propagate to the secret
/// lifecycle service, which alone decides what a caller gets to see.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The token is too short to contain a version, nonce, tag and at least
    /// one ciphertext byte.
    #[error("malformed envelope: {len} bytes, expected more than {PREFIX_LEN}")]
    MalformedEnvelope { len: usize },

    /// The version byte has no entry in the key-derivation policy table.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// The AEAD tag did not verify. Wrong key, wrong passphrase, wrong nonce
    /// and modified ciphertext all collapse into this one outcome.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Empty plaintexts would encode to a token `decode` rejects.
    #[error("plaintext must not be empty")]
    EmptyPlaintext,
}
