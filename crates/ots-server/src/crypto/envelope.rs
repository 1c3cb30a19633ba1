//! Binary envelope codec.
//!
//! ```text
//! offset 0        version     1 byte
//! offset 1        nonce       NONCE_LEN bytes
//! offset 13       tag         TAG_LEN bytes
//! offset 29..end  ciphertext  plaintext length
//! ```
//!
//! Field lengths are fixed for every version; only the ciphertext is
//! variable. Changing a length requires a new version byte.

use super::cipher::{NONCE_LEN, TAG_LEN};
use super::error::CryptoError;
use super::kdf::KdfVersion;

/// Byte length of the version field.
pub const VERSION_LEN: usize = 1;

/// Length of everything before the ciphertext.
pub const PREFIX_LEN: usize = VERSION_LEN + NONCE_LEN + TAG_LEN;

/// A parsed (or about to be encoded) encrypted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: KdfVersion,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialise as `version ‖ nonce ‖ tag ‖ ciphertext`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PREFIX_LEN + self.ciphertext.len());
        out.push(self.version.as_byte());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse a token by fixed offsets.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::MalformedEnvelope`] if `bytes` is not longer than
    ///   [`PREFIX_LEN`]. Checked first, before the version byte is looked at.
    /// - [`CryptoError::UnsupportedVersion`] if the version byte is unknown.
    pub fn decode(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() <= PREFIX_LEN {
            return Err(CryptoError::MalformedEnvelope { len: bytes.len() });
        }

        let version = KdfVersion::try_from(bytes[0])?;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[VERSION_LEN..VERSION_LEN + NONCE_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[VERSION_LEN + NONCE_LEN..PREFIX_LEN]);

        Ok(Self {
            version,
            nonce,
            tag,
            ciphertext: bytes[PREFIX_LEN..].to_vec(),
        })
    }
}
