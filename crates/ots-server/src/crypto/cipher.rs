//! AES-256-GCM-SIV sealing and opening of a single secret.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) produces a ciphertext of
//! exactly the plaintext length plus a detached 16-byte tag, which is what the
//! envelope format stores. Nonce misuse only degrades it to deterministic
//! encryption instead of leaking the authentication key.
//!
//! Nonces are still never reused: the only way to obtain a [`Nonce`] for
//! sealing is [`Nonce::generate`].

use aes_gcm_siv::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit, OsRng},
    Aes256GcmSiv,
};
use zeroize::Zeroizing;

use super::error::CryptoError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the detached authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// A fresh random nonce for one seal operation.
///
/// There is deliberately no constructor from caller-supplied bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Draw a nonce from the OS CSPRNG.
    pub fn generate() -> Self {
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw nonce bytes, for the envelope and the KDF salt.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Output of [`seal`]: ciphertext plus detached tag.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailed`] only if the AEAD
/// implementation refuses the input (plaintexts beyond 2^36 bytes), which the
/// service's size limit makes unreachable.
pub fn seal(key: &[u8; KEY_LEN], nonce: &Nonce, plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = Aes256GcmSiv::new(GenericArray::from_slice(key));
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce.as_bytes()), b"", &mut buffer)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Ok(Sealed {
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate `ciphertext`.
///
/// Fails closed: every failure is the same [`CryptoError::AuthenticationFailed`]
/// and no partially decrypted bytes escape (the scratch buffer is zeroed).
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = Aes256GcmSiv::new(GenericArray::from_slice(key));
    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            buffer.as_mut_slice(),
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)?;
    Ok(buffer)
}
