//! [`Sealer`]: plaintext + optional passphrase ⇄ envelope bytes.

use std::sync::Arc;

use zeroize::Zeroizing;

use super::cipher::{self, Nonce};
use super::envelope::Envelope;
use super::error::CryptoError;
use super::kdf::{derive_key, KdfVersion, MasterKey};

/// Encrypts and decrypts tokens under the service master key.
///
/// New tokens are written at the configured version; decryption follows
/// whatever version byte the token carries, so older tokens keep working
/// after the encrypt version is raised.
#[derive(Clone, Debug)]
pub struct Sealer {
    master_key: Arc<MasterKey>,
    encrypt_version: KdfVersion,
}

impl Sealer {
    /// Create a sealer owning `master_key`.
    pub fn new(master_key: MasterKey, encrypt_version: KdfVersion) -> Self {
        Self {
            master_key: Arc::new(master_key),
            encrypt_version,
        }
    }

    /// Version byte written into new tokens.
    pub fn encrypt_version(&self) -> KdfVersion {
        self.encrypt_version
    }

    /// Encrypt `plaintext` into an encoded envelope.
    ///
    /// A fresh nonce is generated on every call; it is both the AEAD nonce and
    /// the key-derivation salt.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyPlaintext`] for an empty input.
    pub fn encrypt(&self, plaintext: &[u8], passphrase: Option<&str>) -> Result<Vec<u8>, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::EmptyPlaintext);
        }

        let nonce = Nonce::generate();
        let key = derive_key(
            &self.master_key,
            passphrase,
            nonce.as_bytes(),
            self.encrypt_version,
        );
        let sealed = cipher::seal(&key, &nonce, plaintext)?;

        Ok(Envelope {
            version: self.encrypt_version,
            nonce: *nonce.as_bytes(),
            tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        }
        .encode())
    }

    /// Decrypt an encoded envelope.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::MalformedEnvelope`] / [`CryptoError::UnsupportedVersion`]
    ///   from parsing, before any key is derived.
    /// - [`CryptoError::AuthenticationFailed`] for any wrong key, passphrase or
    ///   tampered byte.
    pub fn decrypt(
        &self,
        token: &[u8],
        passphrase: Option<&str>,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let envelope = Envelope::decode(token)?;
        let key = derive_key(&self.master_key, passphrase, &envelope.nonce, envelope.version);
        cipher::open(&key, &envelope.nonce, &envelope.ciphertext, &envelope.tag)
    }
}
