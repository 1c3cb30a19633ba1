//! [`StoredSecret`]: the JSON record kept in the store for one secret.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::SecretError;

/// What the store holds for one secret.
///
/// `HasPassphrase` sits next to the token so a peek or a failed reveal can
/// tell the two kinds of secret apart without decrypting. Field names are
/// PascalCase to stay readable alongside records written by the previous
/// implementation of this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredSecret {
    /// Standard base64 of the encoded envelope.
    pub encrypted_data: String,
    /// Whether the envelope was sealed with a passphrase.
    pub has_passphrase: bool,
}

impl StoredSecret {
    /// Wrap an encoded envelope.
    pub fn new(envelope: &[u8], has_passphrase: bool) -> Self {
        Self {
            encrypted_data: STANDARD.encode(envelope),
            has_passphrase,
        }
    }

    /// Decode the envelope bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::CorruptRecord`] if the data is not valid base64.
    pub fn envelope(&self) -> Result<Vec<u8>, SecretError> {
        STANDARD
            .decode(&self.encrypted_data)
            .map_err(|e| SecretError::CorruptRecord(format!("envelope is not base64: {e}")))
    }

    /// Serialise for the store.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Internal`] if JSON serialisation fails.
    pub fn to_blob(&self) -> Result<Vec<u8>, SecretError> {
        serde_json::to_vec(self).map_err(|e| SecretError::Internal(e.to_string()))
    }

    /// Parse a blob read from the store.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::CorruptRecord`] if the blob is not a stored secret.
    pub fn from_blob(blob: &[u8]) -> Result<Self, SecretError> {
        serde_json::from_slice(blob)
            .map_err(|e| SecretError::CorruptRecord(format!("invalid stored secret: {e}")))
    }
}
