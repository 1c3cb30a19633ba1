//! Secret encryption: envelope codec, key derivation and AES-256-GCM-SIV.
//!
//! This module is intentionally free of store and HTTP dependencies.
//!
//! # Token format
//!
//! ```text
//! version (1) ‖ nonce (12) ‖ tag (16) ‖ ciphertext (|plaintext|)
//! ```
//!
//! The version byte selects the PBKDF2 iteration count used to derive the
//! per-token key from the master key, the optional passphrase and the nonce.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod sealer;

pub use error::CryptoError;
pub use kdf::{KdfVersion, MasterKey};
pub use sealer::Sealer;
