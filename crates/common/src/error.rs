//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::WrongPassphrase`] → 403
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Unavailable`] → 503
///
/// Every message is returned to callers verbatim, so variants must only carry
/// text that is safe to expose (no plaintext, passphrases or opaque keys).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: bad JSON, an empty secret or a TTL out of range.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No secret exists under the key: never created, already revealed,
    /// burned, or expired. The four cases are deliberately indistinguishable.
    #[error("secret does not exist or has expired")]
    NotFound,

    /// The passphrase did not open the secret. The secret has been destroyed.
    #[error("wrong passphrase; the secret has been destroyed")]
    WrongPassphrase,

    /// A stored secret failed to decrypt or decode without a passphrase being
    /// involved, which means corruption or tampering.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The secret store is unreachable or timed out.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::WrongPassphrase => 403,
            ServiceError::NotFound => 404,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code placed in [`crate::protocol::ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::WrongPassphrase => "wrong_passphrase",
            ServiceError::NotFound => "not_found",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::WrongPassphrase.http_status(), 403);
        assert_eq!(ServiceError::NotFound.http_status(), 404);
        assert_eq!(
            ServiceError::EncryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::Unavailable("x".into()).http_status(), 503);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ServiceError::NotFound.code(), "not_found");
        assert_eq!(ServiceError::WrongPassphrase.code(), "wrong_passphrase");
        assert_eq!(
            ServiceError::Unavailable("redis".into()).code(),
            "service_unavailable"
        );
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("ttl_seconds must be at most 604800".into());
        assert!(e.to_string().contains("604800"));
    }
}
