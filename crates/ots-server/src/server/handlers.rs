//! Axum request handlers for all service endpoints.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use common::protocol::{
    BurnSecretResponse, ComponentHealth, CreateSecretRequest, CreateSecretResponse,
    ErrorResponse, HealthResponse, RevealSecretRequest, RevealSecretResponse,
    SecretStatusResponse,
};
use common::ServiceError;
use tracing::{error, warn};

use super::state::AppState;
use crate::secret::SecretError;

/// `POST /secrets`: encrypt and store a new secret.
pub async fn create_secret(
    State(state): State<AppState>,
    body: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(&ServiceError::BadRequest(rejection_message(&rejection).into()))
        }
    };

    if req.plaintext.len() > state.max_secret_bytes {
        let err = ServiceError::BadRequest(format!(
            "secret must not exceed {} bytes",
            state.max_secret_bytes
        ));
        return error_response(&err);
    }

    match state
        .service
        .create(req.plaintext, req.passphrase, req.ttl_seconds)
        .await
    {
        Ok(created) => {
            let body = CreateSecretResponse {
                secret_path: secret_path(&created.key),
                burn_path: burn_path(&created.key),
                expires_in: humanize_ttl(created.ttl),
                key: created.key,
                has_passphrase: created.has_passphrase,
                expires_at: created.expires_at,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(&service_error(e)),
    }
}

/// `GET /secrets/:key`: does the secret exist, and does it need a passphrase?
pub async fn peek_secret(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.service.peek(&key).await {
        Ok(status) => Json(SecretStatusResponse {
            has_passphrase: status.has_passphrase,
        })
        .into_response(),
        Err(e) => error_response(&service_error(e)),
    }
}

/// `POST /secrets/:key/reveal`: return the plaintext and destroy the secret.
///
/// The body is optional. A body that is present but not valid JSON is
/// rejected before the store is touched, so it does not cost the secret.
pub async fn reveal_secret(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        RevealSecretRequest::default()
    } else {
        match serde_json::from_slice::<RevealSecretRequest>(&body) {
            Ok(r) => r,
            Err(_) => {
                let err = ServiceError::BadRequest(
                    "request body is not a valid JSON request for this endpoint".into(),
                );
                return error_response(&err);
            }
        }
    };

    match state.service.reveal(&key, req.passphrase).await {
        Ok(plaintext) => Json(RevealSecretResponse { plaintext }).into_response(),
        Err(e) => error_response(&service_error(e)),
    }
}

/// `POST /secrets/:key/burn`: destroy the secret unread. Idempotent.
pub async fn burn_secret(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.service.burn(&key).await {
        Ok(()) => Json(BurnSecretResponse {
            burned_at: Utc::now(),
        })
        .into_response(),
        Err(e) => error_response(&service_error(e)),
    }
}

/// `GET /health`: liveness and store readiness.
///
/// Returns `200 OK` when a probe key can be written, read back and deleted.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let probe = state.service.check_store().await;
    let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status_code, status_str, store_status) = match probe {
        Ok(()) => (StatusCode::OK, "ok", "up"),
        Err(e) => {
            warn!(error = %e, "store health probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
        }
    };

    let body = HealthResponse {
        status: status_str.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        store: ComponentHealth {
            status: store_status.into(),
            response_time_ms,
        },
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Translate a lifecycle error into what the caller is allowed to see.
///
/// Store and integrity details stay in the logs; the response carries a fixed
/// message.
fn service_error(err: SecretError) -> ServiceError {
    match err {
        SecretError::NotFoundOrExpired => ServiceError::NotFound,
        SecretError::WrongPassphrase => ServiceError::WrongPassphrase,
        e @ (SecretError::InvalidTtl(_) | SecretError::EmptySecret) => {
            ServiceError::BadRequest(e.to_string())
        }
        SecretError::Crypto(_) | SecretError::CorruptRecord(_) => {
            ServiceError::EncryptionFailure("the stored secret could not be decrypted".into())
        }
        SecretError::StoreUnavailable(e) => {
            warn!(error = %e, "secret store unavailable");
            ServiceError::Unavailable("secret store unavailable".into())
        }
        SecretError::Internal(msg) => {
            error!(error = %msg, "internal error");
            ServiceError::Internal("unexpected error".into())
        }
    }
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

/// Fixed messages only: serde errors can quote the offending input.
fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "expected a request body with Content-Type: application/json"
        }
        JsonRejection::BytesRejection(_) => "request body is too large or could not be read",
        _ => "request body is not a valid JSON request for this endpoint",
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn secret_path(key: &str) -> String {
    format!("/secrets/{key}")
}

fn burn_path(key: &str) -> String {
    format!("/secrets/{key}/burn")
}

/// Coarse lifetime for display: whole days, else whole hours, else minutes.
fn humanize_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    match (days, hours) {
        (d, _) if d > 1 => format!("{d} days"),
        (1, _) => "1 day".into(),
        (0, h) if h > 1 => format!("{h} hours"),
        (0, 1) => "1 hour".into(),
        _ if minutes == 1 => "1 minute".into(),
        _ => format!("{minutes} minutes"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::header;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::crypto::{CryptoError, KdfVersion, MasterKey, Sealer};
    use crate::secret::SecretService;
    use crate::server::router;
    use crate::store::{MockSecretStore, StoreError};

    fn server() -> TestServer {
        TestServer::new(router::build(AppState::in_memory())).unwrap()
    }

    async fn create(server: &TestServer, body: Value) -> CreateSecretResponse {
        let resp = server.post("/secrets").json(&body).await;
        resp.assert_status(StatusCode::CREATED);
        resp.json::<CreateSecretResponse>()
    }

    #[tokio::test]
    async fn create_returns_paths_and_expiry() {
        let server = server();
        let created = create(
            &server,
            json!({"plaintext": "hello world", "ttl_seconds": 3600}),
        )
        .await;
        assert_eq!(created.key.len(), 48);
        assert!(!created.has_passphrase);
        assert_eq!(created.expires_in, "1 hour");
        assert_eq!(created.secret_path, format!("/secrets/{}", created.key));
        assert_eq!(created.burn_path, format!("/secrets/{}/burn", created.key));
        assert!(created.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn hello_world_is_revealed_exactly_once() {
        let server = server();
        let created = create(
            &server,
            json!({"plaintext": "hello world", "ttl_seconds": 60}),
        )
        .await;

        let peek = server.get(&created.secret_path).await;
        peek.assert_status_ok();
        assert_eq!(peek.json::<Value>()["has_passphrase"], false);

        let reveal = server.post(&format!("{}/reveal", created.secret_path)).await;
        reveal.assert_status_ok();
        assert_eq!(reveal.json::<Value>()["plaintext"], "hello world");

        let again = server.post(&format!("{}/reveal", created.secret_path)).await;
        again.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(again.json::<ErrorResponse>().code, "not_found");
    }

    #[tokio::test]
    async fn wrong_passphrase_is_403_then_404() {
        let server = server();
        let created = create(
            &server,
            json!({"plaintext": "s", "passphrase": "right", "ttl_seconds": 60}),
        )
        .await;
        assert!(created.has_passphrase);
        let reveal_path = format!("{}/reveal", created.secret_path);

        let wrong = server
            .post(&reveal_path)
            .json(&json!({"passphrase": "wrong"}))
            .await;
        wrong.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(wrong.json::<ErrorResponse>().code, "wrong_passphrase");

        server
            .post(&reveal_path)
            .json(&json!({"passphrase": "right"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_reveal_body_does_not_consume() {
        let server = server();
        let created = create(&server, json!({"plaintext": "keep", "ttl_seconds": 60})).await;
        let reveal_path = format!("{}/reveal", created.secret_path);

        server
            .post(&reveal_path)
            .text("{not json")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let ok = server.post(&reveal_path).json(&json!({})).await;
        ok.assert_status_ok();
        assert_eq!(ok.json::<Value>()["plaintext"], "keep");
    }

    #[tokio::test]
    async fn burn_then_reveal_is_404() {
        let server = server();
        let created = create(&server, json!({"plaintext": "x", "ttl_seconds": 60})).await;

        for _ in 0..2 {
            let burn = server.post(&created.burn_path).await;
            burn.assert_status_ok();
            assert!(burn.json::<Value>()["burned_at"].is_string());
        }
        server
            .post(&format!("{}/reveal", created.secret_path))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&created.secret_path)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let server = server();
        let cases = [
            json!({"plaintext": "x", "ttl_seconds": 604_801}),
            json!({"plaintext": "", "ttl_seconds": 60}),
            json!({"plaintext": "x".repeat(1025), "ttl_seconds": 60}),
            json!({"plaintext": "x"}),
            json!({"plaintext": 5, "ttl_seconds": 60}),
        ];
        for body in cases {
            let resp = server.post("/secrets").json(&body).await;
            resp.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(resp.json::<ErrorResponse>().code, "bad_request");
        }
    }

    #[tokio::test]
    async fn create_rejects_non_json_body() {
        let resp = server().post("/secrets").text("plaintext=x").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_or_malformed_key_is_404() {
        let server = server();
        server
            .get(&format!("/secrets/{}", "0".repeat(48)))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/secrets/not-a-key")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post("/secrets/not-a-key/burn")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn every_response_is_no_store() {
        let server = server();
        let created = server
            .post("/secrets")
            .json(&json!({"plaintext": "x", "ttl_seconds": 60}))
            .await;
        assert_eq!(created.header(header::CACHE_CONTROL), "no-store");
        let missing = server.get("/nope").await;
        assert_eq!(missing.header(header::CACHE_CONTROL), "no-store");
    }

    #[tokio::test]
    async fn health_is_ok_with_memory_store() {
        let resp = server().get("/health").await;
        resp.assert_status_ok();
        let body = resp.json::<HealthResponse>();
        assert_eq!(body.status, "ok");
        assert_eq!(body.store.status, "up");
    }

    #[tokio::test]
    async fn health_is_503_when_store_is_down() {
        let mut store = MockSecretStore::new();
        store
            .expect_ping()
            .returning(|| Err(StoreError::Unavailable("connection refused".into())));
        let sealer = Sealer::new(MasterKey::new(b"k".to_vec()), KdfVersion::V1);
        let service = SecretService::new(Arc::new(store), sealer, Duration::from_secs(1));
        let server = TestServer::new(router::build(AppState::new(service, 1024))).unwrap();

        let resp = server.get("/health").await;
        resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body = resp.json::<HealthResponse>();
        assert_eq!(body.status, "degraded");
        assert_eq!(body.store.status, "down");
    }

    #[tokio::test]
    async fn store_outage_on_reveal_is_503() {
        let mut store = MockSecretStore::new();
        store
            .expect_take_and_delete()
            .returning(|_| Err(StoreError::Unavailable("broken pipe".into())));
        let sealer = Sealer::new(MasterKey::new(b"k".to_vec()), KdfVersion::V1);
        let service = SecretService::new(Arc::new(store), sealer, Duration::from_secs(1));
        let server = TestServer::new(router::build(AppState::new(service, 1024))).unwrap();

        let resp = server
            .post(&format!("/secrets/{}/reveal", "ab".repeat(24)))
            .await;
        resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body = resp.json::<ErrorResponse>();
        assert_eq!(body.code, "service_unavailable");
        assert!(!body.message.contains("broken pipe"));
    }

    #[test]
    fn error_mapping() {
        assert!(matches!(
            service_error(SecretError::NotFoundOrExpired),
            ServiceError::NotFound
        ));
        assert!(matches!(
            service_error(SecretError::WrongPassphrase),
            ServiceError::WrongPassphrase
        ));
        assert!(matches!(
            service_error(SecretError::InvalidTtl(1_000_000)),
            ServiceError::BadRequest(_)
        ));
        assert!(matches!(
            service_error(SecretError::Crypto(CryptoError::AuthenticationFailed)),
            ServiceError::EncryptionFailure(_)
        ));
        assert!(matches!(
            service_error(SecretError::CorruptRecord("bad".into())),
            ServiceError::EncryptionFailure(_)
        ));
        assert!(matches!(
            service_error(SecretError::Internal("join".into())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn humanize_matches_display_rules() {
        let h = |s| humanize_ttl(Duration::from_secs(s));
        assert_eq!(h(604_800), "7 days");
        assert_eq!(h(2 * 86_400), "2 days");
        assert_eq!(h(86_400 + 5 * 3600), "1 day");
        assert_eq!(h(86_400), "1 day");
        assert_eq!(h(5 * 3600 + 59), "5 hours");
        assert_eq!(h(3600), "1 hour");
        assert_eq!(h(3599), "59 minutes");
        assert_eq!(h(60), "1 minute");
        assert_eq!(h(119), "1 minute");
        assert_eq!(h(30), "0 minutes");
        assert_eq!(h(0), "0 minutes");
    }
}
