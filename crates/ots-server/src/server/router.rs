//! Axum router construction.

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::header,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    let body_limit = middleware::body_limit(state.max_secret_bytes);

    Router::new()
        .route("/secrets", post(handlers::create_secret))
        .route("/secrets/:key", get(handlers::peek_secret))
        .route("/secrets/:key/reveal", post(handlers::reveal_secret))
        .route("/secrets/:key/burn", post(handlers::burn_secret))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_span::<Body>))
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            middleware::no_store(),
        ))
        .with_state(state)
}
