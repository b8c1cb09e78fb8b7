//! HTTP route handlers for the printer registry.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Printer listing (requires auth)
//! POST /add_printer/              - Create printer (requires auth)
//! POST /update_printer/{id}/      - Replace printer fields (requires auth)
//! POST /delete_printer/{id}/      - Delete printer (requires delete permission)
//!
//! # Auth
//! GET  /login/                    - Login page
//! POST /login/                    - Login action
//! GET  /register/                 - Register page
//! POST /register/                 - Register action
//! GET  /logout/, POST /logout/    - Logout action
//!
//! # Health
//! GET  /health                    - Liveness
//! GET  /health/ready              - Store readiness
//! ```

pub mod auth;
pub mod health;
pub mod printers;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the page routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(printers::index))
        .route("/add_printer/", post(printers::add_printer))
        .route("/update_printer/{id}/", post(printers::update_printer))
        .route("/delete_printer/{id}/", post(printers::delete_printer))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout))
        .route("/register/", get(auth::register_page).post(auth::register))
}

/// Build the complete application: pages, health checks, sessions, tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
