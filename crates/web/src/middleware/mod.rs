//! HTTP middleware for the printer registry.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (one `http_request` span per request)
//! 3. Request ID (correlate logs and Sentry events)
//! 4. Session layer (tower-sessions)
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! extractor.

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use flash::{push_flash, take_flashes};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
