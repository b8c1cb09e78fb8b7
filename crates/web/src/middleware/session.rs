//! Session middleware configuration.
//!
//! Production sessions live in `PostgreSQL` via `tower-sessions-sqlx-store`;
//! tests plug in `MemoryStore`. Both go through [`create_session_layer`].

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::PrintersConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "printers_session";

/// Session expiry time in seconds (2 weeks of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Create the session layer over any session store.
///
/// The cookie is marked `Secure` when the configured base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &PrintersConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
