//! Authentication extractors and session helpers.
//!
//! Extractors resolve the session's user through the configured
//! `IdentityProvider`, so deactivating an account takes effect on the user's
//! next request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, User, session_keys};
use crate::services::auth::Principal;
use crate::state::AppState;

/// Path anonymous users are sent to.
pub const LOGIN_PATH: &str = "/login/";

/// Extractor that requires an authenticated, active user.
///
/// Anonymous requests are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when a request can't be attributed to a user.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing or the identity store failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn resolve_principal(parts: &Parts, state: &AppState) -> Result<Principal, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Internal)?;

    state
        .identity()
        .current_user(session)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve session user");
            AuthRejection::Internal
        })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, state).await? {
            Principal::Authenticated(user) => Ok(Self(user)),
            Principal::Anonymous => Err(AuthRejection::RedirectToLogin),
        }
    }
}

/// Store the logged-in user in the session.
///
/// The session id is cycled first so a pre-login id can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
        .await
}

/// End the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
