//! Authentication route handlers.
//!
//! Handles login, logout, and self-service registration against the
//! configured `IdentityProvider`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::services::auth::AuthError;
use crate::state::AppState;

const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both \
    fields may be case-sensitive.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: &'static str,
    pub username: String,
    pub errors: Vec<String>,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    let error = match query.error.as_deref() {
        Some("credentials") => Some(INVALID_LOGIN.to_owned()),
        Some(_) => Some("Something went wrong. Please try again.".to_owned()),
        None => None,
    };
    LoginTemplate {
        title: "Log in",
        error,
    }
}

/// Handle login form submission.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let user = match state
        .identity()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_client_error() => {
            tracing::warn!(error = %e, "Login failed");
            return Ok(Redirect::to("/login/?error=credentials"));
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Redirect::to("/"))
}

/// End the session.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {
        title: "Register",
        username: String::new(),
        errors: Vec::new(),
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new user in.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let user = match state
        .identity()
        .register_user(&form.username, &form.password1, &form.password2)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_client_error() => {
            tracing::info!(error = %e, "Registration rejected");
            return Ok(RegisterTemplate {
                title: "Register",
                username: form.username,
                errors: registration_errors(e),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    tracing::info!(user_id = %user.id, "User registered");

    Ok(Redirect::to("/").into_response())
}

/// User-facing messages for a rejected registration.
fn registration_errors(err: AuthError) -> Vec<String> {
    match err {
        AuthError::WeakPassword(problems) => problems,
        AuthError::PasswordMismatch => vec!["The two password fields didn't match.".to_owned()],
        AuthError::UserAlreadyExists => {
            vec!["A user with that username already exists.".to_owned()]
        }
        AuthError::InvalidUsername(e) => vec![format!("Enter a valid username: {e}.")],
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printers_core::UsernameError;

    #[test]
    fn test_registration_errors() {
        let problems = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(
            registration_errors(AuthError::WeakPassword(problems.clone())),
            problems
        );
        assert_eq!(
            registration_errors(AuthError::PasswordMismatch),
            vec!["The two password fields didn't match."]
        );
        assert_eq!(
            registration_errors(AuthError::InvalidUsername(UsernameError::Empty)),
            vec!["Enter a valid username: username cannot be empty."]
        );
    }
}
