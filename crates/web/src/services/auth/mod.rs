//! Authentication and authorization service.
//!
//! Handlers and the printer service depend only on the [`IdentityProvider`]
//! trait. Two implementations exist:
//!
//! - [`PgIdentityProvider`] - users, groups, and grants in `PostgreSQL`
//! - [`MemoryIdentityProvider`] - the same semantics held in memory

mod error;
mod memory;
mod password;
mod postgres;

pub use error::AuthError;
pub use memory::MemoryIdentityProvider;
pub use password::{hash_password, validate_password, verify_password};
use password::reject_unknown_user;
pub use postgres::PgIdentityProvider;

use async_trait::async_trait;
use tower_sessions::Session;

use printers_core::{Permission, UserId, Username};

use crate::models::{CurrentUser, User, UserFlags, session_keys};

/// Group every newly registered user joins.
pub const DEFAULT_GROUP: &str = "RegularUser";

/// The actor behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(User),
}

impl Principal {
    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

/// User registration, login, and permission lookups.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and add it to [`DEFAULT_GROUP`].
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidUsername` if the username is malformed
    /// - `AuthError::PasswordMismatch` if the confirmation differs
    /// - `AuthError::WeakPassword` if the password policy rejects the password
    /// - `AuthError::UserAlreadyExists` if the username is taken
    async fn register_user(
        &self,
        username: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthError>;

    /// Check credentials and record the login time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for unknown users, wrong
    /// passwords, and inactive accounts.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Load a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Whether a user holds a permission.
    ///
    /// Inactive users hold nothing; active superusers hold everything;
    /// otherwise the permission must be granted directly or via a group.
    async fn has_permission(&self, user: &User, permission: Permission)
    -> Result<bool, AuthError>;

    /// Update a user's active/staff/superuser flags.
    async fn set_flags(&self, username: &str, flags: UserFlags) -> Result<User, AuthError>;

    /// Grant a permission to every member of a group.
    async fn grant_group_permission(
        &self,
        group: &str,
        permission: Permission,
    ) -> Result<(), AuthError>;

    /// Add a user to a group.
    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), AuthError>;

    /// Resolve the session's principal.
    ///
    /// The user is reloaded on every call so flag changes apply immediately.
    /// A session naming a missing or inactive user is anonymous.
    async fn current_user(&self, session: &Session) -> Result<Principal, AuthError> {
        let Some(current) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?
        else {
            return Ok(Principal::Anonymous);
        };

        match self.get_user(current.id).await? {
            Some(user) if user.is_active => Ok(Principal::Authenticated(user)),
            _ => Ok(Principal::Anonymous),
        }
    }
}

/// Validate registration input shared by every provider.
///
/// Returns the parsed username and the argon2 hash of the password.
pub(crate) fn prepare_registration(
    username: &str,
    password: &str,
    password_confirmation: &str,
) -> Result<(Username, String), AuthError> {
    let username = Username::parse(username)?;

    if password != password_confirmation {
        return Err(AuthError::PasswordMismatch);
    }

    validate_password(password, username.as_str())?;
    let hash = hash_password(password)?;

    Ok((username, hash))
}

/// Flag-based part of a permission check. `None` means grants must be consulted.
pub(crate) const fn permission_from_flags(user: &User) -> Option<bool> {
    if !user.is_active {
        Some(false)
    } else if user.is_superuser {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_active: bool, is_superuser: bool) -> User {
        User {
            id: UserId::new(1),
            username: Username::parse("testuser").unwrap(),
            is_active,
            is_staff: true,
            is_superuser,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_permission_from_flags() {
        assert_eq!(permission_from_flags(&user(true, true)), Some(true));
        assert_eq!(permission_from_flags(&user(false, true)), Some(false));
        assert_eq!(permission_from_flags(&user(true, false)), None);
    }

    #[test]
    fn test_prepare_registration_order_of_checks() {
        assert!(matches!(
            prepare_registration("bad name", "a", "b"),
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            prepare_registration("testuser", "Str0ng-Passw0rd!", "Str0ng-Passw0rd?"),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            prepare_registration("testuser", "short", "short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_principal_accessors() {
        assert!(Principal::Anonymous.user().is_none());
        let principal = Principal::Authenticated(user(true, false));
        assert_eq!(principal.user().unwrap().username.as_str(), "testuser");
    }
}
