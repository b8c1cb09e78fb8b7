//! User and group management commands.
//!
//! These go through the same `IdentityProvider` the web app uses, so
//! usernames and passwords are held to the registration rules.

use printers_core::Permission;
use printers_web::models::UserFlags;
use printers_web::services::auth::{AuthError, IdentityProvider, PgIdentityProvider};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unknown permission name.
    #[error("Invalid permission: {0}. Valid permissions: add_printer, change_printer, delete_printer, view_printer")]
    InvalidPermission(String),

    /// Nothing to change.
    #[error("Nothing to do: pass --superuser and/or --staff")]
    NoFlags,
}

async fn provider() -> Result<PgIdentityProvider, CommandError> {
    Ok(PgIdentityProvider::new(connect().await?))
}

/// Register a user and optionally raise their flags.
///
/// # Errors
///
/// Returns an error if the username or password is rejected, or the
/// username is taken.
pub async fn create_user(
    username: &str,
    password: &str,
    superuser: bool,
    staff: bool,
) -> Result<(), UserCommandError> {
    let provider = provider().await?;

    let mut user = provider.register_user(username, password, password).await?;
    if superuser || staff {
        user = provider
            .set_flags(
                username,
                UserFlags {
                    is_staff: Some(staff || superuser),
                    is_superuser: Some(superuser),
                    ..UserFlags::default()
                },
            )
            .await?;
    }

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        staff = user.is_staff,
        superuser = user.is_superuser,
        "User created"
    );
    Ok(())
}

/// Set the staff and/or superuser flag on an existing user.
///
/// # Errors
///
/// Returns an error if no flag is requested or the user doesn't exist.
pub async fn promote_user(
    username: &str,
    superuser: bool,
    staff: bool,
) -> Result<(), UserCommandError> {
    if !superuser && !staff {
        return Err(UserCommandError::NoFlags);
    }

    let user = provider()
        .await?
        .set_flags(
            username,
            UserFlags {
                is_staff: (staff || superuser).then_some(true),
                is_superuser: superuser.then_some(true),
                ..UserFlags::default()
            },
        )
        .await?;

    tracing::info!(
        username = %user.username,
        staff = user.is_staff,
        superuser = user.is_superuser,
        "User promoted"
    );
    Ok(())
}

/// Mark a user inactive. Existing sessions stop resolving on their next request.
///
/// # Errors
///
/// Returns an error if the user doesn't exist.
pub async fn deactivate_user(username: &str) -> Result<(), UserCommandError> {
    let user = provider()
        .await?
        .set_flags(
            username,
            UserFlags {
                is_active: Some(false),
                ..UserFlags::default()
            },
        )
        .await?;

    tracing::info!(username = %user.username, "User deactivated");
    Ok(())
}

/// Grant a permission to every member of a group.
///
/// # Errors
///
/// Returns an error if the permission name is unknown.
pub async fn grant_permission(group: &str, permission: &str) -> Result<(), UserCommandError> {
    let permission: Permission = permission
        .parse()
        .map_err(|_| UserCommandError::InvalidPermission(permission.to_owned()))?;

    provider()
        .await?
        .grant_group_permission(group, permission)
        .await?;

    tracing::info!(group, permission = %permission, "Permission granted");
    Ok(())
}

/// Add a user to a group.
///
/// # Errors
///
/// Returns an error if the user doesn't exist.
pub async fn add_to_group(group: &str, username: &str) -> Result<(), UserCommandError> {
    provider().await?.add_user_to_group(username, group).await?;
    tracing::info!(group, username, "User added to group");
    Ok(())
}
