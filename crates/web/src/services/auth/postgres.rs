//! `PostgreSQL`-backed identity provider.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use printers_core::{Permission, UserId, Username};

use super::{
    AuthError, DEFAULT_GROUP, IdentityProvider, permission_from_flags, prepare_registration,
    reject_unknown_user, verify_password,
};
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{User, UserFlags};

/// [`IdentityProvider`] over the `app_user`/`app_group` tables.
#[derive(Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }
}

fn not_found_as_user_not_found(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::NotFound => AuthError::UserNotFound,
        other => AuthError::Repository(other),
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    #[instrument(skip(self, password, password_confirmation))]
    async fn register_user(
        &self,
        username: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthError> {
        let (username, password_hash) =
            prepare_registration(username, password, password_confirmation)?;

        self.users()
            .create_with_password(&username, &password_hash, DEFAULT_GROUP)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    #[instrument(skip(self, password))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((mut user, password_hash)) = self.users().get_password_hash(&username).await?
        else {
            return Err(reject_unknown_user(password));
        };

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        user.last_login = Some(self.users().record_login(user.id).await?);
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users().get_by_id(id).await?)
    }

    async fn has_permission(
        &self,
        user: &User,
        permission: Permission,
    ) -> Result<bool, AuthError> {
        if let Some(decided) = permission_from_flags(user) {
            return Ok(decided);
        }
        Ok(self
            .users()
            .has_granted_permission(user.id, permission)
            .await?)
    }

    async fn set_flags(&self, username: &str, flags: UserFlags) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        self.users()
            .set_flags(&username, flags)
            .await
            .map_err(not_found_as_user_not_found)
    }

    async fn grant_group_permission(
        &self,
        group: &str,
        permission: Permission,
    ) -> Result<(), AuthError> {
        self.users()
            .grant_group_permission(group, permission)
            .await?;
        Ok(())
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        self.users()
            .add_to_group(&username, group)
            .await
            .map_err(not_found_as_user_not_found)
    }
}
