//! In-memory identity provider for tests and database-less local runs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use printers_core::{Permission, UserId, Username};

use super::{
    AuthError, DEFAULT_GROUP, IdentityProvider, permission_from_flags, prepare_registration,
    reject_unknown_user, verify_password,
};
use crate::models::{User, UserFlags};

struct StoredUser {
    user: User,
    password_hash: String,
    groups: HashSet<String>,
    permissions: HashSet<Permission>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    users: HashMap<i32, StoredUser>,
    group_permissions: HashMap<String, HashSet<Permission>>,
}

impl Inner {
    fn find_mut(&mut self, username: &Username) -> Option<&mut StoredUser> {
        self.users
            .values_mut()
            .find(|stored| stored.user.username == *username)
    }
}

/// [`IdentityProvider`] holding users and grants in memory.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    inner: RwLock<Inner>,
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a permission directly to a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn grant_user_permission(
        &self,
        username: &str,
        permission: Permission,
    ) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        let mut inner = self.inner.write().await;
        let stored = inner.find_mut(&username).ok_or(AuthError::UserNotFound)?;
        stored.permissions.insert(permission);
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register_user(
        &self,
        username: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthError> {
        let (username, password_hash) =
            prepare_registration(username, password, password_confirmation)?;

        let mut inner = self.inner.write().await;
        if inner.find_mut(&username).is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let user = User {
            id: UserId::new(id),
            username,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
            last_login: None,
        };

        inner.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash,
                groups: HashSet::from([DEFAULT_GROUP.to_owned()]),
                permissions: HashSet::new(),
            },
        );
        inner
            .group_permissions
            .entry(DEFAULT_GROUP.to_owned())
            .or_default();

        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let mut inner = self.inner.write().await;
        let Some(stored) = inner.find_mut(&username) else {
            return Err(reject_unknown_user(password));
        };

        verify_password(password, &stored.password_hash)?;

        if !stored.user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        stored.user.last_login = Some(Utc::now());
        Ok(stored.user.clone())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .get(&id.as_i32())
            .map(|stored| stored.user.clone()))
    }

    async fn has_permission(
        &self,
        user: &User,
        permission: Permission,
    ) -> Result<bool, AuthError> {
        if let Some(decided) = permission_from_flags(user) {
            return Ok(decided);
        }

        let inner = self.inner.read().await;
        let Some(stored) = inner.users.get(&user.id.as_i32()) else {
            return Ok(false);
        };

        Ok(stored.permissions.contains(&permission)
            || stored.groups.iter().any(|group| {
                inner
                    .group_permissions
                    .get(group)
                    .is_some_and(|granted| granted.contains(&permission))
            }))
    }

    async fn set_flags(&self, username: &str, flags: UserFlags) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let mut inner = self.inner.write().await;
        let stored = inner.find_mut(&username).ok_or(AuthError::UserNotFound)?;
        flags.apply(&mut stored.user);
        Ok(stored.user.clone())
    }

    async fn grant_group_permission(
        &self,
        group: &str,
        permission: Permission,
    ) -> Result<(), AuthError> {
        self.inner
            .write()
            .await
            .group_permissions
            .entry(group.to_owned())
            .or_default()
            .insert(permission);
        Ok(())
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        let mut inner = self.inner.write().await;
        let stored = inner.find_mut(&username).ok_or(AuthError::UserNotFound)?;
        stored.groups.insert(group.to_owned());
        inner
            .group_permissions
            .entry(group.to_owned())
            .or_default();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PASSWORD: &str = "Str0ng-Passw0rd!";

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let provider = MemoryIdentityProvider::new();
        let user = provider
            .register_user("testuser", PASSWORD, PASSWORD)
            .await
            .unwrap();
        assert!(user.is_active);
        assert!(user.last_login.is_none());

        let logged_in = provider.authenticate("testuser", PASSWORD).await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.last_login.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider
            .register_user("testuser", PASSWORD, PASSWORD)
            .await
            .unwrap();
        let result = provider.register_user("testuser", PASSWORD, PASSWORD).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let provider = MemoryIdentityProvider::new();
        provider
            .register_user("testuser", PASSWORD, PASSWORD)
            .await
            .unwrap();

        assert!(matches!(
            provider.authenticate("testuser", "not-the-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.authenticate("nobody", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_authenticate() {
        let provider = MemoryIdentityProvider::new();
        provider
            .register_user("testuser", PASSWORD, PASSWORD)
            .await
            .unwrap();
        provider
            .set_flags(
                "testuser",
                UserFlags {
                    is_active: Some(false),
                    ..UserFlags::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            provider.authenticate("testuser", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_permissions_via_superuser_group_and_direct_grant() {
        let provider = MemoryIdentityProvider::new();
        let regular = provider
            .register_user("regular", PASSWORD, PASSWORD)
            .await
            .unwrap();
        assert!(
            !provider
                .has_permission(&regular, Permission::DeletePrinter)
                .await
                .unwrap()
        );

        let admin = provider
            .register_user("admin", PASSWORD, PASSWORD)
            .await
            .unwrap();
        let admin = provider
            .set_flags(
                admin.username.as_str(),
                UserFlags {
                    is_staff: Some(true),
                    is_superuser: Some(true),
                    ..UserFlags::default()
                },
            )
            .await
            .unwrap();
        assert!(
            provider
                .has_permission(&admin, Permission::DeletePrinter)
                .await
                .unwrap()
        );

        provider
            .grant_group_permission(DEFAULT_GROUP, Permission::ChangePrinter)
            .await
            .unwrap();
        assert!(
            provider
                .has_permission(&regular, Permission::ChangePrinter)
                .await
                .unwrap()
        );

        provider
            .grant_user_permission("regular", Permission::DeletePrinter)
            .await
            .unwrap();
        assert!(
            provider
                .has_permission(&regular, Permission::DeletePrinter)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_staff_alone_cannot_delete() {
        let provider = MemoryIdentityProvider::new();
        provider
            .register_user("staffer", PASSWORD, PASSWORD)
            .await
            .unwrap();
        let staff = provider
            .set_flags(
                "staffer",
                UserFlags {
                    is_staff: Some(true),
                    ..UserFlags::default()
                },
            )
            .await
            .unwrap();
        assert!(
            !provider
                .has_permission(&staff, Permission::DeletePrinter)
                .await
                .unwrap()
        );
    }
}
