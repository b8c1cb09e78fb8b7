//! User, group, and permission repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use printers_core::{GroupId, Permission, UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{User, UserFlags};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
            last_login: row.last_login,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

const USER_COLUMNS: &str =
    "id, username, is_active, is_staff, is_superuser, created_at, last_login";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM app_user WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some((User::try_from(r.user)?, r.password_hash)))
    }

    /// Create a user and add them to `group`, creating the group if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        username: &Username,
        password_hash: &str,
        group: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO app_user (username, password_hash)
            VALUES ($1, $2)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        let user = User::try_from(row)?;
        let group_id = ensure_group(&mut *tx, group).await?;

        sqlx::query(
            r"
            INSERT INTO user_group (user_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(user.id)
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_login(&self, id: UserId) -> Result<DateTime<Utc>, RepositoryError> {
        let at = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "UPDATE app_user SET last_login = NOW() WHERE id = $1 RETURNING last_login",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .flatten();

        at.ok_or(RepositoryError::NotFound)
    }

    /// Update a user's flags. Unset flags keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_flags(
        &self,
        username: &Username,
        flags: UserFlags,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE app_user
            SET is_active = COALESCE($2, is_active),
                is_staff = COALESCE($3, is_staff),
                is_superuser = COALESCE($4, is_superuser)
            WHERE username = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username.as_str())
        .bind(flags.is_active)
        .bind(flags.is_staff)
        .bind(flags.is_superuser)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Whether a permission is granted to the user directly or via a group.
    ///
    /// Does not consider the superuser flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_granted_permission(
        &self,
        id: UserId,
        permission: Permission,
    ) -> Result<bool, RepositoryError> {
        let granted: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM user_permission
                WHERE user_id = $1 AND codename = $2
                UNION ALL
                SELECT 1 FROM user_group ug
                JOIN group_permission gp ON gp.group_id = ug.group_id
                WHERE ug.user_id = $1 AND gp.codename = $2
            )
            ",
        )
        .bind(id)
        .bind(permission.codename())
        .fetch_one(self.pool)
        .await?;

        Ok(granted)
    }

    /// Grant a permission to a group, creating the group if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn grant_group_permission(
        &self,
        group: &str,
        permission: Permission,
    ) -> Result<GroupId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let group_id = ensure_group(&mut *tx, group).await?;

        sqlx::query(
            r"
            INSERT INTO group_permission (group_id, codename)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(group_id)
        .bind(permission.codename())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(group_id)
    }

    /// Add a user to a group, creating the group if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_to_group(&self, username: &Username, group: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let group_id = ensure_group(&mut *tx, group).await?;

        let result = sqlx::query(
            r"
            INSERT INTO user_group (user_id, group_id)
            SELECT id, $2 FROM app_user WHERE username = $1
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(username.as_str())
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM app_user WHERE username = $1)")
                    .bind(username.as_str())
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Look up a group by name, inserting it if absent.
async fn ensure_group(conn: &mut PgConnection, name: &str) -> Result<GroupId, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO app_group (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        ",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;

    Ok(GroupId::new(id))
}
