//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use printers_core::{UserId, Username};

/// A login account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Inactive users cannot log in and hold no permissions.
    pub is_active: bool,
    /// May use management tooling. Grants no printer permissions by itself.
    pub is_staff: bool,
    /// Implicitly holds every permission while active.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

/// Partial update of a user's flags. `None` leaves a flag unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UserFlags {
    /// Apply these flags to a user in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(staff) = self.is_staff {
            user.is_staff = staff;
        }
        if let Some(superuser) = self.is_superuser {
            user.is_superuser = superuser;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_apply_only_set_values() {
        let mut user = User {
            id: UserId::new(1),
            username: Username::parse("testuser").unwrap(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
            last_login: None,
        };

        UserFlags {
            is_superuser: Some(true),
            ..UserFlags::default()
        }
        .apply(&mut user);

        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(user.is_superuser);
    }
}
