//! Password hashing and password policy.

use std::collections::HashMap;
use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords whose similarity to the username reaches this ratio are rejected.
const MAX_SIMILARITY: f64 = 0.7;

/// Frequently used passwords, compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "00000000",
    "11111111",
    "12345678",
    "123456789",
    "1234567890",
    "1q2w3e4r",
    "abc12345",
    "abcd1234",
    "admin123",
    "asdfghjkl",
    "baseball",
    "changeme",
    "dragon12",
    "football",
    "iloveyou",
    "letmein1",
    "master12",
    "monkey123",
    "p@ssw0rd",
    "passw0rd",
    "password",
    "password1",
    "password123",
    "princess",
    "qwerty12",
    "qwerty123",
    "qwertyuiop",
    "starwars",
    "sunshine",
    "superman",
    "trustno1",
    "welcome1",
    "zaq12wsx",
];

/// Check a password against the policy.
///
/// Every failed rule contributes one message.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` listing the failed rules.
pub fn validate_password(password: &str, username: &str) -> Result<(), AuthError> {
    let mut problems = Vec::new();

    if is_too_similar(password, username) {
        problems.push("The password is too similar to the username.".to_owned());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    if COMMON_PASSWORDS.contains(&password.trim().to_lowercase().as_str()) {
        problems.push("This password is too common.".to_owned());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(problems))
    }
}

/// Compare the password to the username and each of its word-separated parts.
fn is_too_similar(password: &str, username: &str) -> bool {
    let password = password.to_lowercase();
    let username = username.to_lowercase();

    username
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .chain(std::iter::once(username.as_str()))
        .filter(|part| !exceeds_length_ratio(&password, part))
        .any(|part| quick_ratio(&password, part) >= MAX_SIMILARITY)
}

/// A much longer password can't be meaningfully similar to a short value.
fn exceeds_length_ratio(password: &str, value: &str) -> bool {
    let pwd_len = password.chars().count();
    let value_len = value.chars().count();
    #[allow(clippy::cast_precision_loss)] // lengths are tiny
    let length_bound = MAX_SIMILARITY / 2.0 * pwd_len as f64;
    #[allow(clippy::cast_precision_loss)]
    let value_len_f = value_len as f64;
    pwd_len >= 10 * value_len && value_len_f < length_bound
}

/// Upper bound on sequence similarity: shared characters as a multiset.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_insert(0) += 1;
    }

    let mut matches = 0_usize;
    for c in a.chars() {
        if let Some(count) = available.get_mut(&c)
            && *count > 0
        {
            *count -= 1;
            matches += 1;
        }
    }

    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = 2.0 * matches as f64 / total as f64;
    ratio
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Hash verified against when a login names an unknown user.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("k2#Vq9!unknown-user-login").ok());

/// Reject a login for a username with no account.
///
/// Runs one full verification first so the rejection takes as long as a
/// wrong password for an existing account.
#[must_use]
pub fn reject_unknown_user(password: &str) -> AuthError {
    if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn problems(password: &str, username: &str) -> Vec<String> {
        match validate_password(password, username) {
            Ok(()) => Vec::new(),
            Err(AuthError::WeakPassword(p)) => p,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_password("Str0ng-Passw0rd!", "testuser").is_ok());
    }

    #[test]
    fn test_short_password() {
        let p = problems("x9!kQ", "testuser");
        assert_eq!(p.len(), 1);
        assert!(p[0].contains("too short"));
    }

    #[test]
    fn test_numeric_password() {
        let p = problems("90817263", "testuser");
        assert!(p.iter().any(|m| m.contains("entirely numeric")));
    }

    #[test]
    fn test_common_password_is_case_insensitive() {
        let p = problems("PassWord", "testuser");
        assert!(p.iter().any(|m| m.contains("too common")));
    }

    #[test]
    fn test_password_similar_to_username() {
        let p = problems("testuser1", "testuser");
        assert!(p.iter().any(|m| m.contains("too similar")));

        let p = problems("jane.doe.42", "jane.doe");
        assert!(p.iter().any(|m| m.contains("too similar")));
    }

    #[test]
    fn test_multiple_failures_are_all_reported() {
        let p = problems("1234", "testuser");
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_quick_ratio() {
        assert!((quick_ratio("abcd", "abcd") - 1.0).abs() < f64::EPSILON);
        assert!((quick_ratio("ab", "cd") - 0.0).abs() < f64::EPSILON);
        assert!((quick_ratio("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Str0ng-Passw0rd!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Str0ng-Passw0rd!", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_user_rejection_runs_a_real_verification() {
        let hash = UNKNOWN_USER_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(matches!(
            reject_unknown_user("Str0ng-Passw0rd!"),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
