//! Account registration and login.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::SqlitePool;
use thiserror::Error;

use khaja_core::{Phone, PhoneError, Role, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::models::user::User;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The phone number is not valid.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// The password does not meet the minimum length.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// An account already exists for this phone number.
    #[error("an account with this phone number already exists")]
    UserAlreadyExists,

    /// Phone/password pair did not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing error")]
    Hashing,

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Registration and login on top of the user repository.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` or `AuthError::PasswordTooShort` for
    /// bad input, `AuthError::UserAlreadyExists` on a duplicate phone, and
    /// `AuthError::Repository` for database failures.
    pub async fn register(
        &self,
        name: &str,
        phone: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        let phone = Phone::parse(phone)?;
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }

        let hash = hash_password(password)?;

        match self.users.create(name.trim(), &phone, &hash, Role::User).await {
            Ok(id) => Ok(id),
            Err(RepositoryError::Conflict(_)) => Err(AuthError::UserAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and return the matching user.
    ///
    /// Unknown phone and wrong password both map to `InvalidCredentials` so
    /// the response does not reveal which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the pair does not match,
    /// `AuthError::Repository` for database failures.
    pub async fn login(&self, phone: &str, password: &str) -> Result<User, AuthError> {
        let phone = Phone::parse(phone).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, hash)) = self.users.get_with_password_hash(&phone).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let parsed = PasswordHash::new(&hash).map_err(|_| AuthError::Hashing)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(user)
    }
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::Hashing)
}
