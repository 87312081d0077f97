//! Authentication service.
//!
//! Registration and username/password login. Secrets are hashed with
//! Argon2id before storage; verification never touches business logic
//! elsewhere in the workspace.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use clementine_core::{Email, Role, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::token::TokenKeeper;

/// Minimum password length, enforced at the boundary before registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles registration and password login against the credential store.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// Inputs arrive pre-validated from the boundary; the password is
    /// hashed here, immediately before storage. New accounts get the
    /// `user` role and start active.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyRegistered` if the username or email is
    /// taken, `AuthError::PasswordHash` if hashing fails.
    pub async fn register(
        &self,
        username: &Username,
        email: &Email,
        password: &str,
    ) -> Result<User, AuthError> {
        self.register_with_role(username, email, password, Role::User)
            .await
    }

    /// Register an account with an explicit role.
    ///
    /// The HTTP surface only ever registers `user` accounts; admin
    /// bootstrap goes through the CLI, which calls this directly.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    pub async fn register_with_role(
        &self,
        username: &Username,
        email: &Email,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => AuthError::AlreadyRegistered(message),
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Authenticate with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown
    /// or the password does not verify; the two cases are
    /// indistinguishable to the caller.
    pub async fn login(&self, username: &Username, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Authenticate and issue a bearer token for the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on bad credentials and
    /// `AuthError::Token` if signing fails.
    pub async fn login_for_token(
        &self,
        tokens: &TokenKeeper,
        username: &Username,
        password: &str,
    ) -> Result<String, AuthError> {
        let user = self.login(username, password).await?;
        Ok(tokens.issue(&user.username)?)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(matches!(
            verify_password("incorrect horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }
}
