//! Access gate: per-request authentication and authorization.
//!
//! The gate resolves a bearer token to a [`Principal`] and enforces the
//! three authorization checks (active account, role, ownership). It is
//! stateless across requests: every request re-verifies the token and
//! re-reads the credential store, and nothing is cached.
//!
//! Handlers get a principal through the extractors in
//! [`crate::middleware::auth`]; the `require_*` checks are also invoked
//! directly in handlers as a second guard where the route's resource has
//! an owner.

use sqlx::PgPool;
use thiserror::Error;

use clementine_core::{Email, Role, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::token::{TokenError, TokenKeeper};

/// The authenticated identity for the duration of one request.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The account's ID; compared against resource owners.
    pub id: UserId,
    /// The account's username (the token subject).
    pub username: Username,
    /// The account's email address.
    pub email: Email,
    /// Whether the account is active.
    pub is_active: bool,
    /// The account's role.
    pub role: Role,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            role: user.role,
        }
    }
}

/// Why a principal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The account's active flag is false.
    Inactive,
    /// The principal's role does not grant this operation.
    InsufficientRole,
    /// The principal does not own the resource.
    NotOwner,
}

impl ForbiddenReason {
    /// Client-facing description.
    #[must_use]
    pub const fn detail(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive user",
            Self::InsufficientRole => "Not enough permissions",
            Self::NotOwner => "Not authorized to access this resource",
        }
    }
}

/// Errors produced by the access gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// The token is missing, malformed, expired, or does not resolve to
    /// an existing user.
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// The principal is authenticated but not allowed.
    #[error("forbidden: {}", .0.detail())]
    Forbidden(ForbiddenReason),

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Resolves bearer tokens to principals against the credential store.
pub struct AccessGate<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenKeeper,
}

impl<'a> AccessGate<'a> {
    /// Create a gate over the shared pool and token keeper.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenKeeper) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Resolve a bearer token to the authenticated principal.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Unauthenticated` if the token is missing,
    /// malformed, expired, carries an invalid signature, or its subject
    /// does not resolve to an existing user.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, GateError> {
        let token = token.ok_or(GateError::Unauthenticated("missing bearer token"))?;

        let subject = self.tokens.verify(token).map_err(|e| {
            GateError::Unauthenticated(match e {
                TokenError::Expired => "token expired",
                TokenError::Malformed => "malformed token",
                TokenError::Invalid | TokenError::Signing(_) => "invalid token",
            })
        })?;

        // The subject is a username; anything else cannot resolve.
        let username = Username::parse(&subject)
            .map_err(|_| GateError::Unauthenticated("token subject is invalid"))?;

        let user = self
            .users
            .get_by_username(&username)
            .await?
            .ok_or(GateError::Unauthenticated("token subject no longer exists"))?;

        Ok(user.into())
    }
}

/// Refuse inactive accounts.
///
/// # Errors
///
/// Returns `GateError::Forbidden(Inactive)` if the account's active flag
/// is false.
pub fn require_active(principal: Principal) -> Result<Principal, GateError> {
    if !principal.is_active {
        return Err(GateError::Forbidden(ForbiddenReason::Inactive));
    }
    Ok(principal)
}

/// Refuse principals whose role does not match.
///
/// # Errors
///
/// Returns `GateError::Forbidden(InsufficientRole)` on mismatch.
pub fn require_role(principal: Principal, role: Role) -> Result<Principal, GateError> {
    if principal.role != role {
        return Err(GateError::Forbidden(ForbiddenReason::InsufficientRole));
    }
    Ok(principal)
}

/// Refuse principals that do not own the resource.
///
/// Ownership is absolute: no role bypasses this check.
///
/// # Errors
///
/// Returns `GateError::Forbidden(NotOwner)` unless the principal's ID
/// equals `resource_owner_id`.
pub fn require_ownership(principal: &Principal, resource_owner_id: UserId) -> Result<(), GateError> {
    if principal.id != resource_owner_id {
        return Err(GateError::Forbidden(ForbiddenReason::NotOwner));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn principal(role: Role, is_active: bool) -> Principal {
        Principal {
            id: UserId::generate(),
            username: Username::parse("alice").unwrap(),
            email: Email::parse("alice@example.com").unwrap(),
            is_active,
            role,
        }
    }

    #[test]
    fn active_principal_passes() {
        let p = principal(Role::User, true);
        assert!(require_active(p).is_ok());
    }

    #[test]
    fn inactive_principal_is_forbidden() {
        let p = principal(Role::User, false);
        assert!(matches!(
            require_active(p),
            Err(GateError::Forbidden(ForbiddenReason::Inactive))
        ));
    }

    #[test]
    fn matching_role_passes() {
        let p = principal(Role::Admin, true);
        assert!(require_role(p, Role::Admin).is_ok());
    }

    #[test]
    fn mismatched_role_is_forbidden() {
        let p = principal(Role::User, true);
        assert!(matches!(
            require_role(p, Role::Admin),
            Err(GateError::Forbidden(ForbiddenReason::InsufficientRole))
        ));
    }

    #[test]
    fn owner_passes_ownership_check() {
        let p = principal(Role::User, true);
        assert!(require_ownership(&p, p.id).is_ok());
    }

    #[test]
    fn admin_does_not_bypass_ownership() {
        let p = principal(Role::Admin, true);
        assert!(matches!(
            require_ownership(&p, UserId::generate()),
            Err(GateError::Forbidden(ForbiddenReason::NotOwner))
        ));
    }
}
