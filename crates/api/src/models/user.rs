//! User domain types.

use chrono::{DateTime, Utc};

use clementine_core::{Email, Role, UserId, Username};

/// A registered account (domain type).
///
/// The password hash is absent here; it lives only inside the credential
/// store and the login path. Everything downstream of the access gate
/// works with this hash-free shape.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name; also the bearer-token subject.
    pub username: Username,
    /// Unique, lowercase-normalized email address.
    pub email: Email,
    /// Inactive accounts authenticate but are refused by the gate.
    pub is_active: bool,
    /// Authorization role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
