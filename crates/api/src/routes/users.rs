//! User route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, Role, UserId, Username};

use crate::db::users::{UserChanges, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::User;
use crate::services::auth::{AuthService, MIN_PASSWORD_LENGTH};
use crate::services::gate::{ForbiddenReason, GateError, Principal};
use crate::state::AppState;
use crate::validation::ValidationErrors;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Validate into domain values, collecting every field failure.
    fn validate(self) -> std::result::Result<(Username, Email, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = errors.check("username", Username::parse(&self.username));
        let email = errors.check("email", Email::parse(&self.email));
        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        match (username, email) {
            (Some(u), Some(e)) => errors.finish((u, e, self.password)),
            _ => Err(errors),
        }
    }
}

/// Partial update payload; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserUpdateRequest {
    fn validate(self) -> std::result::Result<UserChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut changes = UserChanges::default();

        if let Some(username) = self.username {
            changes.username = errors.check("username", Username::parse(&username));
        }
        if let Some(email) = self.email {
            changes.email = errors.check("email", Email::parse(&email));
        }
        if let Some(role) = self.role {
            changes.role = errors.check("role", role.parse::<Role>());
        }

        errors.finish(changes)
    }
}

/// Pagination parameters for the user listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Validate pagination bounds shared by the list endpoints.
pub(crate) fn validate_pagination(
    skip: Option<i64>,
    limit: Option<i64>,
) -> std::result::Result<(i64, i64), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let skip = skip.unwrap_or(0);
    if skip < 0 {
        errors.push("skip", "skip must be >= 0");
    }

    let limit = limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        errors.push("limit", "limit must be between 1 and 100");
    }

    errors.finish((skip, limit))
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub is_active: bool,
    pub role: Role,
}

impl From<User> for UserOut {
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

impl From<Principal> for UserOut {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username,
            email: principal.email,
            is_active: principal.is_active,
            role: principal.role,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /users` - register a new account. No authentication required.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserOut>)> {
    let (username, email, password) = payload.validate()?;

    let auth = AuthService::new(state.pool());
    let user = auth.register(&username, &email, &password).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /users/me` - the caller's own profile.
pub async fn me(RequireUser(principal): RequireUser) -> Json<UserOut> {
    Json(principal.into())
}

/// `GET /users/{id}` - fetch a profile; self or admin only.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserOut>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    if principal.id != user.id && !principal.role.is_admin() {
        return Err(GateError::Forbidden(ForbiddenReason::InsufficientRole).into());
    }

    Ok(Json(user.into()))
}

/// `GET /users` - paginated listing; admin only.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserOut>>> {
    let (skip, limit) = validate_pagination(params.skip, params.limit)?;

    let users = UserRepository::new(state.pool());
    let page = users.list(skip, limit).await?;

    Ok(Json(page.into_iter().map(Into::into).collect()))
}

/// `PUT /users/{id}` - partial update; self or admin.
///
/// Role changes are admin-only even on one's own account; anything else
/// would let a regular user grant themselves admin.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(user_id): Path<UserId>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<UserOut>> {
    if principal.id != user_id && !principal.role.is_admin() {
        return Err(GateError::Forbidden(ForbiddenReason::InsufficientRole).into());
    }

    let changes = payload.validate()?;
    if changes.role.is_some() && !principal.role.is_admin() {
        return Err(GateError::Forbidden(ForbiddenReason::InsufficientRole).into());
    }

    let users = UserRepository::new(state.pool());
    let user = users
        .update(user_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(user.into()))
}

/// `DELETE /users/{id}` - delete an account; admin only. Replies 204.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    let users = UserRepository::new(state.pool());
    let deleted = users.delete(user_id).await?;

    if !deleted {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}
