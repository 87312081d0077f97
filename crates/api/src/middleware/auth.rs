//! Authentication extractors.
//!
//! Provides extractors for requiring an authenticated principal in route
//! handlers. Both run the full access-gate chain on every request:
//! bearer token -> verify -> resolve user -> active check (-> role
//! check). Handlers for owner-scoped resources additionally call
//! `require_ownership` themselves.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use clementine_core::Role;

use crate::error::AppError;
use crate::services::gate::{self, AccessGate, Principal};
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header, if present.
#[must_use]
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extractor that requires an authenticated, active user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(principal): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.username)
/// }
/// ```
pub struct RequireUser(pub Principal);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let gate = AccessGate::new(state.pool(), state.tokens());
        let principal = gate.authenticate(bearer_token(parts)).await?;
        let principal = gate::require_active(principal)?;

        Ok(Self(principal))
    }
}

/// Extractor that requires an authenticated, active admin.
///
/// Admins pass everything `RequireUser` checks plus the role gate. Note
/// that cart routes never use this: cart access is ownership-gated, and
/// roles do not bypass ownership.
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(principal) = RequireUser::from_request_parts(parts, state).await?;
        let principal = gate::require_role(principal, Role::Admin)?;

        Ok(Self(principal))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users/me");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_present() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }
}
