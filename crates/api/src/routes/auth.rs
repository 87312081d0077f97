//! Token exchange handler.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};

use clementine_core::Username;

use crate::error::Result;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Token request form data (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Exchange username and password for a bearer token.
///
/// Any failure to match an account - unknown username, unparseable
/// username, wrong password - is the same 401; the endpoint never reveals
/// which part was wrong.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>> {
    let Ok(username) = Username::parse(&form.username) else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let auth = AuthService::new(state.pool());
    let access_token = auth
        .login_for_token(state.tokens(), &username, &form.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
