//! Admin account bootstrap.
//!
//! The HTTP surface only registers regular users; the first admin (and
//! any further ones) are created here, against the same credential store
//! and with the same hashing path as the API.

use clementine_api::db;
use clementine_api::services::auth::{AuthService, MIN_PASSWORD_LENGTH};
use clementine_core::{Email, Role, Username};

use super::{CommandError, database_url};

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the inputs fail validation, the connection fails,
/// or the username/email is already taken.
pub async fn create(username: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let username = Username::parse(username)
        .map_err(|e| CommandError::InvalidInput(format!("username: {e}")))?;
    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CommandError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let url = database_url()?;
    let pool = db::create_pool(&url)
        .await
        .map_err(CommandError::Database)?;

    let auth = AuthService::new(&pool);
    let user = auth
        .register_with_role(&username, &email, password, Role::Admin)
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    tracing::info!(id = %user.id, username = %user.username, "Admin account created");
    Ok(())
}
