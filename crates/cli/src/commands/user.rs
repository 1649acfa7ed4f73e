//! Account management commands.

use thiserror::Error;

use emporium_core::{Email, EmailError, Role};
use emporium_storefront::db::RepositoryError;
use emporium_storefront::db::users::UserRepository;
use emporium_storefront::services::auth::{AuthError, hash_password, validate_password};

use super::{ConnectError, connect};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: customer, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Weak password or hashing failure.
    #[error(transparent)]
    Password(#[from] AuthError),

    /// No account with that email.
    #[error("No account with email: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Create an account with an Argon2 password hash.
///
/// Input is validated before connecting to the database.
pub async fn create(email: &str, password: &str, role: &str) -> Result<(), UserError> {
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let users = UserRepository::new(connect().await?);
    let user = users
        .create(&email, &password_hash, role)
        .await
        .map_err(UserError::Repository)?;

    tracing::info!(id = %user.id, email = %user.email, %role, "Account created");
    Ok(())
}

/// Enable or disable an account by email.
pub async fn set_enabled(email: &str, enabled: bool) -> Result<(), UserError> {
    let email = Email::parse(email)?;

    let users = UserRepository::new(connect().await?);
    users
        .set_enabled(&email, enabled)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserError::NotFound(email.as_str().to_owned()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(email = %email, enabled, "Account updated");
    Ok(())
}
