//! Session middleware configuration.
//!
//! Sessions are stored in `PostgreSQL` through tower-sessions. Tests swap in
//! any other [`SessionStore`] with the same cookie settings. The session cookie
//! is signed with a key derived from `STOREFRONT_SESSION_SECRET`.

use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "emporium_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Salt for deriving the signing key. Fixed so every instance derives the same key.
const SIGNING_KEY_SALT: &[u8] = b"emporium-session-signing-key";

/// The signing key could not be derived.
#[derive(Debug, Error)]
#[error("failed to derive session signing key: {0}")]
pub struct SessionKeyError(String);

/// Derive the 64-byte cookie signing key from the session secret.
///
/// # Errors
///
/// Returns `SessionKeyError` if Argon2 rejects the input.
pub fn signing_key(secret: &SecretString) -> Result<Key, SessionKeyError> {
    let mut bytes = [0_u8; 64];
    Argon2::default()
        .hash_password_into(
            secret.expose_secret().as_bytes(),
            SIGNING_KEY_SALT,
            &mut bytes,
        )
        .map_err(|e| SessionKeyError(e.to_string()))?;
    Ok(Key::from(&bytes))
}

/// Create the session layer with the `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by migration.
///
/// # Errors
///
/// Returns `SessionKeyError` if the signing key cannot be derived.
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, SessionKeyError> {
    session_layer_with_store(store, config)
}

/// Session layer over any store, with the storefront's cookie settings.
///
/// The cookie is only marked `Secure` when the storefront is served over HTTPS.
///
/// # Errors
///
/// Returns `SessionKeyError` if the signing key cannot be derived.
pub fn session_layer_with_store<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, SessionKeyError> {
    let key = signing_key(&config.session_secret)?;
    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_stable_per_secret() {
        let secret = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6v");
        let other = SecretString::from("zZ9!qW8@eR7#tY6$uI5%oP4^aS3&dF2*");

        let first = signing_key(&secret).unwrap();
        let second = signing_key(&secret).unwrap();
        assert_eq!(first.master(), second.master());
        assert_ne!(first.master(), signing_key(&other).unwrap().master());
    }
}
