//! Session identity and the per-request shopper context.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use emporium_core::{CartLine, ProductId, Role, cart_line_for, cart_unit_count};

use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// The signed-in user and their cart, resolved once per request.
///
/// Guests get an empty context. A session whose account has since been
/// disabled or deleted is rejected with a redirect to `/logout`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(shopper: ShopperContext) -> impl IntoResponse {
///     format!("{} items in cart", shopper.cart_unit_count())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShopperContext {
    user: Option<User>,
    cart_lines: Vec<CartLine>,
}

impl ShopperContext {
    /// A context for a guest: no account, no cart.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            user: None,
            cart_lines: Vec::new(),
        }
    }

    /// A context for a signed-in user.
    #[must_use]
    pub const fn signed_in(user: User, cart_lines: Vec<CartLine>) -> Self {
        Self {
            user: Some(user),
            cart_lines,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The signed-in user's role, `None` for guests.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Every line of the user's cart.
    #[must_use]
    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart_lines
    }

    /// The cart line for one product, if the cart holds it.
    #[must_use]
    pub fn cart_line(&self, product_id: ProductId) -> Option<&CartLine> {
        cart_line_for(&self.cart_lines, product_id)
    }

    /// Units across the whole cart.
    #[must_use]
    pub fn cart_unit_count(&self) -> u64 {
        cart_unit_count(&self.cart_lines)
    }
}

/// Rejection when the shopper context cannot be built.
#[derive(Debug)]
pub enum ShopperRejection {
    /// The session names an account that is disabled or gone.
    SignedOut,
    /// A lookup failed.
    Failed(AppError),
}

impl IntoResponse for ShopperRejection {
    fn into_response(self) -> Response {
        match self {
            Self::SignedOut => Redirect::to("/logout").into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for ShopperContext {
    type Rejection = ShopperRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<Self>() {
            return Ok(resolved.clone());
        }

        let Some(current) = current_user(parts).await else {
            return Ok(Self::guest());
        };

        let user = state
            .users()
            .user(current.id)
            .await
            .map_err(|e| ShopperRejection::Failed(e.into()))?;

        let Some(user) = user.filter(|u| u.enabled) else {
            warn!(user_id = %current.id, "Session for disabled or missing account");
            return Err(ShopperRejection::SignedOut);
        };

        let cart_lines = state
            .carts()
            .cart_lines(user.id)
            .await
            .map_err(|e| ShopperRejection::Failed(e.into()))?;

        let context = Self::signed_in(user, cart_lines);
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

/// The session identity, if the request carries one.
async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the signed-in identity, issuing a fresh session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop everything in the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use emporium_core::{Email, UserId};

    use super::*;

    fn customer() -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("shopper@example.org").unwrap(),
            role: Role::Customer,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_guest_context_is_empty() {
        let guest = ShopperContext::guest();
        assert!(guest.user().is_none());
        assert_eq!(guest.role(), None);
        assert_eq!(guest.cart_unit_count(), 0);
    }

    #[test]
    fn test_cart_line_answered_from_context() {
        let lines = vec![
            CartLine::new(ProductId::new(1), 2),
            CartLine::new(ProductId::new(4), 3),
        ];
        let shopper = ShopperContext::signed_in(customer(), lines);

        assert_eq!(shopper.cart_line(ProductId::new(4)).map(|l| l.quantity), Some(3));
        assert!(shopper.cart_line(ProductId::new(2)).is_none());
        assert_eq!(shopper.cart_unit_count(), 5);
        assert_eq!(shopper.role(), Some(Role::Customer));
    }
}
