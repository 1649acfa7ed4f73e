//! Path-based access control.
//!
//! Every request path maps to one [`AccessRule`]; [`AccessRule::permits`] is
//! the single place a role is checked against a rule.
//!
//! | Paths | Rule |
//! |---|---|
//! | `/resources/**`, `/static/**`, `/images/**`, `/productImages/**`, `/css/**`, `/js/**`, `/mobi/**` | public |
//! | `/`, `/home`, `/shop`, `/register`, `/verify-account`, `/resend-otp`, `/createTransaction/**` | public |
//! | `/login`, `/logout`, `/access-denied`, `/health`, `/health/ready` | public |
//! | `/admin/**` | admin |
//! | everything else | authenticated |

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use emporium_core::Role;

use super::ShopperContext;
use crate::state::AppState;

/// Path trees open to everyone.
const PUBLIC_TREES: &[&str] = &[
    "/resources",
    "/static",
    "/images",
    "/productImages",
    "/css",
    "/js",
    "/mobi",
    "/createTransaction",
];

/// Exact paths open to everyone.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/home",
    "/shop",
    "/register",
    "/verify-account",
    "/resend-otp",
    "/login",
    "/logout",
    "/access-denied",
    "/health",
    "/health/ready",
];

const ADMIN_TREE: &str = "/admin";

/// Who may request a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Anyone, signed in or not.
    Public,
    /// Any signed-in account.
    Authenticated,
    /// Signed-in admins only.
    Admin,
}

impl AccessRule {
    /// Whether a requester with `role` (`None` for guests) passes this rule.
    #[must_use]
    pub const fn permits(self, role: Option<Role>) -> bool {
        match (self, role) {
            (Self::Public, _) | (Self::Authenticated, Some(_)) => true,
            (Self::Admin, Some(role)) => role.is_admin(),
            (Self::Authenticated | Self::Admin, None) => false,
        }
    }
}

/// `path` is `tree` itself or lies below it.
fn in_tree(path: &str, tree: &str) -> bool {
    path.strip_prefix(tree)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The rule that applies to a request path.
#[must_use]
pub fn classify(path: &str) -> AccessRule {
    if in_tree(path, ADMIN_TREE) {
        return AccessRule::Admin;
    }
    if PUBLIC_PATHS.contains(&path) || PUBLIC_TREES.iter().any(|tree| in_tree(path, tree)) {
        return AccessRule::Public;
    }
    AccessRule::Authenticated
}

/// Enforce [`classify`] on every request.
///
/// Non-public paths resolve the [`ShopperContext`] first, so the role and the
/// enabled flag come from the account as it is now, not from the session.
/// Disabled or deleted accounts are sent to `/logout`, guests to `/login`,
/// and signed-in accounts lacking the role to `/access-denied`. Must run
/// inside the session layer.
pub async fn access_control_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let rule = classify(request.uri().path());
    if rule == AccessRule::Public {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let shopper = match ShopperContext::from_request_parts(&mut parts, &state).await {
        Ok(shopper) => shopper,
        Err(rejection) => return rejection.into_response(),
    };
    let role = shopper.role();

    if rule.permits(role) {
        return next.run(Request::from_parts(parts, body)).await;
    }

    debug!(path = %parts.uri.path(), ?rule, ?role, "Access denied");
    match role {
        None => Redirect::to("/login").into_response(),
        Some(_) => Redirect::to("/access-denied").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_public_paths() {
        for path in [
            "/",
            "/home",
            "/shop",
            "/login",
            "/logout",
            "/access-denied",
            "/health",
            "/health/ready",
            "/register",
            "/images/a.png",
            "/productImages/x/y.jpg",
            "/css",
            "/createTransaction/42",
        ] {
            assert_eq!(classify(path), AccessRule::Public, "{path}");
        }
    }

    #[test]
    fn test_classify_admin_tree() {
        assert_eq!(classify("/admin"), AccessRule::Admin);
        assert_eq!(classify("/admin/products/1/images"), AccessRule::Admin);
        assert_eq!(classify("/administrator"), AccessRule::Authenticated);
    }

    #[test]
    fn test_classify_everything_else_needs_sign_in() {
        for path in [
            "/cart",
            "/wishlist",
            "/shop/viewproduct/1",
            "/shop/category/2",
            "/shop/search",
            "/cssx",
            "/imagesfoo/a.png",
        ] {
            assert_eq!(classify(path), AccessRule::Authenticated, "{path}");
        }
    }

    #[test]
    fn test_permits_matrix() {
        let guest = None;
        let customer = Some(Role::Customer);
        let admin = Some(Role::Admin);

        assert!(AccessRule::Public.permits(guest));
        assert!(!AccessRule::Authenticated.permits(guest));
        assert!(AccessRule::Authenticated.permits(customer));
        assert!(AccessRule::Authenticated.permits(admin));
        assert!(!AccessRule::Admin.permits(guest));
        assert!(!AccessRule::Admin.permits(customer));
        assert!(AccessRule::Admin.permits(admin));
    }
}
