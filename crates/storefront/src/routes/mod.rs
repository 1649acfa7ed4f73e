//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /, GET /home             - Home page (admins are sent to /admin)
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action (rate limited)
//! GET  /logout, POST /logout    - Logout action
//! GET  /access-denied           - Shown when the role does not fit
//!
//! # Shop
//! GET  /shop                    - Categories and products
//! GET  /shop/category/{id}      - Products of one category
//! POST /shop/search             - Search product names
//! GET  /shop/viewproduct/{id}   - Product page with availability
//!
//! # Shopper (requires auth)
//! GET  /cart                    - Cart page
//! GET  /wishlist                - Wishlist page
//!
//! # Admin (requires admin role)
//! GET    /admin                               - Dashboard
//! POST   /admin/products/{id}/images          - Upload an additional image
//! DELETE /admin/products/{id}/images/{image}  - Delete an additional image
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod shop;

use axum::{
    Router,
    extract::Request,
    handler::Handler,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{
    access_control_middleware, auth_rate_limiter, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login.layer(auth_rate_limiter())),
        )
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/access-denied", get(auth::access_denied))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/category/{id}", get(shop::category))
        .route("/search", post(shop::search))
        .route("/viewproduct/{id}", get(shop::view_product))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/products/{id}/images", post(admin::upload_image))
        .route(
            "/products/{id}/images/{image_id}",
            delete(admin::delete_image),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/home", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/shop", shop_routes())
        .route("/cart", get(cart::show))
        .route("/wishlist", get(cart::wishlist))
        .nest("/admin", admin_routes())
        .merge(auth_routes())
}

/// The full application: routes plus the middleware stack, minus Sentry.
///
/// Access control runs inside the session layer so it can read the signed-in
/// account.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_control_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
