//! Home page route handler.

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::middleware::ShopperContext;

/// Home page model.
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u64>,
}

/// Display the home page. Admins go straight to their dashboard.
pub async fn home(shopper: ShopperContext) -> Response {
    match shopper.user() {
        Some(user) if user.role.is_admin() => Redirect::to("/admin").into_response(),
        Some(_) => Json(HomePage {
            signed_in: true,
            cart_count: Some(shopper.cart_unit_count()),
        })
        .into_response(),
        None => Json(HomePage {
            signed_in: false,
            cart_count: None,
        })
        .into_response(),
    }
}
