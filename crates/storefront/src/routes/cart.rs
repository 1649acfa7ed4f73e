//! Cart and wishlist pages.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::ShopperContext;
use crate::services::shop::{CartPage, ShopService, WishlistPage};
use crate::state::AppState;

/// The shopper's cart.
pub async fn show(State(state): State<AppState>, shopper: ShopperContext) -> Result<Json<CartPage>> {
    Ok(Json(ShopService::new(&state).cart_page(&shopper).await?))
}

/// The shopper's wishlist.
pub async fn wishlist(
    State(state): State<AppState>,
    shopper: ShopperContext,
) -> Result<Json<WishlistPage>> {
    Ok(Json(ShopService::new(&state).wishlist_page(&shopper).await?))
}
