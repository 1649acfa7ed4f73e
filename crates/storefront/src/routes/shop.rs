//! Catalog browsing: listings, search and the product page.

use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use emporium_core::{CategoryId, ProductId};

use crate::error::Result;
use crate::middleware::ShopperContext;
use crate::services::shop::{CategoryPage, ProductPage, SearchPage, ShopPage, ShopService};
use crate::state::AppState;

/// Search form data.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub keyword: String,
    /// Category to search, `0` for every category.
    #[serde(default)]
    pub within: i64,
}

/// Every category and product.
pub async fn index(State(state): State<AppState>, shopper: ShopperContext) -> Result<Json<ShopPage>> {
    Ok(Json(ShopService::new(&state).shop_page(&shopper).await?))
}

/// Products of one category.
pub async fn category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    shopper: ShopperContext,
) -> Result<Json<CategoryPage>> {
    let page = ShopService::new(&state)
        .category_page(CategoryId::new(id), &shopper)
        .await?;
    Ok(Json(page))
}

/// Search product names.
pub async fn search(
    State(state): State<AppState>,
    shopper: ShopperContext,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchPage>> {
    let page = ShopService::new(&state)
        .search(&form.keyword, form.within, &shopper)
        .await?;
    Ok(Json(page))
}

/// The product page with availability for the shopper.
pub async fn view_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    shopper: ShopperContext,
) -> Result<Json<ProductPage>> {
    let page = ShopService::new(&state)
        .product_page(ProductId::new(id), &shopper)
        .await?;
    Ok(Json(page))
}
