//! Page models for the shop, cart and wishlist.
//!
//! Each page is assembled from the catalog, the wishlist and the request's
//! [`ShopperContext`]. Every reader is asked at most once per page; the cart
//! always comes from the context.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use emporium_core::{
    AvailabilityStatus, CartLine, Category, CategoryId, Product, ProductId, evaluate,
};

use crate::db::{CatalogReader, RepositoryError, WishlistReader};
use crate::middleware::ShopperContext;
use crate::services::storage::{ImageUrl, StorageService};
use crate::state::AppState;

/// Shown when a search finds nothing.
pub const SEARCH_NOT_FOUND: &str = "Your search did not match any products";

/// Errors while assembling a page.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("sign in required")]
    SignInRequired,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A product in a listing, with its primary image.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: String,
    pub in_stock: bool,
    pub image: ImageUrl,
}

/// `GET /shop`
#[derive(Debug, Serialize)]
pub struct ShopPage {
    pub categories: Vec<Category>,
    pub products: Vec<ProductSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u64>,
}

/// `GET /shop/category/{id}`
#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub categories: Vec<Category>,
    pub products: Vec<ProductSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u64>,
}

/// `POST /shop/search`
///
/// Either `products` or `not_found` is present, never both.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub keyword: String,
    pub within: i64,
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_found: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u64>,
}

/// Product fields shown on the detail page.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: u32,
}

/// `GET /shop/viewproduct/{id}`
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: ProductDetail,
    /// Primary image first, then the additional images in order.
    pub images: Vec<ImageUrl>,
    pub quantity_in_cart: u32,
    pub availability: AvailabilityStatus,
    pub stock_label: &'static str,
    pub wishlisted: bool,
    pub cart_count: u64,
}

/// One cart line with its product.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    /// Empty when the product no longer exists.
    pub name: String,
    pub price: Option<String>,
    pub quantity: u32,
    pub image: ImageUrl,
}

/// `GET /cart`
#[derive(Debug, Serialize)]
pub struct CartPage {
    pub lines: Vec<CartLineView>,
    pub unit_count: u64,
}

/// `GET /wishlist`
#[derive(Debug, Serialize)]
pub struct WishlistPage {
    pub products: Vec<ProductSummary>,
    pub cart_count: u64,
}

/// Builds the shop's page models.
pub struct ShopService<'a> {
    catalog: &'a dyn CatalogReader,
    wishlists: &'a dyn WishlistReader,
    storage: &'a StorageService,
}

impl<'a> ShopService<'a> {
    /// A service over the state's readers and image storage.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            catalog: state.catalog(),
            wishlists: state.wishlists(),
            storage: state.storage(),
        }
    }

    /// Every category and every product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if a lookup fails.
    #[instrument(skip_all)]
    pub async fn shop_page(&self, shopper: &ShopperContext) -> Result<ShopPage, ShopError> {
        let categories = self.catalog.categories().await?;
        let products = self.catalog.products().await?;

        Ok(ShopPage {
            categories,
            products: self.summaries(&products).await,
            cart_count: cart_count(shopper),
        })
    }

    /// The products of one category.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::CategoryNotFound` for an unknown category.
    #[instrument(skip(self, shopper))]
    pub async fn category_page(
        &self,
        category_id: CategoryId,
        shopper: &ShopperContext,
    ) -> Result<CategoryPage, ShopError> {
        let category = self
            .catalog
            .category(category_id)
            .await?
            .ok_or(ShopError::CategoryNotFound(category_id))?;
        let categories = self.catalog.categories().await?;
        let products = self.catalog.products_in_category(category_id).await?;

        Ok(CategoryPage {
            category,
            categories,
            products: self.summaries(&products).await,
            cart_count: cart_count(shopper),
        })
    }

    /// Products whose name contains `keyword`, ignoring case. The keyword is
    /// used as typed, surrounding spaces included.
    ///
    /// `within == 0` searches every product; any other value searches that
    /// category. An unknown category simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if a lookup fails.
    #[instrument(skip(self, shopper))]
    pub async fn search(
        &self,
        keyword: &str,
        within: i64,
        shopper: &ShopperContext,
    ) -> Result<SearchPage, ShopError> {
        let candidates = if within == 0 {
            self.catalog.products().await?
        } else {
            self.catalog
                .products_in_category(CategoryId::new(within))
                .await?
        };
        let matches: Vec<Product> = candidates
            .into_iter()
            .filter(|p| p.name_matches(keyword))
            .collect();
        let categories = self.catalog.categories().await?;

        let (products, not_found) = if matches.is_empty() {
            (None, Some(SEARCH_NOT_FOUND))
        } else {
            (Some(self.summaries(&matches).await), None)
        };

        Ok(SearchPage {
            keyword: keyword.to_string(),
            within,
            categories,
            products,
            not_found,
            cart_count: cart_count(shopper),
        })
    }

    /// The product detail page with availability for this shopper.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ProductNotFound` for an unknown product.
    #[instrument(skip(self, shopper))]
    pub async fn product_page(
        &self,
        product_id: ProductId,
        shopper: &ShopperContext,
    ) -> Result<ProductPage, ShopError> {
        let product = self
            .catalog
            .product(product_id)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))?;

        let wishlisted = match shopper.user() {
            Some(user) => self.wishlists.is_wishlisted(user.id, product_id).await?,
            None => false,
        };

        let cart_line = shopper.cart_line(product_id);
        let availability = evaluate(&product, cart_line, shopper.cart_lines(), wishlisted);
        let images = self.storage.product_urls(&product).await;

        Ok(ProductPage {
            quantity_in_cart: cart_line.map_or(0, |line| line.quantity),
            stock_label: availability.state.label(),
            wishlisted: availability.wishlisted,
            cart_count: availability.cart_unit_count,
            availability,
            images,
            product: ProductDetail {
                id: product.id,
                category_id: product.category_id,
                price: product.price.display(),
                quantity: product.quantity,
                name: product.name,
                description: product.description,
            },
        })
    }

    /// The signed-in shopper's cart, in line order.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::SignInRequired` for guests.
    #[instrument(skip_all)]
    pub async fn cart_page(&self, shopper: &ShopperContext) -> Result<CartPage, ShopError> {
        if shopper.user().is_none() {
            return Err(ShopError::SignInRequired);
        }
        let lines = shopper.cart_lines();
        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let products = self.catalog.products_by_ids(&ids).await?;
        let images = self.storage.cart_urls(lines, &products).await;

        let views = lines
            .iter()
            .zip(images)
            .map(|(line, image)| cart_line_view(line, &products, image))
            .collect();

        Ok(CartPage {
            lines: views,
            unit_count: shopper.cart_unit_count(),
        })
    }

    /// The signed-in shopper's wishlist, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::SignInRequired` for guests.
    #[instrument(skip_all)]
    pub async fn wishlist_page(&self, shopper: &ShopperContext) -> Result<WishlistPage, ShopError> {
        let user = shopper.user().ok_or(ShopError::SignInRequired)?;
        let ids = self.wishlists.wishlist_product_ids(user.id).await?;
        let found = self.catalog.products_by_ids(&ids).await?;

        let ordered: Vec<Product> = ids
            .iter()
            .filter_map(|id| found.iter().find(|p| p.id == *id).cloned())
            .collect();
        let images = self.storage.wishlist_urls(&ordered).await;

        Ok(WishlistPage {
            products: ordered
                .iter()
                .zip(images)
                .map(|(p, image)| summary(p, image))
                .collect(),
            cart_count: shopper.cart_unit_count(),
        })
    }

    async fn summaries(&self, products: &[Product]) -> Vec<ProductSummary> {
        let images = self.storage.product_list_urls(products).await;
        products
            .iter()
            .zip(images)
            .map(|(p, image)| summary(p, image))
            .collect()
    }
}

fn cart_count(shopper: &ShopperContext) -> Option<u64> {
    shopper.user().map(|_| shopper.cart_unit_count())
}

fn summary(product: &Product, image: ImageUrl) -> ProductSummary {
    ProductSummary {
        id: product.id,
        category_id: product.category_id,
        name: product.name.clone(),
        price: product.price.display(),
        in_stock: product.is_in_stock(),
        image,
    }
}

fn cart_line_view(line: &CartLine, products: &[Product], image: ImageUrl) -> CartLineView {
    let product = products.iter().find(|p| p.id == line.product_id);
    CartLineView {
        product_id: line.product_id,
        name: product.map(|p| p.name.clone()).unwrap_or_default(),
        price: product.map(|p| p.price.display()),
        quantity: line.quantity,
        image,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use emporium_core::{Role, StockState, UserId};

    use super::*;
    use crate::db::memory::MemoryShop;
    use crate::services::storage::memory::MemoryObjectStore;
    use crate::state::test_support::memory_state;

    struct Fixture {
        shop: Arc<MemoryShop>,
        state: AppState,
    }

    fn fixture() -> Fixture {
        let shop = Arc::new(MemoryShop::new());
        shop.add_category(1, "Soap");
        shop.add_category(2, "Candles");
        shop.add_product(1, 1, "Lavender Bar", 5);
        shop.add_product(2, 1, "Oat Bar", 0);
        shop.add_product(3, 2, "Cedar Candle", 3);
        let store = Arc::new(MemoryObjectStore::new());
        let state = memory_state(&shop, &store);
        Fixture { shop, state }
    }

    fn shopper(fx: &Fixture, lines: Vec<CartLine>) -> ShopperContext {
        let user = fx
            .shop
            .add_user(10, "shopper@example.org", Role::Customer, true, "x");
        ShopperContext::signed_in(user, lines)
    }

    #[tokio::test]
    async fn test_product_page_cart_equals_stock() {
        let fx = fixture();
        let line = CartLine::new(ProductId::new(1), 5);
        let shopper = shopper(&fx, vec![line, CartLine::new(ProductId::new(3), 2)]);

        let page = ShopService::new(&fx.state)
            .product_page(ProductId::new(1), &shopper)
            .await
            .unwrap();

        assert_eq!(page.availability.state, StockState::CartEqualsStock);
        assert_eq!(
            page.stock_label,
            "QUANTITY IN CART ALREADY EQUALS STOCK IN INVENTORY"
        );
        assert_eq!(page.quantity_in_cart, 5);
        assert_eq!(page.cart_count, 7);
        assert_eq!(page.images[0].key(), "1_primary.png");
    }

    #[tokio::test]
    async fn test_product_page_reports_wishlist() {
        let fx = fixture();
        let shopper = shopper(&fx, Vec::new());
        fx.shop.wishlist(UserId::new(10), ProductId::new(3));

        let page = ShopService::new(&fx.state)
            .product_page(ProductId::new(3), &shopper)
            .await
            .unwrap();

        assert_eq!(page.availability.state, StockState::InStock);
        assert!(page.wishlisted);
        assert_eq!(page.quantity_in_cart, 0);
        assert_eq!(page.cart_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let fx = fixture();
        let result = ShopService::new(&fx.state)
            .product_page(ProductId::new(99), &ShopperContext::guest())
            .await;
        assert!(matches!(result, Err(ShopError::ProductNotFound(id)) if id == ProductId::new(99)));
    }

    #[tokio::test]
    async fn test_search_within_category_is_case_insensitive() {
        let fx = fixture();
        let service = ShopService::new(&fx.state);

        let page = service
            .search("BAR", 1, &ShopperContext::guest())
            .await
            .unwrap();
        let names: Vec<_> = page
            .products
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Lavender Bar", "Oat Bar"]);
        assert!(page.not_found.is_none());
        assert!(page.cart_count.is_none());
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let fx = fixture();
        fx.shop.add_product(4, 1, "Soapbar", 2);

        let page = ShopService::new(&fx.state)
            .search(" bar", 0, &ShopperContext::guest())
            .await
            .unwrap();
        let names: Vec<_> = page
            .products
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Lavender Bar", "Oat Bar"]);
        assert_eq!(page.keyword, " bar");
    }

    #[tokio::test]
    async fn test_search_without_matches_reports_not_found() {
        let fx = fixture();
        let page = ShopService::new(&fx.state)
            .search("candle", 1, &ShopperContext::guest())
            .await
            .unwrap();

        assert!(page.products.is_none());
        assert_eq!(page.not_found, Some(SEARCH_NOT_FOUND));

        let everywhere = ShopService::new(&fx.state)
            .search("candle", 0, &ShopperContext::guest())
            .await
            .unwrap();
        assert_eq!(everywhere.products.map(|p| p.len()), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let fx = fixture();
        let result = ShopService::new(&fx.state)
            .category_page(CategoryId::new(42), &ShopperContext::guest())
            .await;
        assert!(matches!(result, Err(ShopError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_cart_page_keeps_line_order_and_missing_products() {
        let fx = fixture();
        let shopper = shopper(
            &fx,
            vec![
                CartLine::new(ProductId::new(3), 1),
                CartLine::new(ProductId::new(1), 2),
                CartLine::new(ProductId::new(77), 1),
            ],
        );

        let page = ShopService::new(&fx.state)
            .cart_page(&shopper)
            .await
            .unwrap();

        let names: Vec<_> = page.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Cedar Candle", "Lavender Bar", ""]);
        assert!(matches!(page.lines[2].image, ImageUrl::Failed { .. }));
        assert_eq!(page.unit_count, 4);
    }

    #[tokio::test]
    async fn test_wishlist_page_oldest_first() {
        let fx = fixture();
        let shopper = shopper(&fx, Vec::new());
        fx.shop.wishlist(UserId::new(10), ProductId::new(3));
        fx.shop.wishlist(UserId::new(10), ProductId::new(1));

        let page = ShopService::new(&fx.state)
            .wishlist_page(&shopper)
            .await
            .unwrap();
        let ids: Vec<_> = page.products.iter().map(|p| p.id).collect();
        assert_eq!(ids, [ProductId::new(3), ProductId::new(1)]);
    }

    #[tokio::test]
    async fn test_guest_has_no_cart_or_wishlist() {
        let fx = fixture();
        let service = ShopService::new(&fx.state);
        let guest = ShopperContext::guest();

        assert!(matches!(
            service.cart_page(&guest).await,
            Err(ShopError::SignInRequired)
        ));
        assert!(matches!(
            service.wishlist_page(&guest).await,
            Err(ShopError::SignInRequired)
        ));
        assert!(service.shop_page(&guest).await.unwrap().cart_count.is_none());
    }
}
