//! Read seams between handlers and storage.
//!
//! Each trait is queried at most once per request for a given entity. The
//! `PostgreSQL` repositories implement them in production; tests use the
//! in-memory versions in [`super::memory`].

use async_trait::async_trait;

use emporium_core::{
    CartLine, Category, CategoryId, Email, Product, ProductId, ProductImage, ProductImageId,
    UserId,
};

use super::RepositoryError;
use crate::models::user::User;

/// Catalog lookups: products and categories.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// A product with its additional images, if it exists.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// The products with the given IDs, in ID order. Unknown IDs are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Every product, in ID order.
    async fn products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Products of one category, in ID order.
    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// A category, if it exists.
    async fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// Every category, by name.
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError>;
}

/// Catalog changes made from the admin area.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Append an additional image after the product's existing ones.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn add_product_image(
        &self,
        product_id: ProductId,
        key: &str,
    ) -> Result<ProductImage, RepositoryError>;

    /// Remove an additional image, returning it if it belonged to the product.
    async fn remove_product_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<Option<ProductImage>, RepositoryError>;
}

/// Cart lookups.
#[async_trait]
pub trait CartReader: Send + Sync {
    /// Every line of a user's cart, in product ID order.
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError>;
}

/// Wishlist lookups.
#[async_trait]
pub trait WishlistReader: Send + Sync {
    /// Whether the user has wishlisted the product.
    async fn is_wishlisted(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError>;

    /// Products on the user's wishlist, oldest first.
    async fn wishlist_product_ids(&self, user_id: UserId)
    -> Result<Vec<ProductId>, RepositoryError>;
}

/// Account lookups.
#[async_trait]
pub trait UserReader: Send + Sync {
    /// A user by ID.
    async fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// A user and their password hash, by email.
    async fn user_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}
