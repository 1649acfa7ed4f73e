//! Catalog domain types.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Price, ProductId, ProductImageId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// An additional product image, shown after the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Unique image ID.
    pub id: ProductImageId,
    /// Object key in blob storage.
    pub key: String,
    /// Sort position among the product's additional images.
    pub position: i32,
}

/// A product as listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Category the product belongs to.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units currently on hand.
    pub quantity: u32,
    /// Object key of the primary image.
    pub image_key: String,
    /// Additional images, ordered by position.
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Whether any stock is on hand.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Object keys of every image: the primary image first, then the
    /// additional images in order.
    pub fn image_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.image_key.as_str()).chain(self.images.iter().map(|i| i.key.as_str()))
    }

    /// Case-insensitive substring match of `keyword` against the product name.
    ///
    /// An empty keyword matches every product.
    #[must_use]
    pub fn name_matches(&self, keyword: &str) -> bool {
        self.name.to_lowercase().contains(&keyword.to_lowercase())
    }
}
