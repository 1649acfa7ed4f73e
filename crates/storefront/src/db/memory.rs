//! In-memory implementations of the reader traits for tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use emporium_core::{
    CartLine, Category, CategoryId, CurrencyCode, Email, Price, Product, ProductId, ProductImage,
    ProductImageId, Role, UserId,
};

use super::{CartReader, CatalogReader, CatalogWriter, RepositoryError, UserReader, WishlistReader};
use crate::models::user::User;

#[derive(Default)]
struct Data {
    categories: Vec<Category>,
    products: Vec<Product>,
    users: Vec<(User, String)>,
    carts: HashMap<UserId, Vec<CartLine>>,
    wishlists: HashMap<UserId, Vec<ProductId>>,
    next_image_id: i64,
}

/// A whole shop held in memory.
///
/// Counts user and cart reads so tests can check each is resolved once per
/// request.
#[derive(Default)]
pub struct MemoryShop {
    data: Mutex<Data>,
    user_reads: AtomicUsize,
    cart_reads: AtomicUsize,
}

impl MemoryShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, id: i64, name: &str) -> Category {
        let category = Category {
            id: CategoryId::new(id),
            name: name.to_string(),
        };
        self.data.lock().unwrap().categories.push(category.clone());
        category
    }

    pub fn add_product(&self, id: i64, category_id: i64, name: &str, quantity: u32) -> Product {
        let product = Product {
            id: ProductId::new(id),
            category_id: CategoryId::new(category_id),
            name: name.to_string(),
            description: format!("About {name}"),
            price: Price::from_cents(1250, CurrencyCode::USD).unwrap(),
            quantity,
            image_key: format!("{id}_primary.png"),
            images: Vec::new(),
        };
        self.data.lock().unwrap().products.push(product.clone());
        product
    }

    pub fn add_user(&self, id: i64, email: &str, role: Role, enabled: bool, hash: &str) -> User {
        let user = User {
            id: UserId::new(id),
            email: Email::parse(email).unwrap(),
            role,
            enabled,
            created_at: Utc::now(),
        };
        self.data
            .lock()
            .unwrap()
            .users
            .push((user.clone(), hash.to_string()));
        user
    }

    pub fn set_enabled(&self, user_id: UserId, enabled: bool) {
        let mut data = self.data.lock().unwrap();
        if let Some((user, _)) = data.users.iter_mut().find(|(u, _)| u.id == user_id) {
            user.enabled = enabled;
        }
    }

    pub fn set_cart(&self, user_id: UserId, lines: Vec<CartLine>) {
        self.data.lock().unwrap().carts.insert(user_id, lines);
    }

    pub fn wishlist(&self, user_id: UserId, product_id: ProductId) {
        self.data
            .lock()
            .unwrap()
            .wishlists
            .entry(user_id)
            .or_default()
            .push(product_id);
    }

    pub fn product_now(&self, id: ProductId) -> Option<Product> {
        self.data
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn user_reads(&self) -> usize {
        self.user_reads.load(Ordering::SeqCst)
    }

    pub fn cart_reads(&self) -> usize {
        self.cart_reads.load(Ordering::SeqCst)
    }

    fn sorted(mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by_key(|p| p.id);
        products
    }
}

#[async_trait]
impl CatalogReader for MemoryShop {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.product_now(id))
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let data = self.data.lock().unwrap();
        let found = data
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        Ok(Self::sorted(found))
    }

    async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(Self::sorted(self.data.lock().unwrap().products.clone()))
    }

    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let data = self.data.lock().unwrap();
        let found = data
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect();
        Ok(Self::sorted(found))
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.data.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl CatalogWriter for MemoryShop {
    async fn add_product_image(
        &self,
        product_id: ProductId,
        key: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        data.next_image_id += 1;
        let id = ProductImageId::new(data.next_image_id);
        let product = data
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(RepositoryError::NotFound)?;

        let position = product.images.iter().map(|i| i.position + 1).max().unwrap_or(0);
        let image = ProductImage {
            id,
            key: key.to_string(),
            position,
        };
        product.images.push(image.clone());
        Ok(image)
    }

    async fn remove_product_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<Option<ProductImage>, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) else {
            return Ok(None);
        };
        let index = product.images.iter().position(|i| i.id == image_id);
        Ok(index.map(|i| product.images.remove(i)))
    }
}

#[async_trait]
impl CartReader for MemoryShop {
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        self.cart_reads.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        Ok(data.carts.get(&user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WishlistReader for MemoryShop {
    async fn is_wishlisted(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .wishlists
            .get(&user_id)
            .is_some_and(|ids| ids.contains(&product_id)))
    }

    async fn wishlist_product_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.wishlists.get(&user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl UserReader for MemoryShop {
    async fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn user_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.users.iter().find(|(u, _)| &u.email == email).cloned())
    }
}
