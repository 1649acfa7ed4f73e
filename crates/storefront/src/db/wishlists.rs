//! Wishlist repository.

use async_trait::async_trait;
use sqlx::PgPool;

use emporium_core::{ProductId, UserId};

use super::{RepositoryError, WishlistReader};

/// Repository for wishlist database operations.
#[derive(Clone)]
pub struct WishlistRepository {
    pool: PgPool,
}

impl WishlistRepository {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistReader for WishlistRepository {
    async fn is_wishlisted(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM shop.wishlist_item WHERE user_id = $1 AND product_id = $2\
             )",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn wishlist_product_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT product_id FROM shop.wishlist_item \
             WHERE user_id = $1 \
             ORDER BY created_at, product_id",
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| ProductId::new(id)).collect())
    }
}
