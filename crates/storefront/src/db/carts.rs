//! Cart repository.

use async_trait::async_trait;
use sqlx::PgPool;

use emporium_core::{CartLine, ProductId, UserId};

use super::{CartReader, RepositoryError, quantity_from_db};

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: i64,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            ProductId::new(row.product_id),
            quantity_from_db(row.quantity, "cart line quantity")?,
        ))
    }
}

/// Repository for cart database operations.
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartReader for CartRepository {
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT product_id, quantity FROM shop.cart_line \
             WHERE user_id = $1 \
             ORDER BY product_id",
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }
}
