//! Catalog repository: categories, products and their additional images.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{
    Category, CategoryId, CurrencyCode, Price, Product, ProductId, ProductImage, ProductImageId,
};

use super::{CatalogReader, CatalogWriter, RepositoryError, quantity_from_db};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i64,
    name: String,
    description: String,
    price: Decimal,
    currency_code: String,
    quantity: i32,
    image_key: String,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Result<Product, RepositoryError> {
        let currency = self
            .currency_code
            .parse::<CurrencyCode>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let price = Price::new(self.price, currency)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Product {
            id: ProductId::new(self.id),
            category_id: CategoryId::new(self.category_id),
            name: self.name,
            description: self.description,
            price,
            quantity: quantity_from_db(self.quantity, "product quantity")?,
            image_key: self.image_key,
            images,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductImageRow {
    id: i64,
    product_id: i64,
    key: String,
    position: i32,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            key: row.key,
            position: row.position,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, price, currency_code, quantity, image_key";

/// A product to insert, without images.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity: u32,
    pub image_key: String,
}

/// Repository for catalog database operations.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a category, or return the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO shop.category (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Insert a product and its additional images in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_product(
        &self,
        product: &NewProduct,
        image_keys: &[String],
    ) -> Result<ProductId, RepositoryError> {
        let quantity = i32::try_from(product.quantity).map_err(|_| {
            RepositoryError::Conflict(format!("quantity {} out of range", product.quantity))
        })?;

        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO shop.product \
             (category_id, name, description, price, currency_code, quantity, image_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(product.category_id.as_i64())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(product.price.currency_code().as_str())
        .bind(quantity)
        .bind(&product.image_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_foreign_key)?;

        for (position, key) in (0_i32..).zip(image_keys) {
            sqlx::query(
                "INSERT INTO shop.product_image (product_id, key, position) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(key)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ProductId::new(id))
    }

    /// Delete every category, product and dependent row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query("TRUNCATE shop.category, shop.product, shop.product_image CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Load products matching a `WHERE` clause and attach their images.
    async fn load_products<'q>(
        &self,
        query: sqlx::query::QueryAs<'q, sqlx::Postgres, ProductRow, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = query.fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut images = self.images_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let own = images.remove(&row.id).unwrap_or_default();
                row.into_product(own)
            })
            .collect()
    }

    /// Additional images of the given products, grouped and ordered by position.
    async fn images_for(
        &self,
        product_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ProductImage>>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            "SELECT id, product_id, key, position FROM shop.product_image \
             WHERE product_id = ANY($1) \
             ORDER BY product_id, position",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

/// Foreign key violations mean the referenced row is gone.
fn map_foreign_key(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(err)
}

#[async_trait]
impl CatalogReader for CatalogRepository {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1");
        let mut products = self
            .load_products(sqlx::query_as(&sql).bind(id.as_i64()))
            .await?;
        Ok(products.pop())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = ANY($1) ORDER BY id");
        self.load_products(sqlx::query_as(&sql).bind(raw)).await
    }

    async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY id");
        self.load_products(sqlx::query_as(&sql)).await
    }

    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE category_id = $1 ORDER BY id"
        );
        self.load_products(sqlx::query_as(&sql).bind(category_id.as_i64()))
            .await
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM shop.category WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM shop.category ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CatalogWriter for CatalogRepository {
    async fn add_product_image(
        &self,
        product_id: ProductId,
        key: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent uploads for one product, so the
        // MAX(position) + 1 below cannot collide.
        sqlx::query("SELECT id FROM shop.product WHERE id = $1 FOR UPDATE")
            .bind(product_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let row = sqlx::query_as::<_, ProductImageRow>(
            "INSERT INTO shop.product_image (product_id, key, position) \
             SELECT $1, $2, COALESCE(MAX(position) + 1, 0) \
             FROM shop.product_image WHERE product_id = $1 \
             RETURNING id, product_id, key, position",
        )
        .bind(product_id.as_i64())
        .bind(key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "image position"))?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn remove_product_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<Option<ProductImage>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImageRow>(
            "DELETE FROM shop.product_image WHERE id = $1 AND product_id = $2 \
             RETURNING id, product_id, key, position",
        )
        .bind(image_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
