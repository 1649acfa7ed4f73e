//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Soap
//!     products:
//!       - name: Lavender Bar
//!         description: Cold-processed with lavender oil
//!         price: "6.50"
//!         currency: USD
//!         quantity: 12
//!         image: lavender_front.png
//!         images: [lavender_side.png, lavender_back.png]
//! ```
//!
//! Image values are object keys already present in the bucket. The whole file
//! is parsed and validated before the database is touched.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use emporium_core::{CurrencyCode, Price};
use emporium_storefront::db::RepositoryError;
use emporium_storefront::db::catalog::{CatalogRepository, NewProduct};

use super::{ConnectError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Top level of the seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

/// A category and its products.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One product.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub quantity: u32,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Prices are stored as `NUMERIC(12, 2)`: at most ten digits before the point.
const PRICE_DIGITS: i64 = 10_000_000_000;

fn default_currency() -> String {
    CurrencyCode::default().as_str().to_owned()
}

/// Every problem in the file, one message each.
#[must_use]
pub fn validate(file: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();

    for category in &file.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_owned());
        }
        for product in &category.products {
            let label = format!("{} / {}", category.name, product.name);
            if product.name.trim().is_empty() {
                errors.push(format!("{}: product with an empty name", category.name));
            }
            if product.image.trim().is_empty() {
                errors.push(format!("{label}: missing primary image"));
            }
            if let Err(e) = price_of(product) {
                errors.push(format!("{label}: {e}"));
            }
            if product.price >= Decimal::from(PRICE_DIGITS) {
                errors.push(format!("{label}: price {} is too large", product.price));
            }
            if i32::try_from(product.quantity).is_err() {
                errors.push(format!("{label}: quantity {} is too large", product.quantity));
            }
        }
    }

    errors
}

fn price_of(product: &ProductSeed) -> Result<Price, emporium_core::PriceError> {
    let currency: CurrencyCode = product.currency.parse()?;
    Price::new(product.price, currency)
}

/// Seed the catalog from `file_path`.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database
/// operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let file: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&file);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let repo = CatalogRepository::new(connect().await?);
    if clear_existing {
        info!("Clearing existing catalog");
        repo.clear().await?;
    }

    let mut products = 0_usize;
    for category_seed in &file.categories {
        let category = repo.upsert_category(category_seed.name.trim()).await?;
        for seed in &category_seed.products {
            let Ok(price) = price_of(seed) else {
                continue;
            };
            let new_product = NewProduct {
                category_id: category.id,
                name: seed.name.trim().to_owned(),
                description: seed.description.clone(),
                price,
                quantity: seed.quantity,
                image_key: seed.image.clone(),
            };
            repo.create_product(&new_product, &seed.images).await?;
            products += 1;
        }
    }

    info!("Seeding complete!");
    info!("  Categories: {}", file.categories.len());
    info!("  Products inserted: {products}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Soap
    products:
      - name: Lavender Bar
        price: "6.50"
        quantity: 12
        image: lavender_front.png
        images: [lavender_side.png]
  - name: Candles
"#;

    #[test]
    fn test_parse_sample_with_defaults() {
        let file: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(file.categories.len(), 2);

        let product = &file.categories[0].products[0];
        assert_eq!(product.currency, "USD");
        assert_eq!(product.images, ["lavender_side.png"]);
        assert!(file.categories[1].products.is_empty());
        assert!(validate(&file).is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let yaml = r#"
categories:
  - name: " "
    products:
      - name: Cheap
        price: "-1"
        quantity: 1
        image: ""
      - name: Odd
        price: "2"
        currency: XYZ
        quantity: 1
        image: odd.png
"#;
        let file: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate(&file);
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn test_validate_rejects_values_the_schema_cannot_hold() {
        let yaml = r#"
categories:
  - name: Soap
    products:
      - name: Bulk
        price: "123456789012.00"
        quantity: 3000000000
        image: bulk.png
      - name: Dear
        price: "9999999999.99"
        quantity: 2147483647
        image: dear.png
"#;
        let file: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate(&file);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors.iter().all(|e| e.starts_with("Soap / Bulk")));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "categories:\n  - name: Soap\n    colour: blue\n";
        assert!(serde_yaml::from_str::<CatalogFile>(yaml).is_err());
    }
}
