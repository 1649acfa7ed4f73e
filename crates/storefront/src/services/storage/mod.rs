//! Product image storage.
//!
//! Wraps an [`ObjectStore`] with key generation, a presigned URL cache and
//! the per-page URL lists. Page models never fail because an image URL could
//! not be produced: each entry is resolved on its own and reported as
//! [`ImageUrl::Ready`] or [`ImageUrl::Failed`].

mod s3;

#[cfg(test)]
pub mod memory;

pub use s3::S3ObjectStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use emporium_core::{CartLine, Product};

/// Errors from image storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload was rejected before reaching the backend.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A presigned URL could not be produced.
    #[error("failed to presign {key}: {reason}")]
    Presign { key: String, reason: String },
}

/// Blob storage backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError>;

    /// Remove the object under `key`. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// A time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// One resolved image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageUrl {
    Ready { key: String, url: String },
    Failed { key: String, reason: String },
}

impl ImageUrl {
    /// The object key this entry was resolved for.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Ready { key, .. } | Self::Failed { key, .. } => key,
        }
    }

    /// The URL, if resolution succeeded.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Ready { url, .. } => Some(url),
            Self::Failed { .. } => None,
        }
    }
}

/// Image storage service.
///
/// Cheaply cloneable. Presigned URLs are cached for half their lifetime so a
/// cached URL always has at least half its validity left when served.
#[derive(Clone)]
pub struct StorageService {
    inner: Arc<StorageServiceInner>,
}

struct StorageServiceInner {
    store: Arc<dyn ObjectStore>,
    expiry: Duration,
    urls: Cache<String, String>,
}

impl StorageService {
    /// Create a storage service over `store`, presigning URLs valid for `expiry`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, expiry: Duration) -> Self {
        let urls = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(expiry / 2)
            .build();

        Self {
            inner: Arc::new(StorageServiceInner {
                store,
                expiry,
                urls,
            }),
        }
    }

    /// Upload an image and return its generated key.
    ///
    /// The key is `<unix-millis>_<sanitized filename>`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidUpload` for an empty body or a filename
    /// with nothing usable in it, and `StorageError::Backend` if the put fails.
    #[instrument(skip(self, body), fields(size = body.len()))]
    pub async fn upload(
        &self,
        original_filename: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, StorageError> {
        if body.is_empty() {
            return Err(StorageError::InvalidUpload("empty file".to_string()));
        }
        let name = sanitize_filename(original_filename).ok_or_else(|| {
            StorageError::InvalidUpload(format!("unusable filename: {original_filename:?}"))
        })?;
        let key = format!("{}_{name}", chrono::Utc::now().timestamp_millis());

        self.inner.store.put(&key, content_type, body).await?;
        debug!(%key, "Uploaded image");
        Ok(key)
    }

    /// Delete an image and forget any cached URL for it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Backend` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.store.delete(key).await?;
        self.inner.urls.invalidate(key).await;
        Ok(())
    }

    /// A presigned GET URL for `key`, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Presign` if the backend cannot sign the request.
    pub async fn presigned_url(&self, key: &str) -> Result<String, StorageError> {
        if let Some(url) = self.inner.urls.get(key).await {
            return Ok(url);
        }

        let url = self.inner.store.presign_get(key, self.inner.expiry).await?;
        self.inner.urls.insert(key.to_string(), url.clone()).await;
        Ok(url)
    }

    /// Resolve every key independently.
    pub async fn resolve(&self, keys: &[&str]) -> Vec<ImageUrl> {
        let mut entries = Vec::with_capacity(keys.len());
        for &key in keys {
            let entry = match self.presigned_url(key).await {
                Ok(url) => ImageUrl::Ready {
                    key: key.to_string(),
                    url,
                },
                Err(e) => {
                    warn!(%key, error = %e, "Image URL unavailable");
                    ImageUrl::Failed {
                        key: key.to_string(),
                        reason: e.to_string(),
                    }
                }
            };
            entries.push(entry);
        }
        entries
    }

    /// Primary image of each product, in list order.
    pub async fn product_list_urls(&self, products: &[Product]) -> Vec<ImageUrl> {
        let keys: Vec<&str> = products.iter().map(|p| p.image_key.as_str()).collect();
        self.resolve(&keys).await
    }

    /// Every image of one product: the primary image, then the additional ones.
    pub async fn product_urls(&self, product: &Product) -> Vec<ImageUrl> {
        let keys: Vec<&str> = product.image_keys().collect();
        self.resolve(&keys).await
    }

    /// Primary image of each cart line's product, in line order.
    ///
    /// A line whose product is missing from `products` gets a failed entry.
    pub async fn cart_urls(&self, lines: &[CartLine], products: &[Product]) -> Vec<ImageUrl> {
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            match products.iter().find(|p| p.id == line.product_id) {
                Some(product) => {
                    entries.extend(self.resolve(&[product.image_key.as_str()]).await);
                }
                None => entries.push(ImageUrl::Failed {
                    key: String::new(),
                    reason: format!("product {} not found", line.product_id),
                }),
            }
        }
        entries
    }

    /// Primary image of each wishlisted product, in wishlist order.
    pub async fn wishlist_urls(&self, products: &[Product]) -> Vec<ImageUrl> {
        self.product_list_urls(products).await
    }
}

/// Reduce an uploaded filename to a safe final path component.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_filename(original: &str) -> Option<String> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        return None;
    }
    Some(cleaned)
}
