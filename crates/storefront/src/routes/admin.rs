//! Admin dashboard and product image management.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{info, instrument};

use emporium_core::{ProductId, ProductImage, ProductImageId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Dashboard model.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub category_count: usize,
    pub product_count: usize,
}

/// The admin dashboard.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>> {
    let categories = state.catalog().categories().await?;
    let products = state.catalog().products().await?;
    Ok(Json(Dashboard {
        category_count: categories.len(),
        product_count: products.len(),
    }))
}

/// Upload an additional product image.
///
/// The object is stored first; if the product then turns out not to exist the
/// object is removed again.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductImage>)> {
    let product_id = ProductId::new(product_id);

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, content_type, bytes.to_vec()));
        break;
    }
    let (filename, content_type, body) =
        upload.ok_or_else(|| AppError::BadRequest(format!("missing '{IMAGE_FIELD}' field")))?;

    let key = state.storage().upload(&filename, &content_type, body).await?;
    let image = match state.catalog_writer().add_product_image(product_id, &key).await {
        Ok(image) => image,
        Err(err) => {
            if let Err(e) = state.storage().delete(&key).await {
                tracing::warn!(%key, error = %e, "Failed to remove orphaned image");
            }
            return Err(err.into());
        }
    };

    info!(%product_id, %key, "Product image added");
    Ok((StatusCode::CREATED, Json(image)))
}

/// Delete an additional product image and its object.
///
/// The object goes first. If the store refuses, the row stays so the request
/// can be retried.
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    let product_id = ProductId::new(product_id);
    let image_id = ProductImageId::new(image_id);
    let not_found = || AppError::NotFound(format!("image {image_id} of product {product_id}"));

    let product = state.catalog().product(product_id).await?.ok_or_else(not_found)?;
    let image = product
        .images
        .into_iter()
        .find(|image| image.id == image_id)
        .ok_or_else(not_found)?;

    state.storage().delete(&image.key).await?;
    state
        .catalog_writer()
        .remove_product_image(product_id, image_id)
        .await?
        .ok_or_else(not_found)?;

    info!(%product_id, key = %image.key, "Product image deleted");
    Ok(StatusCode::NO_CONTENT)
}
