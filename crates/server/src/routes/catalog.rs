//! Catalog endpoints. Reads are public; mutations are admin-gated.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use khaja_core::{CategoryId, ItemId};

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::catalog::{Category, Item, MenuItem};
use crate::state::AppState;

/// `GET /api/items` - the full menu, grouped by category order.
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let items = CatalogRepository::new(state.pool()).list_menu_items().await?;
    Ok(Json(items))
}

/// `GET /api/categories` - all categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    category_id: CategoryId,
    name: String,
    price: Decimal,
    image_url: Option<String>,
}

/// `POST /api/items` - admin-only item creation.
pub async fn create_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Payload("item name is required".to_owned()));
    }
    if body.price < Decimal::ZERO {
        return Err(AppError::Payload("price must not be negative".to_owned()));
    }

    let item = CatalogRepository::new(state.pool())
        .create_item(
            body.category_id,
            body.name.trim(),
            body.price,
            body.image_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    name: String,
    price: Decimal,
    image_url: Option<String>,
}

/// `PUT /api/items/{id}` - admin-only item update.
pub async fn update_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Value>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Payload("item name is required".to_owned()));
    }
    if body.price < Decimal::ZERO {
        return Err(AppError::Payload("price must not be negative".to_owned()));
    }

    CatalogRepository::new(state.pool())
        .update_item(id, body.name.trim(), body.price, body.image_url.as_deref())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("item"),
            other => other.into(),
        })?;

    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/items/{id}` - admin-only item removal. Historical order lines
/// keep their price/name snapshot.
pub async fn delete_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<Value>, AppError> {
    CatalogRepository::new(state.pool())
        .delete_item(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("item"),
            other => other.into(),
        })?;

    Ok(Json(json!({ "success": true })))
}
