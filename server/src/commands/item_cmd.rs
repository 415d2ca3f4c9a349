//! HTTP Commands for Item CRUD + Reorder
//!
//! Exposes item operations under `/todos`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::error::{ApiError, AppJson};
use crate::domain::{DomainError, Item, ItemId, ItemPayload, ReorderEntry};
use crate::AppState;

fn not_found(id: ItemId) -> ApiError {
    DomainError::NotFound(format!("Item {} not found", id)).into()
}

/// Liveness probe
pub async fn health() -> &'static str {
    "OK"
}

/// List all items
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.items.find_all().await?))
}

/// Get item by ID
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>, ApiError> {
    state
        .items
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Create a new item; the order index is assigned when omitted
pub async fn create_item(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ItemPayload>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    payload.validate()?;
    let created = state.items.save(payload.into_item()).await?;
    log::info!("created item {} at {:?}", created.id, created.order_index);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace name, price, limit date and order index of an existing item
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    AppJson(payload): AppJson<ItemPayload>,
) -> Result<Json<Item>, ApiError> {
    payload.validate()?;
    state
        .items
        .update(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Delete item; 404 when it does not exist
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<StatusCode, ApiError> {
    if state.items.find_by_id(id).await?.is_none() {
        return Err(not_found(id));
    }
    state.items.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a reorder batch all-or-nothing
pub async fn reorder_items(
    State(state): State<AppState>,
    AppJson(entries): AppJson<Vec<ReorderEntry>>,
) -> Result<StatusCode, ApiError> {
    state.items.reorder(entries).await?;
    Ok(StatusCode::NO_CONTENT)
}
