//! Catalog lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::ItemId;
use record_store::RecordStore;

use super::{AppState, ItemResponse};
use crate::error::ApiError;

/// GET /api/item — list every catalog item.
#[tracing::instrument(skip(state))]
pub async fn list<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.catalog.list_items().await?;
    Ok(Json(items.iter().map(ItemResponse::from).collect()))
}

/// GET /api/item/{id} — fetch one item by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item_id: ItemId = id.parse()?;

    let item = state
        .catalog
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("item not found: {item_id}")))?;

    Ok(Json(ItemResponse::from(&item)))
}

/// GET /api/item/name/{name} — all items with exactly this name.
///
/// An empty match is a 404, never an empty list.
#[tracing::instrument(skip(state))]
pub async fn by_name<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.catalog.find_by_name(&name).await?;
    if items.is_empty() {
        return Err(ApiError::NotFound(format!("no items named: {name}")));
    }

    Ok(Json(items.iter().map(ItemResponse::from).collect()))
}
