//! Cart mutation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::ItemId;
use record_store::RecordStore;
use serde::Deserialize;

use super::{AppState, CartResponse};
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCartRequest {
    pub username: String,
    pub item_id: String,
    pub quantity: i64,
}

/// POST /api/cart/addToCart — append `quantity` copies of an item.
#[tracing::instrument(skip(state, req), fields(username = %req.username, quantity = req.quantity))]
pub async fn add<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ModifyCartRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let item_id: ItemId = req.item_id.parse()?;
    let cart = state
        .carts
        .add_item(&req.username, item_id, req.quantity)
        .await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// POST /api/cart/removeFromCart — remove up to `quantity` copies of an item.
#[tracing::instrument(skip(state, req), fields(username = %req.username, quantity = req.quantity))]
pub async fn remove<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ModifyCartRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let item_id: ItemId = req.item_id.parse()?;
    let cart = state
        .carts
        .remove_item(&req.username, item_id, req.quantity)
        .await?;
    Ok(Json(CartResponse::from(&cart)))
}
