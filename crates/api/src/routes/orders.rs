//! Order submission and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use domain::{Money, Order};
use record_store::RecordStore;
use serde::Serialize;

use super::{AppState, ItemResponse};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub username: String,
    pub items: Vec<ItemResponse>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    fn new(order: &Order, username: &str) -> Self {
        Self {
            id: order.id().to_string(),
            username: username.to_string(),
            items: order.items().iter().map(ItemResponse::from).collect(),
            total: order.total(),
            created_at: order.created_at(),
        }
    }
}

/// POST /api/order/submit/{username} — freeze the user's cart into an order.
#[tracing::instrument(skip(state))]
pub async fn submit<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.create_from_cart(&username).await?;
    Ok(Json(OrderResponse::new(&order, &username)))
}

/// GET /api/order/history/{username} — the user's orders, oldest first.
#[tracing::instrument(skip(state))]
pub async fn history<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.find_orders_for_user(&username).await?;
    Ok(Json(
        orders
            .iter()
            .map(|order| OrderResponse::new(order, &username))
            .collect(),
    ))
}
