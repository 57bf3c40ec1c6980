//! HTTP route handlers and the response shapes they share.

pub mod cart;
pub mod health;
pub mod items;
pub mod metrics;
pub mod orders;
pub mod users;

use domain::{
    Argon2Hasher, Cart, CartService, Catalog, IdentityService, Item, Money, OrderService,
};
use record_store::RecordStore;
use serde::Serialize;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RecordStore> {
    pub catalog: Catalog<S>,
    pub identity: IdentityService<S, Argon2Hasher>,
    pub carts: CartService<S>,
    pub orders: OrderService<S>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub description: String,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            description: item.description().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: String,
    pub items: Vec<ItemResponse>,
    pub total: Money,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id().to_string(),
            items: cart.items().iter().map(ItemResponse::from).collect(),
            total: cart.total(),
        }
    }
}
