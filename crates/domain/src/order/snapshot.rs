//! Immutable order records.

use chrono::{DateTime, Utc};
use common::typed_id;
use record_store::{RecordId, Version};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Item;
use crate::entity::Entity;
use crate::identity::UserId;
use crate::money::Money;

typed_id!(
    /// Unique identifier for an order.
    OrderId
);

/// A submitted order: a frozen copy of a cart at submission time.
///
/// Orders are never modified after they are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<Item>,
    total: Money,
    created_at: DateTime<Utc>,

    #[serde(skip)]
    version: Version,
}

impl Order {
    /// Snapshots a cart into a new, unsaved order.
    ///
    /// Items and total are copied; later cart changes do not reach the order.
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            id: OrderId::new(),
            user_id: cart.user_id(),
            items: cart.items().to_vec(),
            total: cart.total(),
            created_at: Utc::now(),
            version: Version::initial(),
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the user who submitted the order.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the ordered entries.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the order total.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns when the order was submitted.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of entries.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn kind() -> &'static str {
        "order"
    }

    fn id(&self) -> OrderId {
        self.id
    }

    fn owner_id(&self) -> Option<RecordId> {
        Some(self.user_id.into())
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}
