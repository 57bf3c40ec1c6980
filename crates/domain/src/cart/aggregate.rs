//! Cart entity.

use common::typed_id;
use record_store::{RecordId, Version};
use serde::{Deserialize, Serialize};

use crate::catalog::{Item, ItemId};
use crate::entity::Entity;
use crate::identity::UserId;
use crate::money::Money;

use super::{CartError, CartEvent, MAX_QUANTITY_PER_REQUEST};

typed_id!(
    /// Unique identifier for a cart.
    CartId
);

/// A user's shopping cart.
///
/// Holds one entry per unit, so an item added three times appears three
/// times. The total always equals the sum of the entries' prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<Item>,
    total: Money,

    #[serde(skip)]
    version: Version,
}

impl Entity for Cart {
    type Id = CartId;

    fn kind() -> &'static str {
        "cart"
    }

    fn id(&self) -> CartId {
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

// Query methods
impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            total: Money::zero(),
            version: Version::initial(),
        }
    }

    /// Returns the cart ID.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the entries in the order they were added.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the running total.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the number of entries.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns how many entries of an item the cart holds.
    pub fn count_of(&self, item_id: ItemId) -> u32 {
        let count = self.items.iter().filter(|i| i.id() == item_id).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Returns true if the cart has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// Decision methods (return events)
impl Cart {
    /// Decides to append `quantity` copies of an item.
    pub fn add_items(&self, item: &Item, quantity: i64) -> Result<CartEvent, CartError> {
        let quantity = validate_quantity(quantity)?;
        Ok(CartEvent::ItemsAdded {
            item: item.clone(),
            quantity,
        })
    }

    /// Decides to remove up to `quantity` entries of an item.
    ///
    /// Removal is clamped to what the cart holds, so any positive quantity is
    /// accepted. Returns `None` when there is nothing to remove.
    pub fn remove_items(
        &self,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<Option<CartEvent>, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let removable = self.count_of(item_id).min(requested);

        if removable == 0 {
            return Ok(None);
        }
        Ok(Some(CartEvent::ItemsRemoved {
            item_id,
            quantity: removable,
        }))
    }

    /// Decides to empty the cart. Returns `None` if it is already empty.
    pub fn clear(&self) -> Option<CartEvent> {
        (!self.is_empty()).then_some(CartEvent::CartCleared)
    }
}

// Event application
impl Cart {
    /// Applies an event, recomputing the total from the entries.
    pub fn apply(&mut self, event: CartEvent) {
        match event {
            CartEvent::ItemsAdded { item, quantity } => {
                self.items
                    .extend(std::iter::repeat_n(item, quantity as usize));
            }
            CartEvent::ItemsRemoved { item_id, quantity } => {
                // Latest entries go first, undoing the most recent adds
                let mut remaining = quantity;
                let mut index = self.items.len();
                while remaining > 0 && index > 0 {
                    index -= 1;
                    if self.items[index].id() == item_id {
                        self.items.remove(index);
                        remaining -= 1;
                    }
                }
            }
            CartEvent::CartCleared => self.items.clear(),
        }

        self.total = self.items.iter().map(Item::price).sum();
    }
}

fn validate_quantity(quantity: i64) -> Result<u32, CartError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| (1..=MAX_QUANTITY_PER_REQUEST).contains(q))
        .ok_or(CartError::InvalidQuantity { quantity })
}
