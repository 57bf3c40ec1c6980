//! Cart change events.

use crate::catalog::{Item, ItemId};

/// A decided change to a cart.
///
/// Produced by the cart's decision methods and consumed by `Cart::apply`,
/// which is the only place items and total change.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// Copies of an item were appended, one entry per unit.
    ItemsAdded { item: Item, quantity: u32 },

    /// Entries of an item were removed. `quantity` is the number actually
    /// removed, never more than the cart held.
    ItemsRemoved { item_id: ItemId, quantity: u32 },

    /// Every entry was removed.
    CartCleared,
}

impl CartEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemsAdded { .. } => "ItemsAdded",
            CartEvent::ItemsRemoved { .. } => "ItemsRemoved",
            CartEvent::CartCleared => "CartCleared",
        }
    }
}
