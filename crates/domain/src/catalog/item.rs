//! Catalog item types.

use common::typed_id;
use record_store::Version;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::DomainError;
use crate::money::Money;

typed_id!(
    /// Unique identifier for a catalog item.
    ItemId
);

/// A sellable catalog item.
///
/// Items are immutable once registered. Carts and orders hold copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    price: Money,
    description: String,

    #[serde(skip)]
    version: Version,
}

impl Item {
    /// Returns the item ID.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn kind() -> &'static str {
        "item"
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

/// Highest price an item may be registered with (one billion).
const MAX_ITEM_PRICE_CENTS: i64 = 100_000_000_000;

/// Input for registering a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub description: String,
}

impl NewItem {
    /// Creates a new item registration.
    pub fn new(name: impl Into<String>, price: Money, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            description: description.into(),
        }
    }

    /// Validates the input and builds an unsaved item with a fresh ID.
    pub fn into_item(self) -> Result<Item, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "item name must not be empty".to_string(),
            ));
        }
        if self.price.is_negative() {
            return Err(DomainError::ValidationFailed(format!(
                "item price must not be negative, got {}",
                self.price.amount()
            )));
        }
        if self.price > Money::from_cents(MAX_ITEM_PRICE_CENTS) {
            return Err(DomainError::ValidationFailed(format!(
                "item price must not exceed {}, got {}",
                Money::from_cents(MAX_ITEM_PRICE_CENTS),
                self.price
            )));
        }

        Ok(Item {
            id: ItemId::new(),
            name: self.name,
            price: self.price,
            description: self.description,
            version: Version::initial(),
        })
    }
}
