//! Cart mutation engine.

use record_store::RecordStore;

use crate::catalog::{Item, ItemId};
use crate::entity::EntityStore;
use crate::error::DomainError;
use crate::identity::{User, require_user};

use super::{Cart, CartError, CartEvent};

/// Default number of read-modify-write attempts per cart mutation.
pub const DEFAULT_WRITE_ATTEMPTS: usize = 5;

/// Service that adds and removes items on users' carts.
///
/// Each mutation reads the cart, decides a change, applies it and saves
/// the cart against the revision it read. A concurrent writer makes the save
/// conflict; the mutation is then re-read and re-decided, up to the
/// configured number of attempts.
#[derive(Clone)]
pub struct CartService<S: RecordStore> {
    entities: EntityStore<S>,
    max_attempts: usize,
}

impl<S: RecordStore> CartService<S> {
    /// Creates a new cart service with the given store.
    pub fn new(store: S) -> Self {
        Self {
            entities: EntityStore::new(store),
            max_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    /// Sets how many times a conflicting write is attempted. At least one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the current cart of a user.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, username: &str) -> Result<Cart, DomainError> {
        let user = require_user(&self.entities, username).await?;
        require_cart(&self.entities, &user).await
    }

    /// Appends `quantity` copies of an item to the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        username: &str,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<Cart, DomainError> {
        self.mutate("add", username, item_id, |cart, item| {
            cart.add_items(item, quantity).map(Some)
        })
        .await
    }

    /// Removes up to `quantity` entries of an item from the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        username: &str,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<Cart, DomainError> {
        self.mutate("remove", username, item_id, |cart, item| {
            cart.remove_items(item.id(), quantity)
        })
        .await
    }

    async fn mutate<F>(
        &self,
        operation: &'static str,
        username: &str,
        item_id: ItemId,
        decide: F,
    ) -> Result<Cart, DomainError>
    where
        F: Fn(&Cart, &Item) -> Result<Option<CartEvent>, CartError> + Send + Sync,
    {
        let user = require_user(&self.entities, username).await?;
        let Some(item) = self.entities.get::<Item>(item_id).await? else {
            tracing::warn!(%item_id, "Item not found");
            return Err(DomainError::not_found("item", item_id));
        };

        let mut attempt = 1;
        loop {
            let mut cart = require_cart(&self.entities, &user).await?;

            let decided = decide(&cart, &item)
                .inspect_err(|e| tracing::warn!(error = %e, "Cart mutation rejected"))?;
            let Some(event) = decided else {
                tracing::debug!(cart_id = %cart.id(), "Nothing to change");
                return Ok(cart);
            };

            let event_type = event.event_type();
            cart.apply(event);

            match self.entities.save(&mut cart).await {
                Ok(version) => {
                    metrics::counter!("cart_mutations_total", "operation" => operation)
                        .increment(1);
                    tracing::info!(
                        cart_id = %cart.id(),
                        %version,
                        event_type,
                        item_count = cart.item_count(),
                        total = %cart.total(),
                        "Cart updated"
                    );
                    return Ok(cart);
                }
                Err(e) if e.is_conflict() && attempt < self.max_attempts => {
                    metrics::counter!("cart_write_conflicts_total").increment(1);
                    tracing::debug!(attempt, "Cart changed concurrently, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_conflict() {
                        metrics::counter!("cart_write_conflicts_total").increment(1);
                    }
                    tracing::error!(error = %e, attempt, "Failed to save cart");
                    return Err(e);
                }
            }
        }
    }
}

/// Loads the cart owned by a user.
pub(crate) async fn require_cart<S: RecordStore>(
    entities: &EntityStore<S>,
    user: &User,
) -> Result<Cart, DomainError> {
    entities
        .get::<Cart>(user.cart_id())
        .await?
        .ok_or_else(|| DomainError::not_found("cart", user.cart_id()))
}
