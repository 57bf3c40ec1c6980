//! Order submission and history.

use record_store::RecordStore;

use crate::cart::{DEFAULT_WRITE_ATTEMPTS, require_cart};
use crate::entity::EntityStore;
use crate::error::DomainError;
use crate::identity::require_user;

use super::{Order, SubmitPolicy};

/// Service that freezes carts into orders and lists a user's orders.
#[derive(Clone)]
pub struct OrderService<S: RecordStore> {
    entities: EntityStore<S>,
    policy: SubmitPolicy,
    max_attempts: usize,
}

impl<S: RecordStore> OrderService<S> {
    /// Creates a new order service with the default submit policy.
    pub fn new(store: S) -> Self {
        Self {
            entities: EntityStore::new(store),
            policy: SubmitPolicy::default(),
            max_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    /// Sets what happens to the cart on submission.
    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how many times a conflicting cart clear is attempted. At least one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the submit policy in effect.
    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    /// Submits the user's cart as a new order.
    ///
    /// An empty cart yields an empty, zero-total order. Under
    /// `SubmitPolicy::ClearCart` the order insert and the cart clear are one
    /// commit, retried on a cart revision conflict.
    #[tracing::instrument(skip(self), fields(policy = %self.policy))]
    pub async fn create_from_cart(&self, username: &str) -> Result<Order, DomainError> {
        let user = require_user(&self.entities, username).await?;

        let mut attempt = 1;
        loop {
            let mut cart = require_cart(&self.entities, &user).await?;
            let mut order = Order::from_cart(&cart);

            let saved = match cart.clear().filter(|_| self.policy.clears_cart()) {
                Some(event) => {
                    cart.apply(event);
                    self.entities.save_pair(&mut order, &mut cart).await
                }
                None => self.entities.save(&mut order).await.map(|_| ()),
            };

            match saved {
                Ok(()) => {
                    metrics::counter!("orders_submitted_total").increment(1);
                    tracing::info!(
                        order_id = %order.id(),
                        item_count = order.item_count(),
                        total = %order.total(),
                        "Order submitted"
                    );
                    return Ok(order);
                }
                Err(e) if e.is_conflict() && attempt < self.max_attempts => {
                    metrics::counter!("cart_write_conflicts_total").increment(1);
                    tracing::debug!(attempt, "Cart changed during submission, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, attempt, "Failed to submit order");
                    return Err(e);
                }
            }
        }
    }

    /// Returns the user's orders in submission order.
    #[tracing::instrument(skip(self))]
    pub async fn find_orders_for_user(&self, username: &str) -> Result<Vec<Order>, DomainError> {
        let user = require_user(&self.entities, username).await?;
        self.entities.find_by_owner(user.id()).await
    }
}
