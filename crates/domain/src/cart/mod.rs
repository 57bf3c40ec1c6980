//! Cart entity, its change events and the mutation engine.

mod aggregate;
mod events;
mod service;

pub use aggregate::{Cart, CartId};
pub use events::CartEvent;
pub use service::{CartService, DEFAULT_WRITE_ATTEMPTS};

pub(crate) use service::require_cart;

use thiserror::Error;

use crate::error::DomainError;

/// Largest unit count a single add or remove request may carry.
pub const MAX_QUANTITY_PER_REQUEST: u32 = 10_000;

/// Errors produced by cart decisions.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity is not a positive integer within the per-request limit.
    #[error(
        "Invalid quantity: {quantity} (must be between 1 and {max})",
        max = MAX_QUANTITY_PER_REQUEST
    )]
    InvalidQuantity { quantity: i64 },
}

impl From<CartError> for DomainError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::InvalidQuantity { quantity } => DomainError::InvalidQuantity { quantity },
        }
    }
}
