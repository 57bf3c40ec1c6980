//! Domain layer for the storefront.
//!
//! This crate provides the core of the shop:
//! - Catalog of immutable, priced items
//! - Identity: users, credential hashing and cart ownership
//! - Cart mutation engine with optimistic concurrency
//! - Order snapshots and per-user order history
//!
//! Every service is built over a [`record_store::RecordStore`] handed in by
//! the caller; entities map onto records through the [`Entity`] trait.

pub mod cart;
pub mod catalog;
pub mod entity;
pub mod error;
pub mod identity;
pub mod money;
pub mod order;

pub use cart::{
    Cart, CartError, CartEvent, CartId, CartService, DEFAULT_WRITE_ATTEMPTS,
    MAX_QUANTITY_PER_REQUEST,
};
pub use catalog::{Catalog, Item, ItemId, NewItem};
pub use entity::{Entity, EntityStore};
pub use error::DomainError;
pub use identity::{
    Argon2Hasher, CredentialHash, CredentialHasher, IdentityService, MIN_PASSWORD_LENGTH, NewUser,
    PasswordPolicy, User, UserId, Username,
};
pub use money::Money;
pub use order::{Order, OrderId, OrderService, SubmitPolicy};
