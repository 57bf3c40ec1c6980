//! Item catalog.

mod item;
mod service;

pub use item::{Item, ItemId, NewItem};
pub use service::Catalog;
