//! Order snapshots and per-user order history.

mod policy;
mod service;
mod snapshot;

pub use policy::SubmitPolicy;
pub use service::OrderService;
pub use snapshot::{Order, OrderId};
