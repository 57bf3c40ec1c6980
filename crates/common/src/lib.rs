//! Shared identifier types used by the record store and the domain layer.

mod types;

pub use types::{ParseIdError, RecordId};

#[doc(hidden)]
pub use uuid::Uuid as __Uuid;
