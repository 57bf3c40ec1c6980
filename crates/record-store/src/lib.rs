pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::RecordId;
pub use error::{Result, StoreError};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use query::RecordQuery;
pub use record::{Record, RecordBuilder, Version};
pub use store::{RecordStore, RecordStoreExt, RecordWrite, WriteOptions};
