use std::collections::HashSet;

use async_trait::async_trait;

use crate::{Record, RecordId, RecordQuery, Result, StoreError, Version};

/// Options for writing a record to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Revision the writer last read, for optimistic concurrency control.
    /// If None, no version check is performed and the record is upserted.
    pub expected_version: Option<Version>,
}

impl WriteOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the record to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }
}

/// A single record write, part of an atomic batch.
#[derive(Debug, Clone)]
pub struct RecordWrite {
    pub record: Record,
    pub options: WriteOptions,
}

impl RecordWrite {
    /// Creates a write with explicit options.
    pub fn new(record: Record, options: WriteOptions) -> Self {
        Self { record, options }
    }

    /// Creates a write whose expected version is the record's current version.
    ///
    /// A record at the initial version is inserted; any other record is
    /// updated only if the stored revision still matches.
    pub fn checked(record: Record) -> Self {
        let options = WriteOptions::expect_version(record.version);
        Self { record, options }
    }
}

/// Core trait for record store implementations.
///
/// A record store persists versioned entity state. All implementations must
/// be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Saves a batch of records atomically - either all succeed or none do.
    ///
    /// For each write with an expected version, the operation fails with
    /// `ConcurrencyConflict` if the stored revision differs. A record whose
    /// key collides with another record of the same kind fails with
    /// `DuplicateKey`.
    ///
    /// Returns the new version of each record, in write order.
    async fn save_all(&self, writes: Vec<RecordWrite>) -> Result<Vec<Version>>;

    /// Retrieves a record by kind and id.
    async fn get(&self, kind: &str, id: RecordId) -> Result<Option<Record>>;

    /// Retrieves a record by kind and unique key.
    async fn get_by_key(&self, kind: &str, key: &str) -> Result<Option<Record>>;

    /// Retrieves records matching a query, in insertion order.
    async fn query(&self, query: RecordQuery) -> Result<Vec<Record>>;

    /// Gets the current version of a record.
    ///
    /// Returns None if the record doesn't exist.
    async fn get_version(&self, kind: &str, id: RecordId) -> Result<Option<Version>>;
}

/// Extension trait providing convenience methods for record stores.
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    /// Saves a single record.
    async fn save(&self, write: RecordWrite) -> Result<Version> {
        let versions = self.save_all(vec![write]).await?;
        versions
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidWrite("store returned no version".to_string()))
    }

    /// Checks if a record exists.
    async fn exists(&self, kind: &str, id: RecordId) -> Result<bool> {
        Ok(self.get_version(kind, id).await?.is_some())
    }
}

// Blanket implementation for all RecordStore implementations
impl<T: RecordStore + ?Sized> RecordStoreExt for T {}

/// Validates a write batch before it reaches storage.
pub fn validate_writes(writes: &[RecordWrite]) -> Result<()> {
    if writes.is_empty() {
        return Err(StoreError::InvalidWrite(
            "Cannot save an empty batch".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    let mut keys = HashSet::new();
    for write in writes {
        let record = &write.record;
        if !ids.insert((record.kind.as_str(), record.id)) {
            return Err(StoreError::InvalidWrite(format!(
                "{} {} appears twice in one batch",
                record.kind, record.id
            )));
        }
        if let Some(ref key) = record.key
            && !keys.insert((record.kind.as_str(), key.as_str()))
        {
            return Err(StoreError::DuplicateKey {
                kind: record.kind.clone(),
                key: key.clone(),
            });
        }
    }

    Ok(())
}
