use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Record, RecordId, RecordQuery, Result, StoreError, Version,
    store::{RecordStore, RecordWrite, validate_writes},
};

/// In-memory record store implementation.
///
/// Records are kept in insertion order; an update replaces the record in
/// place so listings keep the order of first save. Provides the same
/// interface and conflict semantics as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

/// A write that passed every check and is ready to be applied.
struct PreparedWrite {
    position: Option<usize>,
    record: Record,
}

fn prepare(store: &[Record], write: RecordWrite) -> Result<PreparedWrite> {
    let RecordWrite {
        mut record,
        options,
    } = write;

    let position = store
        .iter()
        .position(|r| r.kind == record.kind && r.id == record.id);
    let current_version = position
        .and_then(|i| store.get(i))
        .map(|r| r.version)
        .unwrap_or(Version::initial());

    if let Some(expected) = options.expected_version
        && current_version != expected
    {
        return Err(StoreError::ConcurrencyConflict {
            kind: record.kind,
            record_id: record.id,
            expected,
            actual: current_version,
        });
    }

    if let Some(ref key) = record.key {
        let taken = store.iter().any(|r| {
            r.kind == record.kind && r.id != record.id && r.key.as_ref() == Some(key)
        });
        if taken {
            return Err(StoreError::DuplicateKey {
                kind: record.kind,
                key: key.clone(),
            });
        }
    }

    let now = Utc::now();
    if let Some(existing) = position.and_then(|i| store.get(i)) {
        record.created_at = existing.created_at;
    }
    record.updated_at = now;
    record.version = current_version.next();

    Ok(PreparedWrite { position, record })
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn save_all(&self, writes: Vec<RecordWrite>) -> Result<Vec<Version>> {
        validate_writes(&writes)?;

        let mut store = self.records.write().await;

        // Check every write before applying any of them
        let prepared = writes
            .into_iter()
            .map(|write| prepare(&store, write))
            .collect::<Result<Vec<_>>>()?;

        let count = prepared.len() as u64;
        let mut versions = Vec::with_capacity(prepared.len());
        for PreparedWrite { position, record } in prepared {
            versions.push(record.version);
            match position.and_then(|i| store.get_mut(i)) {
                Some(slot) => *slot = record,
                None => store.push(record),
            }
        }

        metrics::counter!("store_writes_total", "backend" => "memory").increment(count);
        Ok(versions)
    }

    async fn get(&self, kind: &str, id: RecordId) -> Result<Option<Record>> {
        let store = self.records.read().await;
        Ok(store
            .iter()
            .find(|r| r.kind == kind && r.id == id)
            .cloned())
    }

    async fn get_by_key(&self, kind: &str, key: &str) -> Result<Option<Record>> {
        let store = self.records.read().await;
        Ok(store
            .iter()
            .find(|r| r.kind == kind && r.key.as_deref() == Some(key))
            .cloned())
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<Record>> {
        let store = self.records.read().await;
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(store
            .iter()
            .filter(|r| query.matches(r))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_version(&self, kind: &str, id: RecordId) -> Result<Option<Version>> {
        let store = self.records.read().await;
        Ok(store
            .iter()
            .find(|r| r.kind == kind && r.id == id)
            .map(|r| r.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RecordStoreExt, WriteOptions};

    fn create_test_record(kind: &str, key: Option<&str>) -> Record {
        Record::builder()
            .id(RecordId::new())
            .kind(kind)
            .key(key.map(String::from))
            .payload_raw(serde_json::json!({"name": key.unwrap_or("anonymous")}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn save_new_record() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("item", None);
        let id = record.id;

        let version = store.save(RecordWrite::checked(record)).await.unwrap();
        assert_eq!(version, Version::first());

        let stored = store.get("item", id).await.unwrap().unwrap();
        assert_eq!(stored.version, Version::first());
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn update_increments_version_and_keeps_created_at() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("cart", None);
        let id = record.id;
        store.save(RecordWrite::checked(record)).await.unwrap();

        let mut loaded = store.get("cart", id).await.unwrap().unwrap();
        let created_at = loaded.created_at;
        loaded.payload = serde_json::json!({"items": [1]});

        let version = store.save(RecordWrite::checked(loaded)).await.unwrap();
        assert_eq!(version, Version::new(2));

        let stored = store.get("cart", id).await.unwrap().unwrap();
        assert_eq!(stored.created_at, created_at);
        assert_eq!(stored.payload, serde_json::json!({"items": [1]}));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn concurrency_conflict_on_stale_version() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("cart", None);
        let id = record.id;
        store.save(RecordWrite::checked(record)).await.unwrap();

        // Two writers read the same revision
        let first = store.get("cart", id).await.unwrap().unwrap();
        let second = first.clone();

        store.save(RecordWrite::checked(first)).await.unwrap();
        let result = store.save(RecordWrite::checked(second)).await;

        match result {
            Err(StoreError::ConcurrencyConflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Version::first());
                assert_eq!(actual, Version::new(2));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn insert_conflicts_when_record_exists() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("item", None);
        store.save(RecordWrite::checked(record.clone())).await.unwrap();

        let result = store.save(RecordWrite::checked(record)).await;
        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn unchecked_write_upserts() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("item", None);
        let id = record.id;

        store
            .save(RecordWrite::new(record.clone(), WriteOptions::new()))
            .await
            .unwrap();
        let version = store
            .save(RecordWrite::new(record, WriteOptions::new()))
            .await
            .unwrap();

        assert_eq!(version, Version::new(2));
        assert_eq!(store.get_version("item", id).await.unwrap(), Some(version));
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected() {
        let store = InMemoryRecordStore::new();
        store
            .save(RecordWrite::checked(create_test_record("user", Some("alice"))))
            .await
            .unwrap();

        let result = store
            .save(RecordWrite::checked(create_test_record("user", Some("alice"))))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::DuplicateKey { ref key, .. }) if key == "alice"
        ));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn same_key_in_other_kind_is_allowed() {
        let store = InMemoryRecordStore::new();
        store
            .save(RecordWrite::checked(create_test_record("user", Some("alice"))))
            .await
            .unwrap();
        store
            .save(RecordWrite::checked(create_test_record("team", Some("alice"))))
            .await
            .unwrap();

        assert_eq!(store.record_count().await, 2);
    }

    #[tokio::test]
    async fn batch_is_atomic() {
        let store = InMemoryRecordStore::new();
        let existing = create_test_record("item", None);
        store
            .save(RecordWrite::checked(existing.clone()))
            .await
            .unwrap();

        // Second write is stale, so the first must not be applied either
        let fresh = create_test_record("cart", None);
        let fresh_id = fresh.id;
        let result = store
            .save_all(vec![
                RecordWrite::checked(fresh),
                RecordWrite::checked(existing),
            ])
            .await;

        assert!(result.is_err());
        assert!(store.get("cart", fresh_id).await.unwrap().is_none());
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn get_by_key_finds_record() {
        let store = InMemoryRecordStore::new();
        let record = create_test_record("user", Some("bob"));
        let id = record.id;
        store.save(RecordWrite::checked(record)).await.unwrap();

        let found = store.get_by_key("user", "bob").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.get_by_key("user", "Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_preserves_insertion_order() {
        let store = InMemoryRecordStore::new();
        let owner = RecordId::new();

        let mut ids = Vec::new();
        for i in 0..3 {
            let record = Record::builder()
                .id(RecordId::new())
                .kind("order")
                .owner_id(Some(owner))
                .payload_raw(serde_json::json!({ "n": i }))
                .build()
                .unwrap();
            ids.push(record.id);
            store.save(RecordWrite::checked(record)).await.unwrap();
        }
        store
            .save(RecordWrite::checked(create_test_record("order", None)))
            .await
            .unwrap();

        let orders = store
            .query(RecordQuery::for_kind("order").owner_id(owner))
            .await
            .unwrap();
        let found: Vec<_> = orders.iter().map(|r| r.id).collect();
        assert_eq!(found, ids);

        let page = store
            .query(RecordQuery::for_kind("order").owner_id(owner).offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, ids[1]);
    }

    #[tokio::test]
    async fn query_by_payload_field() {
        let store = InMemoryRecordStore::new();
        store
            .save(RecordWrite::checked(create_test_record("item", Some("a"))))
            .await
            .unwrap();
        store
            .save(RecordWrite::checked(create_test_record("item", Some("b"))))
            .await
            .unwrap();

        let found = store
            .query(RecordQuery::for_kind("item").field_equals("name", "b"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryRecordStore::new();
        store
            .save(RecordWrite::checked(create_test_record("item", None)))
            .await
            .unwrap();
        store.clear().await;
        assert_eq!(store.record_count().await, 0);
    }
}
