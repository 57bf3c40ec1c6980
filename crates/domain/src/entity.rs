//! Mapping between domain entities and stored records.

use std::fmt::Display;

use record_store::{Record, RecordId, RecordQuery, RecordStore, RecordStoreExt, RecordWrite, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DomainError;

/// Trait for entities persisted through the record store.
///
/// An entity is serialized whole into a record payload. The revision lives
/// on the record, not in the payload: implementations keep it in a
/// `#[serde(skip)]` field that [`EntityStore`] fills in on load and save.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Typed identifier of the entity.
    type Id: Copy + Into<RecordId> + From<RecordId> + Display + Send + Sync;

    /// Returns the record kind the entity is stored under.
    fn kind() -> &'static str;

    /// Returns the entity's identifier.
    fn id(&self) -> Self::Id;

    /// Returns the natural key, unique within the kind.
    fn key(&self) -> Option<String> {
        None
    }

    /// Returns the owning record, used for per-owner listings.
    fn owner_id(&self) -> Option<RecordId> {
        None
    }

    /// Returns the revision the entity was loaded at.
    ///
    /// A never-saved entity is at `Version::initial()`.
    fn version(&self) -> Version;

    /// Sets the revision.
    fn set_version(&mut self, version: Version);
}

/// Typed repository over a record store.
///
/// Every save is checked against the entity's revision, so a writer holding
/// a stale copy gets a conflict instead of overwriting a newer one.
#[derive(Clone)]
pub struct EntityStore<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> EntityStore<S> {
    /// Creates a new entity store over the given record store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads an entity by id.
    pub async fn get<E: Entity>(&self, id: E::Id) -> Result<Option<E>, DomainError> {
        self.store
            .get(E::kind(), id.into())
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Loads an entity by its natural key.
    pub async fn find_by_key<E: Entity>(&self, key: &str) -> Result<Option<E>, DomainError> {
        self.store
            .get_by_key(E::kind(), key)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Lists entities owned by a record, in insertion order.
    pub async fn find_by_owner<E: Entity>(
        &self,
        owner: impl Into<RecordId>,
    ) -> Result<Vec<E>, DomainError> {
        self.find(RecordQuery::for_kind(E::kind()).owner_id(owner.into()))
            .await
    }

    /// Lists entities whose top-level string `field` equals `value`.
    pub async fn find_where<E: Entity>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<E>, DomainError> {
        self.find(RecordQuery::for_kind(E::kind()).field_equals(field, value))
            .await
    }

    /// Lists every entity of a kind, in insertion order.
    pub async fn list<E: Entity>(&self) -> Result<Vec<E>, DomainError> {
        self.find(RecordQuery::for_kind(E::kind())).await
    }

    /// Saves an entity and updates its revision.
    pub async fn save<E: Entity>(&self, entity: &mut E) -> Result<Version, DomainError> {
        let version = self.store.save(Self::encode(entity)?).await?;
        entity.set_version(version);
        Ok(version)
    }

    /// Saves two entities in one atomic commit.
    ///
    /// Neither revision is updated unless both writes succeed.
    pub async fn save_pair<A: Entity, B: Entity>(
        &self,
        first: &mut A,
        second: &mut B,
    ) -> Result<(), DomainError> {
        let writes = vec![Self::encode(first)?, Self::encode(second)?];
        let versions = self.store.save_all(writes).await?;

        if let &[a, b] = versions.as_slice() {
            first.set_version(a);
            second.set_version(b);
            Ok(())
        } else {
            Err(record_store::StoreError::InvalidWrite(format!(
                "expected 2 versions, store returned {}",
                versions.len()
            ))
            .into())
        }
    }

    async fn find<E: Entity>(&self, query: RecordQuery) -> Result<Vec<E>, DomainError> {
        self.store
            .query(query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    fn encode<E: Entity>(entity: &E) -> Result<RecordWrite, DomainError> {
        let mut record = Record::builder()
            .id(entity.id())
            .kind(E::kind())
            .key(entity.key())
            .owner_id(entity.owner_id())
            .payload(entity)?
            .build()?;
        record.version = entity.version();

        Ok(RecordWrite::checked(record))
    }

    fn decode<E: Entity>(record: Record) -> Result<E, DomainError> {
        let mut entity: E = record.decode()?;
        entity.set_version(record.version);
        Ok(entity)
    }
}
