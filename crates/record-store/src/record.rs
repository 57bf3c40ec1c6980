use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{RecordId, StoreError};

/// Revision number of a stored record, used for optimistic concurrency control.
///
/// A record that has never been saved is at version 0. The first save
/// produces version 1 and every later save increments it by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) of a record that does not exist yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1), assigned by the first save.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A stored record: an entity's serialized state plus the metadata the
/// store indexes on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique within `kind`.
    pub id: RecordId,

    /// The entity kind (e.g., "item", "user", "cart", "order").
    pub kind: String,

    /// Optional natural key, unique within `kind` (e.g., a username).
    pub key: Option<String>,

    /// Optional owning record, used for per-owner listings.
    pub owner_id: Option<RecordId>,

    /// Revision of the record. Assigned by the store on save.
    pub version: Version,

    /// When the record was first saved.
    pub created_at: DateTime<Utc>,

    /// When the record was last saved.
    pub updated_at: DateTime<Utc>,

    /// The entity state as JSON.
    pub payload: serde_json::Value,
}

impl Record {
    /// Creates a new record builder.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Deserializes the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Returns the payload field as a string, if present.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(serde_json::Value::as_str)
    }
}

/// Builder for constructing records.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    id: Option<RecordId>,
    kind: Option<String>,
    key: Option<String>,
    owner_id: Option<RecordId>,
    payload: Option<serde_json::Value>,
}

impl RecordBuilder {
    /// Sets the record ID.
    pub fn id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the record kind.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the unique key.
    pub fn key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }

    /// Sets the owning record.
    pub fn owner_id(mut self, owner_id: Option<RecordId>) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the record at the initial version.
    ///
    /// Fails with `InvalidWrite` if the id, kind or payload is missing.
    pub fn build(self) -> Result<Record, StoreError> {
        let missing = |field: &str| StoreError::InvalidWrite(format!("{field} is required"));
        let created_at = Utc::now();

        Ok(Record {
            id: self.id.ok_or_else(|| missing("id"))?,
            kind: self.kind.ok_or_else(|| missing("kind"))?,
            key: self.key,
            owner_id: self.owner_id,
            version: Version::initial(),
            created_at,
            updated_at: created_at,
            payload: self.payload.ok_or_else(|| missing("payload"))?,
        })
    }
}
