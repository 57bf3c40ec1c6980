use crate::{Record, RecordId};

/// Builder for constructing record queries.
///
/// Results are always returned in insertion order (the order in which the
/// records were first saved).
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Filter by record kind.
    pub kind: Option<String>,

    /// Filter by unique key.
    pub key: Option<String>,

    /// Filter by owning record.
    pub owner_id: Option<RecordId>,

    /// Filter by a top-level string field of the payload: `(field, value)`.
    pub field_equals: Option<(String, String)>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub offset: Option<usize>,
}

impl RecordQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for all records of a kind.
    pub fn for_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    /// Filters by unique key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Filters by owning record.
    pub fn owner_id(mut self, owner_id: RecordId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Filters to records whose payload has `field` equal to `value`.
    pub fn field_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_equals = Some((field.into(), value.into()));
        self
    }

    /// Limits the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many records before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the record satisfies every filter of this query.
    ///
    /// Limit and offset are not applied here.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ref kind) = self.kind
            && &record.kind != kind
        {
            return false;
        }
        if let Some(ref key) = self.key
            && record.key.as_ref() != Some(key)
        {
            return false;
        }
        if let Some(owner) = self.owner_id
            && record.owner_id != Some(owner)
        {
            return false;
        }
        if let Some((ref field, ref value)) = self.field_equals
            && record.field_str(field) != Some(value.as_str())
        {
            return false;
        }
        true
    }
}
