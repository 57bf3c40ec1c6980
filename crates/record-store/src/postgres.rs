use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Record, RecordId, RecordQuery, Result, StoreError, Version,
    store::{RecordStore, RecordWrite, validate_writes},
};

const SELECT_COLUMNS: &str =
    "SELECT kind, id, record_key, owner_id, version, created_at, updated_at, payload FROM records";

/// PostgreSQL-backed record store implementation.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<Record> {
        let owner_id: Option<Uuid> = row.try_get("owner_id")?;

        Ok(Record {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            kind: row.try_get("kind")?,
            key: row.try_get("record_key")?,
            owner_id: owner_id.map(RecordId::from_uuid),
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            payload: row.try_get("payload")?,
        })
    }

    async fn current_version(
        tx: &mut Transaction<'_, Postgres>,
        record: &Record,
    ) -> Result<Version> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM records WHERE kind = $1 AND id = $2")
                .bind(&record.kind)
                .bind(record.id.as_uuid())
                .fetch_optional(&mut **tx)
                .await?;

        Ok(version.map(Version::new).unwrap_or(Version::initial()))
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, record: &Record) -> Result<Version> {
        let actual = Self::current_version(tx, record).await?;
        if actual != Version::initial() {
            return Err(StoreError::ConcurrencyConflict {
                kind: record.kind.clone(),
                record_id: record.id,
                expected: Version::initial(),
                actual,
            });
        }

        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO records (kind, id, record_key, owner_id, version, created_at, updated_at, payload)
            VALUES ($1, $2, $3, $4, 1, $5, $6, $7)
            RETURNING version
            "#,
        )
        .bind(&record.kind)
        .bind(record.id.as_uuid())
        .bind(&record.key)
        .bind(record.owner_id.map(|id| id.as_uuid()))
        .bind(record.created_at)
        .bind(Utc::now())
        .bind(&record.payload)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_write_error(e, record, Version::initial()))?;

        Ok(Version::new(version))
    }

    async fn update(
        tx: &mut Transaction<'_, Postgres>,
        record: &Record,
        expected: Version,
    ) -> Result<Version> {
        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE records
            SET record_key = $3, owner_id = $4, updated_at = $5, payload = $6, version = version + 1
            WHERE kind = $1 AND id = $2 AND version = $7
            RETURNING version
            "#,
        )
        .bind(&record.kind)
        .bind(record.id.as_uuid())
        .bind(&record.key)
        .bind(record.owner_id.map(|id| id.as_uuid()))
        .bind(Utc::now())
        .bind(&record.payload)
        .bind(expected.as_i64())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_write_error(e, record, expected))?;

        match version {
            Some(version) => Ok(Version::new(version)),
            None => Err(StoreError::ConcurrencyConflict {
                kind: record.kind.clone(),
                record_id: record.id,
                expected,
                actual: Self::current_version(tx, record).await?,
            }),
        }
    }

    async fn upsert(tx: &mut Transaction<'_, Postgres>, record: &Record) -> Result<Version> {
        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO records (kind, id, record_key, owner_id, version, created_at, updated_at, payload)
            VALUES ($1, $2, $3, $4, 1, $5, $6, $7)
            ON CONFLICT (kind, id) DO UPDATE SET
                record_key = EXCLUDED.record_key,
                owner_id = EXCLUDED.owner_id,
                updated_at = EXCLUDED.updated_at,
                payload = EXCLUDED.payload,
                version = records.version + 1
            RETURNING version
            "#,
        )
        .bind(&record.kind)
        .bind(record.id.as_uuid())
        .bind(&record.key)
        .bind(record.owner_id.map(|id| id.as_uuid()))
        .bind(record.created_at)
        .bind(Utc::now())
        .bind(&record.payload)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_write_error(e, record, Version::initial()))?;

        Ok(Version::new(version))
    }
}

/// Translates constraint violations into store errors.
fn map_write_error(e: sqlx::Error, record: &Record, expected: Version) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("unique_kind_key") => {
                return StoreError::DuplicateKey {
                    kind: record.kind.clone(),
                    key: record.key.clone().unwrap_or_default(),
                };
            }
            // A concurrent insert of the same record won the race
            Some("records_pkey") => {
                return StoreError::ConcurrencyConflict {
                    kind: record.kind.clone(),
                    record_id: record.id,
                    expected,
                    actual: Version::first(),
                };
            }
            _ => {}
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn save_all(&self, writes: Vec<RecordWrite>) -> Result<Vec<Version>> {
        validate_writes(&writes)?;

        let mut tx = self.pool.begin().await?;
        let mut versions = Vec::with_capacity(writes.len());

        for write in &writes {
            let version = match write.options.expected_version {
                Some(expected) if expected == Version::initial() => {
                    Self::insert(&mut tx, &write.record).await?
                }
                Some(expected) => Self::update(&mut tx, &write.record, expected).await?,
                None => Self::upsert(&mut tx, &write.record).await?,
            };
            versions.push(version);
        }

        tx.commit().await?;
        metrics::counter!("store_writes_total", "backend" => "postgres")
            .increment(writes.len() as u64);
        Ok(versions)
    }

    async fn get(&self, kind: &str, id: RecordId) -> Result<Option<Record>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE kind = $1 AND id = $2"
        ))
        .bind(kind)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn get_by_key(&self, kind: &str, key: &str) -> Result<Option<Record>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE kind = $1 AND record_key = $2"
        ))
        .bind(kind)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<Record>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.kind.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND kind = ${param_count}"));
        }
        if query.key.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND record_key = ${param_count}"));
        }
        if query.owner_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND owner_id = ${param_count}"));
        }
        if query.field_equals.is_some() {
            sql.push_str(&format!(
                " AND payload->>${} = ${}",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        sql.push_str(" ORDER BY seq ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Bind parameters in the same order they were numbered
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(kind) = query.kind {
            sqlx_query = sqlx_query.bind(kind);
        }
        if let Some(key) = query.key {
            sqlx_query = sqlx_query.bind(key);
        }
        if let Some(owner_id) = query.owner_id {
            sqlx_query = sqlx_query.bind(owner_id.as_uuid());
        }
        if let Some((field, value)) = query.field_equals {
            sqlx_query = sqlx_query.bind(field).bind(value);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn get_version(&self, kind: &str, id: RecordId) -> Result<Option<Version>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM records WHERE kind = $1 AND id = $2")
                .bind(kind)
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(version.map(Version::new))
    }
}
