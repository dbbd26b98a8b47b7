//! Migration history store.
//!
//! One row per applied unit in `<schema>.migration_history`. Row ids come
//! from a sequence, so the highest id is always the most recently recorded
//! unit. The store never commits: callers wrap each mutation in the same
//! transaction as the unit's actions.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tm_core::is_plain_identifier;
use tm_db::{Database, DatabaseCore, DatabaseSchema, DbError, Row};

/// Name of the history table inside the target schema.
pub const HISTORY_TABLE: &str = "migration_history";

/// One applied unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// Store-assigned, increasing with insertion order
    pub id: i64,
    /// Unit identifier, e.g. `001_v1.yml`
    pub migration: String,
    /// When the unit was recorded
    pub applied_at: DateTime<Utc>,
}

/// History table bound to one target schema.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    schema: String,
}

impl HistoryStore {
    /// Bind the store to `schema`, which must be a plain identifier.
    pub fn new(schema: impl Into<String>) -> MigrateResult<Self> {
        let schema = schema.into();
        if !is_plain_identifier(&schema) {
            return Err(MigrateError::InvalidSchemaName { schema });
        }
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Schema-qualified table name.
    pub fn table(&self) -> String {
        format!("{}.{}", self.schema, HISTORY_TABLE)
    }

    fn sequence(&self) -> String {
        format!("{}.{}_id_seq", self.schema, HISTORY_TABLE)
    }

    fn access_error(&self, operation: &'static str) -> impl FnOnce(DbError) -> MigrateError + '_ {
        move |source| MigrateError::StoreAccess {
            operation,
            schema: self.schema.clone(),
            source,
        }
    }

    /// Whether the history table has been created.
    pub async fn exists(&self, db: &dyn Database) -> MigrateResult<bool> {
        db.relation_exists(&self.table())
            .await
            .map_err(self.access_error("inspect"))
    }

    /// Create the history table if it is missing.
    ///
    /// Returns `true` when the table was created by this call. Fails with
    /// [`MigrateError::SchemaNotFound`] if the target schema does not exist.
    pub async fn bootstrap(&self, db: &dyn Database) -> MigrateResult<bool> {
        if self.exists(db).await? {
            return Ok(false);
        }

        let schema_exists = db
            .schema_exists(&self.schema)
            .await
            .map_err(self.access_error("inspect"))?;
        if !schema_exists {
            return Err(MigrateError::SchemaNotFound {
                schema: self.schema.clone(),
            });
        }

        log::info!("Creating history table {}", self.table());
        let ddl = format!(
            "CREATE SEQUENCE IF NOT EXISTS {seq};
             CREATE TABLE IF NOT EXISTS {table} (
                 id        BIGINT PRIMARY KEY DEFAULT nextval('{seq}'),
                 migration VARCHAR NOT NULL,
                 applied   TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT current_timestamp
             );",
            seq = self.sequence(),
            table = self.table(),
        );
        db.execute_batch(&ddl)
            .await
            .map_err(self.access_error("create"))?;
        Ok(true)
    }

    /// The record with the highest id, if any.
    pub async fn most_recent(&self, db: &dyn Database) -> MigrateResult<Option<HistoryRecord>> {
        let sql = format!(
            "SELECT id, migration, epoch_ms(applied) FROM {} ORDER BY id DESC LIMIT 1",
            self.table()
        );
        let rows = db
            .query_rows(&sql, &[])
            .await
            .map_err(self.access_error("read"))?;
        rows.into_iter().next().map(|row| self.parse_row(row)).transpose()
    }

    /// Every record, oldest first.
    pub async fn list(&self, db: &dyn Database) -> MigrateResult<Vec<HistoryRecord>> {
        let sql = format!(
            "SELECT id, migration, epoch_ms(applied) FROM {} ORDER BY id",
            self.table()
        );
        let rows = db
            .query_rows(&sql, &[])
            .await
            .map_err(self.access_error("read"))?;
        rows.into_iter().map(|row| self.parse_row(row)).collect()
    }

    /// Record `identifier` as applied now.
    pub async fn append(&self, db: &dyn Database, identifier: &str) -> MigrateResult<()> {
        let sql = format!("INSERT INTO {} (migration) VALUES (?)", self.table());
        db.execute_with_params(&sql, &[identifier])
            .await
            .map_err(|source| MigrateError::StoreWrite {
                operation: "append",
                identifier: identifier.to_string(),
                source,
            })?;
        log::debug!("Recorded {} in {}", identifier, self.table());
        Ok(())
    }

    /// Delete every record for `identifier`; returns how many rows went.
    ///
    /// Removing an identifier that is not recorded is not an error.
    pub async fn remove(&self, db: &dyn Database, identifier: &str) -> MigrateResult<usize> {
        let sql = format!("DELETE FROM {} WHERE migration = ?", self.table());
        let removed = db
            .execute_with_params(&sql, &[identifier])
            .await
            .map_err(|source| MigrateError::StoreWrite {
                operation: "remove",
                identifier: identifier.to_string(),
                source,
            })?;
        log::debug!("Removed {} row(s) for {} from {}", removed, identifier, self.table());
        Ok(removed)
    }

    fn parse_row(&self, row: Row) -> MigrateResult<HistoryRecord> {
        let malformed = || {
            self.access_error("read")(DbError::ExecutionError(format!(
                "unexpected history row {:?}",
                row
            )))
        };

        let id = row
            .first()
            .cloned()
            .flatten()
            .and_then(|v| v.parse::<i64>().ok());
        let migration = row.get(1).cloned().flatten();
        let applied_at = row
            .get(2)
            .cloned()
            .flatten()
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        match (id, migration, applied_at) {
            (Some(id), Some(migration), Some(applied_at)) => Ok(HistoryRecord {
                id,
                migration,
                applied_at,
            }),
            _ => Err(malformed()),
        }
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
