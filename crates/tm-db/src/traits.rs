//! Database trait definitions

use crate::error::DbResult;
use async_trait::async_trait;

/// One result row, every column rendered as text (`None` for SQL NULL).
pub type Row = Vec<Option<String>>;

/// Statement execution and row retrieval.
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a single statement with positional `?` parameters
    async fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query with positional `?` parameters and collect every row
    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>>;

    /// Run a query and return the first column of the first row, if any
    async fn query_one(&self, sql: &str) -> DbResult<Option<String>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Catalog inspection and schema management.
#[async_trait]
pub trait DatabaseSchema: Send + Sync {
    /// Check if a table or view exists (`schema.name` or unqualified)
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Check if a schema exists
    async fn schema_exists(&self, schema: &str) -> DbResult<bool>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;
}

/// Explicit transaction control on the backend's single connection.
#[async_trait]
pub trait DatabaseTransaction: Send + Sync {
    /// Start a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;
}

/// Database abstraction trait for Tidemark
///
/// Implementations must be Send + Sync for async operation.
pub trait Database: DatabaseCore + DatabaseSchema + DatabaseTransaction {}

impl<T> Database for T where T: DatabaseCore + DatabaseSchema + DatabaseTransaction {}
