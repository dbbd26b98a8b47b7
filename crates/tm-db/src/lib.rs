//! tm-db - Database abstraction layer for Tidemark
//!
//! This crate provides the `Database` trait family used by the migration
//! engine and history store, a DuckDB implementation, and [`connect`] to pick
//! a backend from configuration.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, DatabaseCore, DatabaseSchema, DatabaseTransaction, Row};

use std::sync::Arc;
use tm_core::{DatabaseConfig, DbType};

/// Open a connection for the configured database type.
pub fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    log::debug!("Connecting to {} database at {}", config.db_type, config.path);
    match config.db_type {
        DbType::DuckDb => Ok(Arc::new(DuckDbBackend::new(&config.path)?)),
    }
}
