//! Error types for the migration engine.

use crate::engine::Direction;
use thiserror::Error;
use tm_core::CoreError;
use tm_db::DbError;
use tm_sql::SqlError;

/// Migration errors.
///
/// Every variant aborts the current call. Units committed before the failure
/// stay committed, so the history table always matches what actually ran.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Both a number and a version were requested (M001).
    #[error("[M001] Ambiguous target: got both number {number} and version '{version}'")]
    AmbiguousTarget { number: u32, version: String },

    /// No unit carries the requested version label (M002).
    #[error("[M002] Version '{version}' not found in {dir}")]
    VersionNotFound { version: String, dir: String },

    /// Requested number is above the highest unit on disk (M003).
    #[error("[M003] Target {target} is larger than the highest available unit ({max})")]
    TargetOutOfRange { target: u32, max: u32 },

    /// The target schema does not exist, so history cannot be created (M004).
    #[error("[M004] Schema '{schema}' does not exist")]
    SchemaNotFound { schema: String },

    /// Reading, inspecting or creating the history table failed (M005).
    #[error("[M005] Failed to {operation} migration history in '{schema}'")]
    StoreAccess {
        operation: &'static str,
        schema: String,
        #[source]
        source: DbError,
    },

    /// Appending or removing a history record failed (M006).
    #[error("[M006] Failed to {operation} history record for {identifier}")]
    StoreWrite {
        operation: &'static str,
        identifier: String,
        #[source]
        source: DbError,
    },

    /// History order disagrees with unit order (M007).
    #[error(
        "[M007] Migration history is inconsistent: '{most_recent}' was recorded after '{highest}'"
    )]
    StoreInconsistency {
        most_recent: String,
        highest: String,
    },

    /// A history record names something that is not a unit identifier (M008).
    #[error("[M008] Migration history holds unreadable identifier '{identifier}'")]
    CorruptHistory {
        identifier: String,
        #[source]
        source: CoreError,
    },

    /// Unit file could not be read or parsed (M009).
    #[error("[M009] Failed to load unit {path}")]
    UnitLoad {
        path: String,
        #[source]
        source: CoreError,
    },

    /// A forward or backward statement failed (M010).
    #[error("[M010] {direction} action {statement} of {identifier} failed")]
    UnitExecution {
        identifier: String,
        direction: Direction,
        statement: usize,
        #[source]
        source: DbError,
    },

    /// Transaction control around a unit failed (M011).
    #[error("[M011] Transaction for {identifier} failed")]
    Transaction {
        identifier: String,
        #[source]
        source: DbError,
    },

    /// A unit that has to be reverted has no file on disk (M012).
    #[error("[M012] Unit {identifier} is recorded as applied but has no file in {dir}")]
    UnitNotFound { identifier: String, dir: String },

    /// Synthesis would overwrite an existing unit file (M013).
    #[error("[M013] Unit file already exists: {path}")]
    UnitAlreadyExists { path: String },

    /// Fragment file could not be split into statements (M014).
    #[error("[M014] Failed to split {path}")]
    Split {
        path: String,
        #[source]
        source: SqlError,
    },

    /// Core error (config, naming, directory scan) (M015).
    #[error("[M015] {0}")]
    Core(#[from] CoreError),

    /// IO error with the offending path (M016).
    #[error("[M016] IO error at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Schema name is not a plain identifier and cannot be spliced into SQL (M017).
    #[error("[M017] Invalid schema name '{schema}': use letters, digits and '_' only")]
    InvalidSchemaName { schema: String },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
