//! Migration engine for Tidemark.
//!
//! Tracks applied units in a history table inside the target schema, rolls
//! the schema forward or backward one unit per transaction, and synthesizes
//! new units from per-component SQL fragment files.

pub mod engine;
pub mod error;
pub mod history;
pub mod loader;
pub mod synth;

pub use engine::{
    Direction, MigrationPlan, MigrationReport, MigrationSettings, MigrationStatus, Migrator,
    Target, UnitStatus,
};
pub use error::{MigrateError, MigrateResult};
pub use history::{HistoryRecord, HistoryStore, HISTORY_TABLE};
pub use loader::{MigrationUnit, ScriptUnit, UnitLoader};
