//! Unit loading.
//!
//! Unit files are parsed into [`ScriptUnit`] values, plain lists of
//! statements, before the engine runs anything. The loader caches parsed
//! units under a SHA-256 key of their path.

use crate::engine::Direction;
use crate::error::{MigrateError, MigrateResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tm_core::{compute_checksum, UnitDescriptor, UnitFile, UnitId};
use tm_db::{Database, DatabaseCore};

/// An executable migration unit.
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    /// Identity of the unit
    fn id(&self) -> &UnitId;

    /// Roll the schema forward by this unit
    async fn forward(&self, db: &dyn Database) -> MigrateResult<()>;

    /// Undo this unit
    async fn backward(&self, db: &dyn Database) -> MigrateResult<()>;

    /// Run the actions for `direction`
    async fn run(&self, db: &dyn Database, direction: Direction) -> MigrateResult<()> {
        match direction {
            Direction::Forward => self.forward(db).await,
            Direction::Backward => self.backward(db).await,
        }
    }
}

/// A unit backed by a YAML descriptor.
#[derive(Debug, Clone)]
pub struct ScriptUnit {
    id: UnitId,
    descriptor: UnitDescriptor,
}

impl ScriptUnit {
    pub fn new(id: UnitId, descriptor: UnitDescriptor) -> Self {
        Self { id, descriptor }
    }

    pub fn description(&self) -> Option<&str> {
        self.descriptor.description.as_deref()
    }

    /// Statements for one direction, in execution order.
    pub fn actions(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Forward => &self.descriptor.forward,
            Direction::Backward => &self.descriptor.backward,
        }
    }

    async fn execute(&self, db: &dyn Database, direction: Direction) -> MigrateResult<()> {
        let identifier = self.id.identifier();
        for (idx, statement) in self.actions(direction).iter().enumerate() {
            log::debug!("{} {} [{}]: {}", direction, identifier, idx + 1, statement);
            db.execute_batch(statement)
                .await
                .map_err(|source| MigrateError::UnitExecution {
                    identifier: identifier.clone(),
                    direction,
                    statement: idx + 1,
                    source,
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl MigrationUnit for ScriptUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    async fn forward(&self, db: &dyn Database) -> MigrateResult<()> {
        self.execute(db, Direction::Forward).await
    }

    async fn backward(&self, db: &dyn Database) -> MigrateResult<()> {
        self.execute(db, Direction::Backward).await
    }
}

/// Parses unit files, caching by path.
#[derive(Debug, Default)]
pub struct UnitLoader {
    cache: HashMap<String, Arc<ScriptUnit>>,
}

impl UnitLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `file`, reusing an earlier parse of the same path.
    pub fn load(&mut self, file: &UnitFile) -> MigrateResult<Arc<dyn MigrationUnit>> {
        let key = compute_checksum(&file.path.to_string_lossy());
        if let Some(unit) = self.cache.get(&key) {
            let unit: Arc<dyn MigrationUnit> = unit.clone();
            return Ok(unit);
        }

        log::debug!("Loading unit {}", file.path.display());
        let descriptor =
            UnitDescriptor::load(&file.path).map_err(|source| MigrateError::UnitLoad {
                path: file.path.display().to_string(),
                source,
            })?;
        let unit = Arc::new(ScriptUnit::new(file.id.clone(), descriptor));
        self.cache.insert(key, unit.clone());
        let unit: Arc<dyn MigrationUnit> = unit;
        Ok(unit)
    }

    /// Number of cached units.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
