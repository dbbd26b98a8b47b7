//! Migration engine.
//!
//! Works out the current position from the history table, resolves a target
//! position, and applies the units in between one at a time. Each unit's
//! actions and its history mutation share one transaction, so after any
//! failure the history table lists exactly the units that actually ran.
//!
//! The connection is passed into every call; the engine holds none.

use crate::error::{MigrateError, MigrateResult};
use crate::history::{HistoryRecord, HistoryStore};
use crate::loader::{MigrationUnit, UnitLoader};
use crate::synth;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tm_core::{Config, CoreResult, Dialect, UnitDirectory, UnitFile, UnitId, VersionLabel};
use tm_db::{Database, DatabaseTransaction, DbError};
use tm_sql::StatementSplitter;

/// Which way a unit is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Requested end position of a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Highest unit in the directory
    Latest,
    /// A unit number; 0 means "nothing applied"
    Number(u32),
    /// Highest unit carrying this version label
    Version(String),
}

impl Target {
    /// Build a target from optional CLI-style arguments.
    ///
    /// Giving both is [`MigrateError::AmbiguousTarget`].
    pub fn from_args(number: Option<u32>, version: Option<&str>) -> MigrateResult<Self> {
        match (number, version) {
            (Some(number), Some(version)) => Err(MigrateError::AmbiguousTarget {
                number,
                version: version.to_string(),
            }),
            (Some(number), None) => Ok(Target::Number(number)),
            (None, Some(version)) => Ok(Target::Version(version.to_string())),
            (None, None) => Ok(Target::Latest),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Latest => write!(f, "latest"),
            Target::Number(n) => write!(f, "number {}", n),
            Target::Version(v) => write!(f, "version '{}'", v),
        }
    }
}

/// Settings the engine needs, independent of how they were loaded.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    /// Schema holding the history table
    pub target_schema: String,
    /// Directory of unit files
    pub migrations_dir: PathBuf,
    /// Digits in the numeric prefix of unit identifiers
    pub number_width: usize,
    /// Dialect used to split fragment files
    pub dialect: Dialect,
}

impl MigrationSettings {
    pub fn new(target_schema: impl Into<String>, migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_schema: target_schema.into(),
            migrations_dir: migrations_dir.into(),
            number_width: tm_core::DEFAULT_NUMBER_WIDTH,
            dialect: Dialect::default(),
        }
    }

    /// Derive settings from a loaded project config.
    pub fn from_config(
        config: &Config,
        project_root: &Path,
        target: Option<&str>,
    ) -> CoreResult<Self> {
        Ok(Self {
            target_schema: config.get_target_schema(target)?.to_string(),
            migrations_dir: config.migrations_path_absolute(project_root),
            number_width: config.number_width,
            dialect: config.dialect,
        })
    }
}

/// Units selected to move from `current` to `target`.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    /// Position before the run
    pub current: Option<u32>,
    /// Resolved target number
    pub target: u32,
    /// `None` when there is nothing to do
    pub direction: Option<Direction>,
    /// Units in execution order
    pub steps: Vec<UnitFile>,
}

impl MigrationPlan {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Result of a completed `migrate` call.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub direction: Option<Direction>,
    pub from: Option<u32>,
    pub to: Option<u32>,
    /// Identifiers applied or reverted, in order
    pub units: Vec<String>,
}

/// State of one unit in `status`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitStatus {
    pub number: u32,
    pub version: String,
    pub identifier: String,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Everything `tm status` shows.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub schema: String,
    pub initialized: bool,
    pub current_number: Option<u32>,
    pub current_version: Option<String>,
    pub units: Vec<UnitStatus>,
    /// History records with no matching unit file
    pub missing: Vec<HistoryRecord>,
}

/// Migration engine for one target schema and unit directory.
pub struct Migrator {
    settings: MigrationSettings,
    store: HistoryStore,
    splitter: StatementSplitter,
}

impl Migrator {
    /// Fails with [`MigrateError::InvalidSchemaName`] if the target schema is
    /// not a plain identifier.
    pub fn new(settings: MigrationSettings) -> MigrateResult<Self> {
        let splitter = match settings.dialect {
            Dialect::DuckDb => StatementSplitter::duckdb(),
            Dialect::Postgres => StatementSplitter::postgres(),
            Dialect::Generic => StatementSplitter::generic(),
        };
        let store = HistoryStore::new(settings.target_schema.clone())?;
        Ok(Self {
            settings,
            store,
            splitter,
        })
    }

    pub fn settings(&self) -> &MigrationSettings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.store
    }

    /// Scan the unit directory.
    pub fn scan(&self) -> MigrateResult<UnitDirectory> {
        Ok(UnitDirectory::scan(
            &self.settings.migrations_dir,
            self.settings.number_width,
        )?)
    }

    /// Create the history table if needed.
    pub async fn bootstrap(&self, db: &dyn Database) -> MigrateResult<bool> {
        self.store.bootstrap(db).await
    }

    /// Number of the most recently applied unit, if any.
    pub async fn current_number(&self, db: &dyn Database) -> MigrateResult<Option<u32>> {
        Ok(self.current_unit(db).await?.map(|id| id.number()))
    }

    /// Version label of the most recently applied unit, if any.
    pub async fn current_version(
        &self,
        db: &dyn Database,
    ) -> MigrateResult<Option<VersionLabel>> {
        Ok(self.current_unit(db).await?.map(|id| id.label().clone()))
    }

    async fn current_unit(&self, db: &dyn Database) -> MigrateResult<Option<UnitId>> {
        if !self.store.exists(db).await? {
            return Ok(None);
        }
        self.store
            .most_recent(db)
            .await?
            .map(|record| decode_record(&record))
            .transpose()
    }

    /// Resolve `target` and select the units to run, without running them.
    pub async fn plan(&self, db: &dyn Database, target: &Target) -> MigrateResult<MigrationPlan> {
        let dir = self.scan()?;
        let target = resolve_target(&dir, target)?;
        let records = if self.store.exists(db).await? {
            self.store.list(db).await?
        } else {
            Vec::new()
        };
        build_plan(&dir, &records, target)
    }

    /// Roll to `number` or `version`, or to the latest unit when neither is
    /// given.
    pub async fn migrate(
        &self,
        db: &dyn Database,
        number: Option<u32>,
        version: Option<&str>,
    ) -> MigrateResult<MigrationReport> {
        let target = Target::from_args(number, version)?;
        self.migrate_to(db, &target).await
    }

    /// Roll to an already-built [`Target`].
    pub async fn migrate_to(
        &self,
        db: &dyn Database,
        target: &Target,
    ) -> MigrateResult<MigrationReport> {
        let dir = self.scan()?;
        let resolved = resolve_target(&dir, target)?;

        self.store.bootstrap(db).await?;
        let records = self.store.list(db).await?;
        let plan = build_plan(&dir, &records, resolved)?;

        let mut report = MigrationReport {
            direction: plan.direction,
            from: plan.current,
            to: plan.current,
            units: Vec::new(),
        };
        let Some(direction) = plan.direction else {
            log::info!(
                "Nothing to migrate: already at {}",
                describe_position(plan.current)
            );
            return Ok(report);
        };

        log::info!(
            "Migrating {} from {} to {} ({} unit(s))",
            direction,
            describe_position(plan.current),
            plan.target,
            plan.steps.len()
        );

        let mut loader = UnitLoader::new();
        for step in &plan.steps {
            let unit = loader.load(step)?;
            let identifier = step.id.identifier();
            log::info!("> {} {}", direction, identifier);

            self.apply_unit(db, unit.as_ref(), direction).await?;

            report.units.push(identifier);
            report.to = match direction {
                Direction::Forward => Some(step.id.number()),
                Direction::Backward => records_below(&records, step.id.number())?,
            };
        }

        Ok(report)
    }

    /// Run one unit and its history mutation in a single transaction.
    async fn apply_unit(
        &self,
        db: &dyn Database,
        unit: &dyn MigrationUnit,
        direction: Direction,
    ) -> MigrateResult<()> {
        let identifier = unit.id().identifier();
        let tx_error = |source: DbError| MigrateError::Transaction {
            identifier: identifier.clone(),
            source,
        };

        db.begin().await.map_err(tx_error)?;

        let result = async {
            unit.run(db, direction).await?;
            match direction {
                Direction::Forward => self.store.append(db, &identifier).await,
                Direction::Backward => self.store.remove(db, &identifier).await.map(|_| ()),
            }
        }
        .await;

        match result {
            Ok(()) => {
                if let Err(commit_err) = db.commit().await {
                    if let Err(rollback_err) = db.rollback().await {
                        log::warn!("Rollback of {} failed: {}", identifier, rollback_err);
                    }
                    return Err(tx_error(commit_err));
                }
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = db.rollback().await {
                    log::warn!("Rollback of {} failed: {}", identifier, rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Write a new unit built from fragment files; does not apply it.
    pub async fn synthesize(
        &self,
        db: &dyn Database,
        name: &str,
        up_files: &[PathBuf],
        down_files: &[PathBuf],
    ) -> MigrateResult<UnitId> {
        self.store.bootstrap(db).await?;

        let dir = self.scan()?;
        let id = UnitId::encode(dir.next_number(), name, self.settings.number_width)?;
        let (descriptor, prologue) = synth::build_unit(&self.splitter, &id, up_files, down_files)?;
        synth::write_unit(dir.root(), &id, &descriptor, &prologue)?;
        Ok(id)
    }

    /// Per-unit applied state, plus history records with no file.
    pub async fn status(&self, db: &dyn Database) -> MigrateResult<MigrationStatus> {
        let dir = self.scan()?;
        let initialized = self.store.exists(db).await?;
        let records = if initialized {
            self.store.list(db).await?
        } else {
            Vec::new()
        };

        let applied: HashMap<&str, &HistoryRecord> = records
            .iter()
            .map(|r| (r.migration.as_str(), r))
            .collect();

        let mut units = Vec::with_capacity(dir.units().len());
        for file in dir.units() {
            let identifier = file.id.identifier();
            let record = applied.get(identifier.as_str());
            units.push(UnitStatus {
                number: file.id.number(),
                version: file.id.label().to_string(),
                applied: record.is_some(),
                applied_at: record.map(|r| r.applied_at),
                identifier,
            });
        }

        let known: Vec<String> = dir.units().iter().map(|u| u.id.identifier()).collect();
        let missing = records
            .iter()
            .filter(|r| !known.contains(&r.migration))
            .cloned()
            .collect();

        let current = match records.last() {
            Some(record) => Some(decode_record(record)?),
            None => None,
        };

        Ok(MigrationStatus {
            schema: self.settings.target_schema.clone(),
            initialized,
            current_number: current.as_ref().map(UnitId::number),
            current_version: current.as_ref().map(|id| id.label().to_string()),
            units,
            missing,
        })
    }
}

fn decode_record(record: &HistoryRecord) -> MigrateResult<UnitId> {
    UnitId::decode(&record.migration).map_err(|source| MigrateError::CorruptHistory {
        identifier: record.migration.clone(),
        source,
    })
}

fn describe_position(position: Option<u32>) -> String {
    match position {
        Some(n) => format!("unit {}", n),
        None => "nothing applied".to_string(),
    }
}

/// Highest applied number strictly below `number`, after `number` is reverted.
fn records_below(records: &[HistoryRecord], number: u32) -> MigrateResult<Option<u32>> {
    let mut below = None;
    for record in records {
        let n = decode_record(record)?.number();
        if n < number {
            below = below.max(Some(n));
        }
    }
    Ok(below)
}

/// Turn a [`Target`] into a unit number checked against the directory.
fn resolve_target(dir: &UnitDirectory, target: &Target) -> MigrateResult<u32> {
    let max = dir.max_number().unwrap_or(0);
    let number = match target {
        Target::Latest => max,
        Target::Number(n) => *n,
        Target::Version(version) => {
            dir.number_for_version(version)
                .ok_or_else(|| MigrateError::VersionNotFound {
                    version: version.clone(),
                    dir: dir.root().display().to_string(),
                })?
        }
    };
    if number > max {
        return Err(MigrateError::TargetOutOfRange {
            target: number,
            max,
        });
    }
    Ok(number)
}

/// Check that history insertion order matches unit number order, and return
/// the most recently applied unit.
///
/// Numbers must strictly increase with record id. The first pair that breaks
/// this is reported as [`MigrateError::StoreInconsistency`].
fn check_consistency(records: &[HistoryRecord]) -> MigrateResult<Option<UnitId>> {
    let mut previous: Option<(UnitId, &HistoryRecord)> = None;
    for record in records {
        let id = decode_record(record)?;
        if let Some((prev_id, prev_record)) = &previous {
            if id.number() <= prev_id.number() {
                return Err(MigrateError::StoreInconsistency {
                    most_recent: record.migration.clone(),
                    highest: prev_record.migration.clone(),
                });
            }
        }
        previous = Some((id, record));
    }
    Ok(previous.map(|(id, _)| id))
}

fn build_plan(
    dir: &UnitDirectory,
    records: &[HistoryRecord],
    target: u32,
) -> MigrateResult<MigrationPlan> {
    let current = check_consistency(records)?.map(|id| id.number());

    let (direction, steps) = match current {
        Some(c) if target < c => (Direction::Backward, backward_steps(dir, records, target, c)?),
        _ => {
            let pending = |n: u32| current.map_or(true, |c| n > c) && n <= target;
            let steps: Vec<UnitFile> = dir
                .units()
                .iter()
                .filter(|u| pending(u.id.number()))
                .cloned()
                .collect();
            (Direction::Forward, steps)
        }
    };

    Ok(MigrationPlan {
        current,
        target,
        direction: if steps.is_empty() { None } else { Some(direction) },
        steps,
    })
}

/// Applied units in `(target, current]`, newest first, each resolved to its
/// file by exact identifier.
fn backward_steps(
    dir: &UnitDirectory,
    records: &[HistoryRecord],
    target: u32,
    current: u32,
) -> MigrateResult<Vec<UnitFile>> {
    let mut applied: Vec<(UnitId, &str)> = Vec::new();
    for record in records {
        let id = decode_record(record)?;
        if id.number() > target && id.number() <= current {
            applied.push((id, record.migration.as_str()));
        }
    }
    applied.sort_by(|a, b| b.0.number().cmp(&a.0.number()));
    applied.dedup_by(|a, b| a.1 == b.1);

    applied
        .into_iter()
        .map(|(id, identifier)| {
            dir.get(id.number())
                .filter(|file| file.id.identifier() == identifier)
                .cloned()
                .ok_or_else(|| MigrateError::UnitNotFound {
                    identifier: identifier.to_string(),
                    dir: dir.root().display().to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
