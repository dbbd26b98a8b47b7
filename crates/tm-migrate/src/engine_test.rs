use super::*;
use std::fs;
use tempfile::TempDir;
use tm_db::{DatabaseSchema, DuckDbBackend};

fn write_unit(dir: &Path, identifier: &str, table: &str) {
    let content = format!(
        "kind: migration\nforward:\n  - CREATE TABLE {table} (id INT)\nbackward:\n  - DROP TABLE {table}\n"
    );
    fs::write(dir.join(identifier), content).unwrap();
}

fn record(id: i64, migration: &str) -> HistoryRecord {
    HistoryRecord {
        id,
        migration: migration.to_string(),
        applied_at: Utc::now(),
    }
}

fn three_units() -> (TempDir, UnitDirectory) {
    let temp = TempDir::new().unwrap();
    write_unit(temp.path(), "001_v1.yml", "t1");
    write_unit(temp.path(), "002_v2.yml", "t2");
    write_unit(temp.path(), "003_v3.yml", "t3");
    let dir = UnitDirectory::scan(temp.path(), 3).unwrap();
    (temp, dir)
}

fn identifiers(steps: &[UnitFile]) -> Vec<String> {
    steps.iter().map(|s| s.id.identifier()).collect()
}

#[test]
fn test_target_from_args() {
    assert_eq!(Target::from_args(None, None).unwrap(), Target::Latest);
    assert_eq!(Target::from_args(Some(2), None).unwrap(), Target::Number(2));
    assert_eq!(
        Target::from_args(None, Some("v1")).unwrap(),
        Target::Version("v1".to_string())
    );
    let err = Target::from_args(Some(1), Some("v1")).unwrap_err();
    assert!(matches!(err, MigrateError::AmbiguousTarget { number: 1, .. }));
}

#[test]
fn test_resolve_target() {
    let (_temp, dir) = three_units();
    assert_eq!(resolve_target(&dir, &Target::Latest).unwrap(), 3);
    assert_eq!(resolve_target(&dir, &Target::Number(0)).unwrap(), 0);
    assert_eq!(
        resolve_target(&dir, &Target::Version("v2".to_string())).unwrap(),
        2
    );

    let err = resolve_target(&dir, &Target::Number(5)).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::TargetOutOfRange { target: 5, max: 3 }
    ));

    let err = resolve_target(&dir, &Target::Version("v9".to_string())).unwrap_err();
    assert!(matches!(err, MigrateError::VersionNotFound { .. }));
}

#[test]
fn test_resolve_target_empty_directory() {
    let temp = TempDir::new().unwrap();
    let dir = UnitDirectory::scan(temp.path(), 3).unwrap();
    assert_eq!(resolve_target(&dir, &Target::Latest).unwrap(), 0);
    assert!(matches!(
        resolve_target(&dir, &Target::Number(1)),
        Err(MigrateError::TargetOutOfRange { target: 1, max: 0 })
    ));
}

#[test]
fn test_plan_forward_from_nothing() {
    let (_temp, dir) = three_units();
    let plan = build_plan(&dir, &[], 2).unwrap();
    assert_eq!(plan.current, None);
    assert_eq!(plan.direction, Some(Direction::Forward));
    assert_eq!(identifiers(&plan.steps), vec!["001_v1.yml", "002_v2.yml"]);
}

#[test]
fn test_plan_forward_from_current() {
    let (_temp, dir) = three_units();
    let records = vec![record(1, "001_v1.yml")];
    let plan = build_plan(&dir, &records, 3).unwrap();
    assert_eq!(plan.current, Some(1));
    assert_eq!(identifiers(&plan.steps), vec!["002_v2.yml", "003_v3.yml"]);
}

#[test]
fn test_plan_backward_is_descending() {
    let (_temp, dir) = three_units();
    let records = vec![
        record(1, "001_v1.yml"),
        record(2, "002_v2.yml"),
        record(3, "003_v3.yml"),
    ];
    let plan = build_plan(&dir, &records, 1).unwrap();
    assert_eq!(plan.direction, Some(Direction::Backward));
    assert_eq!(identifiers(&plan.steps), vec!["003_v3.yml", "002_v2.yml"]);

    let plan = build_plan(&dir, &records, 0).unwrap();
    assert_eq!(plan.steps.len(), 3);
}

#[test]
fn test_plan_noop() {
    let (_temp, dir) = three_units();
    let records = vec![record(1, "001_v1.yml"), record(2, "002_v2.yml")];
    let plan = build_plan(&dir, &records, 2).unwrap();
    assert!(plan.is_noop());
    assert_eq!(plan.direction, None);

    let plan = build_plan(&dir, &[], 0).unwrap();
    assert!(plan.is_noop());
}

#[test]
fn test_plan_detects_out_of_order_history() {
    let (_temp, dir) = three_units();
    let records = vec![record(1, "002_v2.yml"), record(2, "001_v1.yml")];
    let err = build_plan(&dir, &records, 3).unwrap_err();
    match err {
        MigrateError::StoreInconsistency {
            most_recent,
            highest,
        } => {
            assert_eq!(most_recent, "001_v1.yml");
            assert_eq!(highest, "002_v2.yml");
        }
        other => panic!("expected StoreInconsistency, got {other:?}"),
    }
}

#[test]
fn test_plan_rejects_repeated_unit_in_history() {
    let (_temp, dir) = three_units();
    let records = vec![
        record(1, "001_v1.yml"),
        record(2, "002_v2.yml"),
        record(3, "002_v2.yml"),
    ];
    let err = build_plan(&dir, &records, 3).unwrap_err();
    assert!(matches!(err, MigrateError::StoreInconsistency { .. }));
}

#[test]
fn test_records_below() {
    let records = vec![record(1, "001_v1.yml"), record(2, "003_v3.yml")];
    assert_eq!(records_below(&records, 3).unwrap(), Some(1));
    assert_eq!(records_below(&records, 1).unwrap(), None);

    let records = vec![record(1, "001_v1.yml"), record(2, "junk")];
    assert!(matches!(
        records_below(&records, 3),
        Err(MigrateError::CorruptHistory { .. })
    ));
}

#[test]
fn test_plan_backward_requires_unit_file() {
    let (_temp, dir) = three_units();
    let records = vec![record(1, "001_v1.yml"), record(2, "002_old.yml")];
    let err = build_plan(&dir, &records, 0).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::UnitNotFound { ref identifier, .. } if identifier == "002_old.yml"
    ));
}

#[test]
fn test_plan_rejects_garbage_history() {
    let (_temp, dir) = three_units();
    let records = vec![record(1, "not-a-unit")];
    let err = build_plan(&dir, &records, 3).unwrap_err();
    assert!(matches!(err, MigrateError::CorruptHistory { .. }));
}

#[tokio::test]
async fn test_migrate_reports_units() {
    let (temp, _dir) = three_units();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(MigrationSettings::new("main", temp.path())).unwrap();

    let report = migrator.migrate(&db, None, None).await.unwrap();
    assert_eq!(report.direction, Some(Direction::Forward));
    assert_eq!(report.from, None);
    assert_eq!(report.to, Some(3));
    assert_eq!(report.units.len(), 3);
    assert!(db.relation_exists("t3").await.unwrap());

    let report = migrator.migrate(&db, Some(1), None).await.unwrap();
    assert_eq!(report.direction, Some(Direction::Backward));
    assert_eq!(report.from, Some(3));
    assert_eq!(report.to, Some(1));
    assert_eq!(report.units, vec!["003_v3.yml", "002_v2.yml"]);
}

#[tokio::test]
async fn test_current_without_history_table() {
    let (temp, _dir) = three_units();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(MigrationSettings::new("main", temp.path())).unwrap();

    assert_eq!(migrator.current_number(&db).await.unwrap(), None);
    assert_eq!(migrator.current_version(&db).await.unwrap(), None);
    assert!(!migrator.history().exists(&db).await.unwrap());
}

#[tokio::test]
async fn test_plan_does_not_touch_database() {
    let (temp, _dir) = three_units();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(MigrationSettings::new("main", temp.path())).unwrap();

    let plan = migrator.plan(&db, &Target::Latest).await.unwrap();
    assert_eq!(plan.steps.len(), 3);
    assert!(!migrator.history().exists(&db).await.unwrap());
    assert!(!db.relation_exists("t1").await.unwrap());
}

#[tokio::test]
async fn test_status() {
    let (temp, _dir) = three_units();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(MigrationSettings::new("main", temp.path())).unwrap();

    let status = migrator.status(&db).await.unwrap();
    assert!(!status.initialized);
    assert!(status.units.iter().all(|u| !u.applied));

    migrator.migrate(&db, Some(2), None).await.unwrap();
    migrator
        .history()
        .append(&db, "009_hotfix.yml")
        .await
        .unwrap();

    let status = migrator.status(&db).await.unwrap();
    assert!(status.initialized);
    assert_eq!(status.current_number, Some(9));
    assert_eq!(status.current_version.as_deref(), Some("hotfix"));
    let applied: Vec<bool> = status.units.iter().map(|u| u.applied).collect();
    assert_eq!(applied, vec![true, true, false]);
    assert!(status.units[0].applied_at.is_some());
    assert_eq!(status.missing.len(), 1);
    assert_eq!(status.missing[0].migration, "009_hotfix.yml");
}

#[test]
fn test_settings_from_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tidemark.yml");
    fs::write(
        &path,
        "name: demo\ntarget_schema: analytics\nnumber_width: 4\ndialect: postgres\n",
    )
    .unwrap();
    let config = Config::load(&path).unwrap();
    let settings = MigrationSettings::from_config(&config, Path::new("/project"), None).unwrap();
    assert_eq!(settings.target_schema, "analytics");
    assert_eq!(settings.migrations_dir, Path::new("/project/migrations"));
    assert_eq!(settings.number_width, 4);
    assert_eq!(settings.dialect, Dialect::Postgres);
}
