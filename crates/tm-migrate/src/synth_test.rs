use super::*;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_collect_statements_preserves_order() {
    let temp = TempDir::new().unwrap();
    let a = write(&temp, "a.sql", "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);");
    let b = write(&temp, "b.sql", "-- header\n\nINSERT INTO a VALUES (1);\n\n;\n");

    let splitter = StatementSplitter::duckdb();
    let stmts = collect_statements(&splitter, &[b.clone(), a.clone()]).unwrap();
    assert_eq!(
        stmts,
        vec![
            "-- header\n\nINSERT INTO a VALUES (1)",
            "CREATE TABLE a (id INT)",
            "CREATE TABLE b (id INT)",
        ]
    );
}

#[test]
fn test_collect_statements_missing_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.sql");
    let err = collect_statements(&StatementSplitter::duckdb(), &[missing]).unwrap_err();
    assert!(matches!(err, MigrateError::Io { .. }));
}

#[test]
fn test_build_unit_prologue_and_blocks() {
    let temp = TempDir::new().unwrap();
    let up = write(&temp, "up.sql", "CREATE TABLE t (id INT);");
    let down = write(&temp, "down.sql", "DROP TABLE t;");
    let id = UnitId::encode(4, "v1.2", 3).unwrap();

    let (descriptor, prologue) =
        build_unit(&StatementSplitter::duckdb(), &id, &[up], &[down]).unwrap();
    assert_eq!(descriptor.forward, vec!["CREATE TABLE t (id INT)"]);
    assert_eq!(descriptor.backward, vec!["DROP TABLE t"]);
    assert!(prologue[0].starts_with("004_v1.2.yml generated by tidemark"));
    assert!(prologue[1].ends_with("up.sql"));
    assert!(prologue[2].ends_with("down.sql"));
}

#[test]
fn test_build_unit_with_no_fragments() {
    let id = UnitId::encode(1, "empty", 3).unwrap();
    let (descriptor, prologue) = build_unit(&StatementSplitter::duckdb(), &id, &[], &[]).unwrap();
    assert!(descriptor.forward.is_empty());
    assert!(descriptor.backward.is_empty());
    assert_eq!(prologue[1], "forward: (none)");
}

#[test]
fn test_write_unit_refuses_overwrite() {
    let temp = TempDir::new().unwrap();
    let id = UnitId::encode(1, "v1", 3).unwrap();
    let descriptor = UnitDescriptor::new(vec!["SELECT 1".to_string()], vec![]);

    let path = write_unit(temp.path(), &id, &descriptor, &[]).unwrap();
    assert_eq!(path, temp.path().join("001_v1.yml"));
    let parsed = UnitDescriptor::load(&path).unwrap();
    assert_eq!(parsed.forward, vec!["SELECT 1".to_string()]);

    let err = write_unit(temp.path(), &id, &descriptor, &[]).unwrap_err();
    assert!(matches!(err, MigrateError::UnitAlreadyExists { .. }));
}
