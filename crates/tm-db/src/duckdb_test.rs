use super::*;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_execute_batch_and_relation_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);",
    )
    .await
    .unwrap();

    assert!(db.relation_exists("t1").await.unwrap());
    assert!(db.relation_exists("t2").await.unwrap());
    assert!(!db.relation_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_execute_with_params() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE names (name VARCHAR)")
        .await
        .unwrap();

    let inserted = db
        .execute_with_params("INSERT INTO names VALUES (?), (?)", &["a", "o'brien"])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let deleted = db
        .execute_with_params("DELETE FROM names WHERE name = ?", &["o'brien"])
        .await
        .unwrap();
    assert_eq!(deleted, 1);
}

#[tokio::test]
async fn test_query_rows_renders_types() {
    let db = DuckDbBackend::in_memory().unwrap();
    let rows = db
        .query_rows(
            "SELECT 42::BIGINT, 'x', NULL::VARCHAR, true, ? AS p",
            &["param"],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0],
        vec![
            Some("42".to_string()),
            Some("x".to_string()),
            None,
            Some("true".to_string()),
            Some("param".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_query_one() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE users (id INT, name VARCHAR); INSERT INTO users VALUES (1, 'Alice');")
        .await
        .unwrap();

    let name = db
        .query_one("SELECT name FROM users WHERE id = 1")
        .await
        .unwrap();
    assert_eq!(name, Some("Alice".to_string()));

    let missing = db
        .query_one("SELECT name FROM users WHERE id = 2")
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_schema_exists_and_create() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(db.schema_exists("main").await.unwrap());
    assert!(!db.schema_exists("staging").await.unwrap());

    db.create_schema_if_not_exists("staging").await.unwrap();
    assert!(db.schema_exists("staging").await.unwrap());

    db.execute_batch("CREATE TABLE staging.test_table AS SELECT 1 AS id")
        .await
        .unwrap();
    assert!(db.relation_exists("staging.test_table").await.unwrap());

    // Creating the same schema again should not fail (IF NOT EXISTS)
    db.create_schema_if_not_exists("staging").await.unwrap();
}

#[tokio::test]
async fn test_commit_persists_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.begin().await.unwrap();
    db.execute_batch("CREATE TABLE kept (id INT)").await.unwrap();
    db.commit().await.unwrap();
    assert!(db.relation_exists("kept").await.unwrap());
}

#[tokio::test]
async fn test_rollback_discards_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE counts (n INT)").await.unwrap();

    db.begin().await.unwrap();
    db.execute_batch("CREATE TABLE discarded (id INT); INSERT INTO counts VALUES (1);")
        .await
        .unwrap();
    db.rollback().await.unwrap();

    assert!(!db.relation_exists("discarded").await.unwrap());
    let n = db.query_one("SELECT COUNT(*) FROM counts").await.unwrap();
    assert_eq!(n, Some("0".to_string()));
}

#[tokio::test]
async fn test_commit_without_transaction_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.commit().await.unwrap_err();
    assert!(matches!(
        err,
        DbError::TransactionError {
            operation: "COMMIT",
            ..
        }
    ));
}

#[tokio::test]
async fn test_execution_error_mentions_sql() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.execute("SELEC 1").await.unwrap_err();
    assert!(err.to_string().contains("SELEC 1"));
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute_batch("CREATE TABLE persisted (id INT)").await.unwrap();
    }
    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(db.relation_exists("persisted").await.unwrap());
}
