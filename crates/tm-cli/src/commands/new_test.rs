use super::*;
use std::fs;
use tempfile::tempdir;
use tm_core::UnitDescriptor;

const CONFIG: &str = r#"
name: test_project
database:
  type: duckdb
  path: dev.duckdb
components:
  - name: users
    up: ["sql/users_up.sql"]
    down: ["sql/users_down.sql"]
  - name: orders
    up: ["sql/orders_up.sql"]
    down: ["sql/orders_down.sql"]
  - name: disabled
    up: ["sql/nope.sql"]
    enabled: false
"#;

fn write_project(root: &Path) {
    fs::write(root.join("tidemark.yml"), CONFIG).unwrap();
    fs::create_dir_all(root.join("migrations")).unwrap();
    fs::create_dir_all(root.join("sql")).unwrap();
    fs::write(root.join("sql/users_up.sql"), "CREATE TABLE users (id INT);").unwrap();
    fs::write(root.join("sql/users_down.sql"), "DROP TABLE users;").unwrap();
    fs::write(
        root.join("sql/orders_up.sql"),
        "CREATE TABLE orders (id INT);",
    )
    .unwrap();
    fs::write(root.join("sql/orders_down.sql"), "DROP TABLE orders;").unwrap();
}

fn global_for(root: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: root.to_path_buf(),
        config: None,
        target: None,
    }
}

#[test]
fn test_component_fragment_order() {
    let temp_dir = tempdir().unwrap();
    write_project(temp_dir.path());
    let config = Config::load_from_dir(temp_dir.path()).unwrap();

    let (up, down) = component_fragments(&config, temp_dir.path());
    assert_eq!(
        up,
        vec![
            temp_dir.path().join("sql/users_up.sql"),
            temp_dir.path().join("sql/orders_up.sql"),
        ]
    );
    assert_eq!(
        down,
        vec![
            temp_dir.path().join("sql/orders_down.sql"),
            temp_dir.path().join("sql/users_down.sql"),
        ]
    );
}

#[tokio::test]
async fn test_new_from_components() {
    let temp_dir = tempdir().unwrap();
    write_project(temp_dir.path());

    let args = NewArgs {
        label: "v1".to_string(),
        up: vec![],
        down: vec![],
    };
    execute(&args, &global_for(temp_dir.path())).await.unwrap();

    let unit =
        UnitDescriptor::load(&temp_dir.path().join("migrations/001_v1.yml")).unwrap();
    assert_eq!(
        unit.forward,
        vec!["CREATE TABLE users (id INT)", "CREATE TABLE orders (id INT)"]
    );
    assert_eq!(unit.backward, vec!["DROP TABLE orders", "DROP TABLE users"]);
}

#[tokio::test]
async fn test_new_with_explicit_files_numbers_sequentially() {
    let temp_dir = tempdir().unwrap();
    write_project(temp_dir.path());
    let global = global_for(temp_dir.path());

    for label in ["v1", "v2"] {
        let args = NewArgs {
            label: label.to_string(),
            up: vec![temp_dir.path().join("sql/users_up.sql")],
            down: vec![temp_dir.path().join("sql/users_down.sql")],
        };
        execute(&args, &global).await.unwrap();
    }

    assert!(temp_dir.path().join("migrations/001_v1.yml").exists());
    let second =
        UnitDescriptor::load(&temp_dir.path().join("migrations/002_v2.yml")).unwrap();
    assert_eq!(second.forward, vec!["CREATE TABLE users (id INT)"]);
}
