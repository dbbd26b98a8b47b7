use super::*;
use std::path::PathBuf;
use tempfile::tempdir;
use tm_core::{Config, UnitDirectory};

fn global_for(dir: PathBuf) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir,
        config: None,
        target: None,
    }
}

#[tokio::test]
async fn test_init_scaffolds_loadable_project() {
    let temp_dir = tempdir().unwrap();
    let args = InitArgs {
        name: "warehouse".to_string(),
        database_path: "dev.duckdb".to_string(),
    };

    execute(&args, &global_for(temp_dir.path().to_path_buf()))
        .await
        .unwrap();

    let project_dir = temp_dir.path().join("warehouse");
    let config = Config::load_from_dir(&project_dir).unwrap();
    assert_eq!(config.name, "warehouse");
    assert_eq!(config.database.path, "dev.duckdb");
    assert_eq!(config.components.len(), 1);
    assert!(project_dir.join("sql/core_up.sql").exists());

    // .gitkeep is not a unit file
    let dir = UnitDirectory::scan(&config.migrations_path_absolute(&project_dir), 3).unwrap();
    assert!(dir.is_empty());
}

#[tokio::test]
async fn test_init_rejects_bad_names() {
    let temp_dir = tempdir().unwrap();
    for name in ["../escape", ".hidden", "-flag", "a/b"] {
        let args = InitArgs {
            name: name.to_string(),
            database_path: "dev.duckdb".to_string(),
        };
        let result = execute(&args, &global_for(temp_dir.path().to_path_buf())).await;
        assert!(result.is_err(), "name {name} should be rejected");
    }
}

#[tokio::test]
async fn test_init_refuses_existing_directory() {
    let temp_dir = tempdir().unwrap();
    std::fs::create_dir(temp_dir.path().join("taken")).unwrap();
    let args = InitArgs {
        name: "taken".to_string(),
        database_path: "dev.duckdb".to_string(),
    };
    let err = execute(&args, &global_for(temp_dir.path().to_path_buf()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}
