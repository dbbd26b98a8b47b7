//! Init command implementation - scaffolds a new Tidemark project

use anyhow::{Context, Result};
use std::fs;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = global.project_dir.join(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            project_dir.display()
        );
    }

    println!("Creating new Tidemark project: {}\n", args.name);

    for dir in ["", "migrations", "sql"] {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

target_schema: main
migrations_path: migrations
number_width: 3
dialect: duckdb

database:
  type: duckdb
  path: "{db_path}"

# Fragments used by `tm new <label>` when no --up/--down files are given.
# Up files run in component order, down files in reverse component order.
components:
  - name: core
    up: ["sql/core_up.sql"]
    down: ["sql/core_down.sql"]
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("tidemark.yml"), config_content)
        .context("Failed to write tidemark.yml")?;

    let core_up = r#"-- Forward changes for the core component
CREATE TABLE IF NOT EXISTS example (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL
);
"#;
    fs::write(project_dir.join("sql/core_up.sql"), core_up)
        .context("Failed to write sql/core_up.sql")?;

    let core_down = "-- Backward changes for the core component\nDROP TABLE IF EXISTS example;\n";
    fs::write(project_dir.join("sql/core_down.sql"), core_down)
        .context("Failed to write sql/core_down.sql")?;

    fs::write(project_dir.join("migrations/.gitkeep"), "")
        .context("Failed to write migrations/.gitkeep")?;

    println!("  Created tidemark.yml");
    println!("  Created migrations/");
    println!("  Created sql/core_up.sql");
    println!("  Created sql/core_down.sql");
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  tm setup");
    println!("  tm new v1");
    println!("  tm migrate");

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
