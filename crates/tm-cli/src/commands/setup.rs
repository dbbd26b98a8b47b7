//! Setup command implementation - bootstraps the migration history table

use anyhow::{Context, Result};
use tm_db::DatabaseSchema;

use crate::cli::{GlobalArgs, SetupArgs};
use crate::commands::common::load_project;

/// Execute the setup command
pub(crate) async fn execute(args: &SetupArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.connect()?;
    let migrator = project.migrator()?;
    let schema = migrator.settings().target_schema.as_str();

    if args.create_schema {
        db.create_schema_if_not_exists(schema)
            .await
            .with_context(|| format!("Failed to create schema '{}'", schema))?;
    }

    let created = migrator
        .bootstrap(db.as_ref())
        .await
        .context("Failed to set up migration history")?;

    if created {
        println!("Created {}", migrator.history().table());
    } else {
        println!("{} already exists", migrator.history().table());
    }
    Ok(())
}
