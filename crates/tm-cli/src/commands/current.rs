//! Current command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::load_project;

/// Execute the current command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = project.migrator()?;
    let db = project.connect()?;

    let number = migrator
        .current_number(db.as_ref())
        .await
        .context("Failed to read current position")?;
    let version = migrator
        .current_version(db.as_ref())
        .await
        .context("Failed to read current version")?;

    match (number, version) {
        (Some(number), Some(version)) => println!("{} {}", number, version),
        _ => println!("No migrations applied"),
    }
    Ok(())
}
