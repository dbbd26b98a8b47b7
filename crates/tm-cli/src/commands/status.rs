//! Status command implementation - lists units and their applied state

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{format_position, load_project, print_table};
use tm_migrate::MigrationStatus;

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = project.migrator()?;
    let db = project.connect()?;

    let status = migrator
        .status(db.as_ref())
        .await
        .context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Json => {
            let json =
                serde_json::to_string_pretty(&status).context("Failed to serialize to JSON")?;
            println!("{}", json);
        }
        StatusOutput::Table => print_status_table(&status),
    }
    Ok(())
}

fn print_status_table(status: &MigrationStatus) {
    if !status.initialized {
        println!(
            "History table not found in schema '{}'; run `tm setup` or `tm migrate`.",
            status.schema
        );
        println!();
    }

    let rows = status_rows(status);
    if rows.is_empty() {
        println!("No migration units found.");
    } else {
        print_table(&["NUMBER", "VERSION", "STATUS", "APPLIED AT"], &rows);
    }

    for record in &status.missing {
        println!(
            "warning: {} is recorded as applied but has no unit file",
            record.migration
        );
    }

    println!();
    println!(
        "Current: {}{}",
        format_position(status.current_number),
        status
            .current_version
            .as_deref()
            .map(|v| format!(" ({})", v))
            .unwrap_or_default()
    );
}

pub(crate) fn status_rows(status: &MigrationStatus) -> Vec<Vec<String>> {
    status
        .units
        .iter()
        .map(|unit| {
            vec![
                unit.number.to_string(),
                unit.version.clone(),
                if unit.applied { "applied" } else { "pending" }.to_string(),
                unit.applied_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
