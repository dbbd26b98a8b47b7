//! Migrate command implementation - rolls the schema to a target unit

use anyhow::{Context, Result};
use tm_migrate::{Direction, Target};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{format_position, load_project};

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    // Both targets at once is rejected before any connection is opened.
    let target = Target::from_args(args.number, args.target_version.as_deref())?;

    let project = load_project(global)?;
    let migrator = project.migrator()?;
    let db = project.connect()?;

    if args.dry_run {
        let plan = migrator
            .plan(db.as_ref(), &target)
            .await
            .context("Failed to plan migration")?;
        if plan.is_noop() {
            println!(
                "Nothing to do: already at {}",
                format_position(plan.current)
            );
            return Ok(());
        }
        let verb = match plan.direction {
            Some(Direction::Backward) => "revert",
            _ => "apply",
        };
        println!(
            "Dry run - would {} {} unit(s) ({} -> {}):",
            verb,
            plan.steps.len(),
            format_position(plan.current),
            plan.target
        );
        for step in &plan.steps {
            println!("  {}", step.id);
        }
        return Ok(());
    }

    let report = migrator
        .migrate_to(db.as_ref(), &target)
        .await
        .context("Migration failed")?;

    match report.direction {
        None => println!(
            "Nothing to do: already at {}",
            format_position(report.from)
        ),
        Some(direction) => {
            let sign = match direction {
                Direction::Forward => ">",
                Direction::Backward => "<",
            };
            for unit in &report.units {
                println!("  {} {}", sign, unit);
            }
            println!(
                "Migrated {} from {} to {} ({} unit(s))",
                direction,
                format_position(report.from),
                format_position(report.to),
                report.units.len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
