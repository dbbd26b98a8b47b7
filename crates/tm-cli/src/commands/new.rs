//! New command implementation - synthesizes a unit from SQL fragments

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tm_core::Config;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_project;

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;

    let (up, down) = if args.up.is_empty() && args.down.is_empty() {
        let (up, down) = component_fragments(&project.config, &project.root);
        if up.is_empty() && down.is_empty() {
            log::warn!("No fragment files or components configured; the unit will be empty");
        }
        (up, down)
    } else {
        (args.up.clone(), args.down.clone())
    };

    let migrator = project.migrator()?;
    let db = project.connect()?;
    let id = migrator
        .synthesize(db.as_ref(), &args.label, &up, &down)
        .await
        .with_context(|| format!("Failed to create unit '{}'", args.label))?;

    println!(
        "Created {}",
        migrator.settings().migrations_dir.join(id.identifier()).display()
    );
    println!(
        "  {} forward fragment(s), {} backward fragment(s)",
        up.len(),
        down.len()
    );
    Ok(())
}

/// Fragment files from the enabled components: up files in component order,
/// down files in reverse component order.
pub(crate) fn component_fragments(config: &Config, root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let components: Vec<_> = config.enabled_components().collect();
    let up = components
        .iter()
        .flat_map(|c| c.up.iter().map(move |f| root.join(f)))
        .collect();
    let down = components
        .iter()
        .rev()
        .flat_map(|c| c.down.iter().map(move |f| root.join(f)))
        .collect();
    (up, down)
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
