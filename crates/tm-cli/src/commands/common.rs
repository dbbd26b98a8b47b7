//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tm_core::Config;
use tm_db::Database;
use tm_migrate::{MigrationSettings, Migrator};

use crate::cli::GlobalArgs;

/// A loaded project: its root, config, and resolved target name.
pub(crate) struct ProjectContext {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
    pub(crate) target: Option<String>,
}

impl ProjectContext {
    /// Open the configured database.
    ///
    /// Relative file paths are resolved against the project root.
    pub(crate) fn connect(&self) -> Result<Arc<dyn Database>> {
        let mut db_config = self
            .config
            .get_database_config(self.target.as_deref())
            .context("Failed to get database configuration")?;
        if db_config.path != ":memory:" && Path::new(&db_config.path).is_relative() {
            db_config.path = self.root.join(&db_config.path).display().to_string();
        }
        tm_db::connect(&db_config).context("Failed to connect to database")
    }

    /// Build the migration engine for the configured schema and directory.
    pub(crate) fn migrator(&self) -> Result<Migrator> {
        let settings =
            MigrationSettings::from_config(&self.config, &self.root, self.target.as_deref())
                .context("Failed to resolve migration settings")?;
        Migrator::new(settings).context("Invalid migration settings")
    }
}

/// Load the project named by the global CLI arguments.
///
/// `--config` overrides the default `tidemark.yml` lookup in the project
/// directory; `--target` falls back to `TM_TARGET`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = global.project_dir.clone();
    let config = match &global.config {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;
    let target = Config::resolve_target(global.target.as_deref());
    Ok(ProjectContext {
        root,
        config,
        target,
    })
}

/// Render an optional unit number for display.
pub(crate) fn format_position(number: Option<u32>) -> String {
    match number {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}
