//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tidemark - ordered, reversible database migrations
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override target (database connection and schema)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Tidemark project
    Init(InitArgs),

    /// Create the migration history table
    Setup(SetupArgs),

    /// Roll forward or backward to a unit number or version
    Migrate(MigrateArgs),

    /// Synthesize a new migration unit from SQL fragment files
    New(NewArgs),

    /// Show every unit and whether it is applied
    Status(StatusArgs),

    /// Print the current unit number and version
    Current,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory created)
    pub name: String,

    /// Path of the DuckDB database file
    #[arg(long, default_value = "tidemark.duckdb")]
    pub database_path: String,
}

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Create the target schema if it does not exist
    #[arg(long)]
    pub create_schema: bool,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Target unit number (0 reverts everything)
    #[arg(short, long)]
    pub number: Option<u32>,

    /// Target version label
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: Option<String>,

    /// Show the units that would run without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Version label of the new unit
    pub label: String,

    /// Forward SQL fragment files, in order (default: configured components)
    #[arg(long = "up", value_name = "FILE")]
    pub up: Vec<PathBuf>,

    /// Backward SQL fragment files, in order (default: configured components)
    #[arg(long = "down", value_name = "FILE")]
    pub down: Vec<PathBuf>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
