//! Configuration types and parsing for tidemark.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use crate::unit_id::DEFAULT_NUMBER_WIDTH;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Main project configuration from tidemark.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Schema that owns the migration history table
    #[serde(default = "default_target_schema")]
    pub target_schema: String,

    /// Directory containing migration unit files
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Digits in the zero-padded unit number prefix
    #[serde(default = "default_number_width")]
    pub number_width: usize,

    /// SQL dialect used to split fragment files into statements
    #[serde(default)]
    pub dialect: Dialect,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// SQL fragment sets used by `tm new` when no files are given explicitly
    #[serde(default)]
    pub components: Vec<ComponentConfig>,

    /// Named target configurations (e.g., dev, staging, prod)
    /// Each target can override the database and the target schema
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Target schema override
    #[serde(default)]
    pub target_schema: Option<String>,
}

/// A named set of forward/backward SQL fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Component name (for messages and unit prologues)
    pub name: String,

    /// Fragment files applied when rolling forward, relative to the project root
    #[serde(default)]
    pub up: Vec<String>,

    /// Fragment files applied when rolling back, relative to the project root
    #[serde(default)]
    pub down: Vec<String>,

    /// Include this component when synthesizing from config
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (for DuckDB file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// DuckDB SQL dialect
    #[default]
    DuckDb,
    /// PostgreSQL dialect
    Postgres,
    /// ANSI-ish generic dialect
    Generic,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::DuckDb => write!(f, "duckdb"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Generic => write!(f, "generic"),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

/// Highest supported number width; larger values overflow `u32`.
const MAX_NUMBER_WIDTH: usize = 9;

fn default_target_schema() -> String {
    "main".to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_number_width() -> usize {
    DEFAULT_NUMBER_WIDTH
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

/// True if `name` is a plain SQL identifier (letters, digits, underscore).
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("tidemark.yml");
        let yaml_path = dir.join("tidemark.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("tidemark.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.number_width == 0 || self.number_width > MAX_NUMBER_WIDTH {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "number_width must be between 1 and {}, got {}",
                    MAX_NUMBER_WIDTH, self.number_width
                ),
            });
        }

        let schemas = std::iter::once(("target_schema", self.target_schema.as_str())).chain(
            self.targets
                .values()
                .filter_map(|t| t.target_schema.as_deref())
                .map(|s| ("targets.*.target_schema", s)),
        );
        for (field, schema) in schemas {
            if !is_plain_identifier(schema) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{} '{}' must contain only letters, digits and '_' and not start with a digit",
                        field, schema
                    ),
                });
            }
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.name.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "Component name cannot be empty".to_string(),
                });
            }
            if !seen.insert(component.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Duplicate component name '{}'", component.name),
                });
            }
        }

        Ok(())
    }

    /// Get absolute migrations directory relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Enabled components, in declaration order
    pub fn enabled_components(&self) -> impl Iterator<Item = &ComponentConfig> {
        self.components.iter().filter(|c| c.enabled)
    }

    /// Get the list of available target names
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    fn lookup_target(&self, name: &str) -> CoreResult<&TargetConfig> {
        self.targets
            .get(name)
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "Target '{}' not found. Available targets: {}",
                    name,
                    self.available_targets().join(", ")
                ),
            })
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => Ok(self
                .lookup_target(name)?
                .database
                .clone()
                .unwrap_or_else(|| self.database.clone())),
            None => Ok(self.database.clone()),
        }
    }

    /// Get the target schema, optionally applying target overrides
    pub fn get_target_schema(&self, target: Option<&str>) -> CoreResult<&str> {
        match target {
            Some(name) => Ok(self
                .lookup_target(name)?
                .target_schema
                .as_deref()
                .unwrap_or(&self.target_schema)),
            None => Ok(&self.target_schema),
        }
    }

    /// Resolve target from CLI flag or TM_TARGET environment variable
    ///
    /// Priority: CLI flag > TM_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var("TM_TARGET").ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
