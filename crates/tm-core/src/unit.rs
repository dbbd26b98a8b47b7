//! Migration unit descriptors (`.yml` files with `kind: migration`).
//!
//! A descriptor is plain data: two ordered lists of SQL statements. Nothing in
//! a unit file is ever evaluated other than by handing those statements to
//! the database.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk representation of a migration unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDescriptor {
    /// Must be "migration" - enforced during parsing
    pub kind: UnitKind,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Statements executed when rolling forward, in order
    #[serde(default)]
    pub forward: Vec<String>,

    /// Statements executed when rolling back, in order
    #[serde(default)]
    pub backward: Vec<String>,
}

/// Enforces kind: migration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Migration,
}

/// Minimal YAML probe to check the `kind` field without full deserialization
#[derive(Deserialize)]
struct UnitKindProbe {
    #[serde(default)]
    kind: Option<serde_yaml::Value>,
}

impl UnitDescriptor {
    /// Create a descriptor from statement lists.
    pub fn new(forward: Vec<String>, backward: Vec<String>) -> Self {
        Self {
            kind: UnitKind::Migration,
            description: None,
            forward,
            backward,
        }
    }

    /// Parse descriptor text; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> CoreResult<Self> {
        let parse_error = |details: String| CoreError::UnitParseError {
            path: path.display().to_string(),
            details,
        };

        let probe: UnitKindProbe =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        match probe.kind {
            Some(serde_yaml::Value::String(ref k)) if k == "migration" => {}
            Some(other) => {
                return Err(parse_error(format!(
                    "expected `kind: migration`, found {}",
                    serde_yaml::to_string(&other)
                        .unwrap_or_default()
                        .trim()
                )))
            }
            None => return Err(parse_error("missing required `kind: migration`".to_string())),
        }

        serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Render the descriptor, preceded by `prologue` as YAML comment lines.
    pub fn render(&self, prologue: &[String]) -> CoreResult<String> {
        let mut out = String::new();
        for line in prologue {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&serde_yaml::to_string(self)?);
        Ok(out)
    }
}
