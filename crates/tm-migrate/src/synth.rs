//! Script synthesis: build a unit file out of SQL fragment files.

use crate::error::{MigrateError, MigrateResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tm_core::{UnitDescriptor, UnitId};
use tm_sql::StatementSplitter;

/// Split every fragment file into statements, preserving file order and
/// statement order. Blank and comment-only statements are dropped.
pub fn collect_statements(
    splitter: &StatementSplitter,
    files: &[PathBuf],
) -> MigrateResult<Vec<String>> {
    let mut statements = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(file).map_err(|source| MigrateError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let split = splitter
            .split(&text)
            .map_err(|source| MigrateError::Split {
                path: file.display().to_string(),
                source,
            })?;
        log::debug!("{}: {} statement(s)", file.display(), split.len());
        statements.extend(split);
    }
    Ok(statements)
}

/// Build the descriptor and the comment prologue for a new unit.
pub fn build_unit(
    splitter: &StatementSplitter,
    id: &UnitId,
    up_files: &[PathBuf],
    down_files: &[PathBuf],
) -> MigrateResult<(UnitDescriptor, Vec<String>)> {
    let forward = collect_statements(splitter, up_files)?;
    let backward = collect_statements(splitter, down_files)?;

    let mut prologue = vec![format!(
        "{} generated by tidemark ({} dialect)",
        id.identifier(),
        splitter.dialect_name()
    )];
    prologue.push(format!("forward: {}", list_files(up_files)));
    prologue.push(format!("backward: {}", list_files(down_files)));

    let mut descriptor = UnitDescriptor::new(forward, backward);
    descriptor.description = Some(format!("Migration to {}", id.label()));
    Ok((descriptor, prologue))
}

fn list_files(files: &[PathBuf]) -> String {
    if files.is_empty() {
        return "(none)".to_string();
    }
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write a rendered unit to `dir`, refusing to replace an existing file.
pub fn write_unit(
    dir: &Path,
    id: &UnitId,
    descriptor: &UnitDescriptor,
    prologue: &[String],
) -> MigrateResult<PathBuf> {
    let path = dir.join(id.identifier());
    let content = descriptor.render(prologue)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                MigrateError::UnitAlreadyExists {
                    path: path.display().to_string(),
                }
            } else {
                MigrateError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
    file.write_all(content.as_bytes())
        .map_err(|source| MigrateError::Io {
            path: path.display().to_string(),
            source,
        })?;

    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "synth_test.rs"]
mod tests;
