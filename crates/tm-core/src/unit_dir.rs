//! Unit directory discovery.
//!
//! A unit directory holds one `.yml` file per migration unit. Every file with
//! the unit extension must decode into a [`UnitId`]; anything else in the
//! directory (READMEs, `.gitkeep`) is ignored.

use crate::error::{CoreError, CoreResult};
use crate::unit_id::{self, UnitId, UNIT_EXTENSION};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A unit file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFile {
    /// Decoded identity
    pub id: UnitId,
    /// Location of the descriptor
    pub path: PathBuf,
}

/// Snapshot of a unit directory, sorted ascending by unit number.
#[derive(Debug, Clone)]
pub struct UnitDirectory {
    root: PathBuf,
    width: usize,
    units: Vec<UnitFile>,
}

impl UnitDirectory {
    /// Scan `root` for unit files with a `width`-digit numeric prefix.
    pub fn scan(root: &Path, width: usize) -> CoreResult<Self> {
        if !root.is_dir() {
            return Err(CoreError::UnitDirectoryNotFound {
                path: root.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(root).map_err(|e| CoreError::IoWithPath {
            path: root.display().to_string(),
            source: e,
        })?;

        let mut by_number: HashMap<u32, UnitFile> = HashMap::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(UNIT_EXTENSION)
            {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let id = UnitId::decode_with_width(file_name, width)?;
            if let Some(existing) = by_number.get(&id.number()) {
                let (first, second) = ordered_pair(&existing.path, &path);
                return Err(CoreError::DuplicateUnitNumber {
                    number: id.number(),
                    first,
                    second,
                });
            }
            log::debug!("Discovered unit {}", id);
            by_number.insert(id.number(), UnitFile { id, path });
        }

        let mut units: Vec<UnitFile> = by_number.into_values().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self {
            root: root.to_path_buf(),
            width,
            units,
        })
    }

    /// Directory that was scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured width of the numeric prefix.
    pub fn width(&self) -> usize {
        self.width
    }

    /// All units, ascending by number.
    pub fn units(&self) -> &[UnitFile] {
        &self.units
    }

    /// True when the directory has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Highest unit number present, if any.
    pub fn max_number(&self) -> Option<u32> {
        self.units.last().map(|u| u.id.number())
    }

    /// `max(number) + 1`, or 1 for an empty directory.
    pub fn next_number(&self) -> u32 {
        unit_id::next_number(self.units.iter().map(|u| &u.id))
    }

    /// Look up a unit by number.
    pub fn get(&self, number: u32) -> Option<&UnitFile> {
        self.units
            .binary_search_by(|u| u.id.number().cmp(&number))
            .ok()
            .map(|idx| &self.units[idx])
    }

    /// Map each version label to the highest unit number carrying it.
    ///
    /// Labels are not required to be unique; moving to a label means moving
    /// past every unit that carries it.
    pub fn version_map(&self) -> HashMap<&str, u32> {
        let mut map = HashMap::new();
        for unit in &self.units {
            map.insert(unit.id.label().as_str(), unit.id.number());
        }
        map
    }

    /// Resolve a version label to a unit number.
    pub fn number_for_version(&self, version: &str) -> Option<u32> {
        self.version_map().get(version).copied()
    }
}

fn ordered_pair(a: &Path, b: &Path) -> (String, String) {
    let (a, b) = (a.display().to_string(), b.display().to_string());
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
#[path = "unit_dir_test.rs"]
mod tests;
