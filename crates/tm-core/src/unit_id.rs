//! Unit naming scheme.
//!
//! A unit identifier is `<number>_<label>.yml` where `<number>` is a
//! zero-padded, fixed-width decimal (`001_v1.yml`). The identifier is the
//! key recorded in the migration history table, so encoding and decoding must
//! round-trip exactly.

use crate::error::{CoreError, CoreResult};
use crate::version_label::VersionLabel;
use std::cmp::Ordering;
use std::fmt;

/// File extension carried by every unit file.
pub const UNIT_EXTENSION: &str = "yml";

/// Default number of digits in the numeric prefix.
pub const DEFAULT_NUMBER_WIDTH: usize = 3;

/// Validated identity of a migration unit.
///
/// Ordering and equality only consider `number`, which is unique within a
/// unit directory.
#[derive(Debug, Clone)]
pub struct UnitId {
    number: u32,
    label: VersionLabel,
    width: usize,
}

impl UnitId {
    /// Build an identifier from its parts (`encode`).
    ///
    /// `label` may already carry the `.yml` extension; it is not doubled.
    pub fn encode(number: u32, label: &str, width: usize) -> CoreResult<Self> {
        if width == 0 || number_digits(number) > width {
            return Err(CoreError::NumberOverflow { number, width });
        }
        let label = strip_extension(label);
        let label = VersionLabel::parse(label)?;
        Ok(Self {
            number,
            label,
            width,
        })
    }

    /// Decode an identifier whose numeric prefix may have any width.
    pub fn decode(identifier: &str) -> CoreResult<Self> {
        Self::decode_inner(identifier, None)
    }

    /// Decode an identifier whose numeric prefix must be exactly `width` digits.
    pub fn decode_with_width(identifier: &str, width: usize) -> CoreResult<Self> {
        Self::decode_inner(identifier, Some(width))
    }

    fn decode_inner(identifier: &str, width: Option<usize>) -> CoreResult<Self> {
        let malformed = |reason: &str| CoreError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        };

        let stem = strip_extension(identifier);
        let (prefix, label) = stem
            .split_once('_')
            .ok_or_else(|| malformed("missing '_' between number and version label"))?;

        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("numeric prefix must contain only digits"));
        }
        if let Some(width) = width {
            if prefix.len() != width {
                return Err(malformed(&format!(
                    "numeric prefix must be exactly {width} digits"
                )));
            }
        }
        let number: u32 = prefix
            .parse()
            .map_err(|_| malformed("numeric prefix is out of range"))?;
        let label = VersionLabel::parse(label).map_err(|e| match e {
            CoreError::InvalidVersionLabel { reason, .. } => malformed(&reason),
            other => other,
        })?;

        Ok(Self {
            number,
            label,
            width: prefix.len(),
        })
    }

    /// Sequence number of the unit.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Release version label of the unit.
    pub fn label(&self) -> &VersionLabel {
        &self.label
    }

    /// Width of the zero-padded numeric prefix.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Canonical identifier, including the file extension.
    pub fn identifier(&self) -> String {
        format!(
            "{:0width$}_{}.{}",
            self.number,
            self.label,
            UNIT_EXTENSION,
            width = self.width
        )
    }
}

/// Next free unit number: one past the highest existing number, or 1.
pub fn next_number<'a>(numbers: impl IntoIterator<Item = &'a UnitId>) -> u32 {
    numbers
        .into_iter()
        .map(UnitId::number)
        .max()
        .map_or(1, |max| max + 1)
}

fn strip_extension(name: &str) -> &str {
    name.strip_suffix(UNIT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name)
}

fn number_digits(mut n: u32) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

impl PartialEq for UnitId {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for UnitId {}

impl PartialOrd for UnitId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

#[cfg(test)]
#[path = "unit_id_test.rs"]
mod tests;
