//! Strongly-typed release version label.

use crate::error::{CoreError, CoreResult};
use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Release version label carried by a migration unit (`v1.2`, `2.0.0-rc1`).
    ///
    /// Labels end up in file names, so they must be non-empty, contain no path
    /// separators or whitespace, and must not start with `.`.
    pub struct VersionLabel;
    validate = validate_label;
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("version label must not be empty".to_string());
    }
    if label.starts_with('.') {
        return Err("version label must not start with '.'".to_string());
    }
    if let Some(c) = label
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(format!("version label must not contain {c:?}"));
    }
    Ok(())
}

impl VersionLabel {
    /// Parse a label, reporting why it was rejected.
    pub fn parse(label: &str) -> CoreResult<Self> {
        validate_label(label).map_err(|reason| CoreError::InvalidVersionLabel {
            label: label.to_string(),
            reason,
        })?;
        Ok(Self(label.to_string()))
    }
}
