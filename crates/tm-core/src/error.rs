//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Unit identifier does not follow `<digits>_<label>.yml`
    #[error("[E004] Malformed unit identifier '{identifier}': {reason}")]
    MalformedIdentifier { identifier: String, reason: String },

    /// E005: Unit number does not fit the configured width
    #[error("[E005] Unit number {number} does not fit in {width} digits")]
    NumberOverflow { number: u32, width: usize },

    /// E006: Two unit files share a number
    #[error("[E006] Duplicate unit number {number}: '{first}' and '{second}'")]
    DuplicateUnitNumber {
        number: u32,
        first: String,
        second: String,
    },

    /// E007: Unit directory does not exist
    #[error("[E007] Unit directory not found: {path}")]
    UnitDirectoryNotFound { path: String },

    /// E008: Unit descriptor could not be parsed
    #[error("[E008] Invalid unit descriptor {path}: {details}")]
    UnitParseError { path: String, details: String },

    /// E009: Invalid version label
    #[error("[E009] Invalid version label '{label}': {reason}")]
    InvalidVersionLabel { label: String, reason: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
