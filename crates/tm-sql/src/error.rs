//! Error types for tm-sql

use thiserror::Error;

/// SQL tokenizing and splitting errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL tokenize error (S001)
    #[error("[S001] SQL tokenize error at line {line}, column {column}: {message}")]
    TokenizeError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Statement boundary could not be mapped back onto the source text (S003)
    #[error("[S003] Could not locate statement boundary at line {line}, column {column}")]
    BoundaryError { line: usize, column: usize },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
