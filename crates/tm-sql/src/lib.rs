//! tm-sql - SQL layer for Tidemark
//!
//! This crate splits SQL fragment files into individual statements using the
//! sqlparser-rs tokenizer, so semicolons inside string literals, quoted
//! identifiers, comments and dollar-quoted bodies never end a statement.

pub mod dialect;
pub mod error;
pub mod splitter;

pub use dialect::{DuckDbDialect, GenericDialect, PostgresDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use splitter::{split, StatementSplitter};
