//! Statement splitter
//!
//! Splits a SQL script into its top-level statements while preserving the
//! original text of each one. Only `;` tokens end a statement; whitespace and
//! comment-only fragments are dropped.

use crate::dialect::{DuckDbDialect, GenericDialect, PostgresDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use sqlparser::tokenizer::{Location, Token};

/// Dialect-aware splitter for multi-statement SQL scripts
pub struct StatementSplitter {
    dialect: Box<dyn SqlDialect>,
}

impl StatementSplitter {
    /// Create a new splitter with DuckDB dialect
    pub fn duckdb() -> Self {
        Self {
            dialect: Box::new(DuckDbDialect::new()),
        }
    }

    /// Create a new splitter with PostgreSQL dialect
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgresDialect::new()),
        }
    }

    /// Create a new splitter with the generic dialect
    pub fn generic() -> Self {
        Self {
            dialect: Box::new(GenericDialect::new()),
        }
    }

    /// Get the dialect name
    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }

    /// Split `sql` into trimmed statement texts, without the trailing `;`.
    pub fn split(&self, sql: &str) -> SqlResult<Vec<String>> {
        let tokens = self.dialect.tokenize(sql)?;
        let index = LineIndex::new(sql);

        let mut statements = Vec::new();
        let mut start = 0usize;
        let mut has_code = false;

        for token in &tokens {
            match token.token {
                Token::SemiColon => {
                    let end = index.offset(sql, token.span.start).ok_or_else(|| {
                        SqlError::BoundaryError {
                            line: token.span.start.line as usize,
                            column: token.span.start.column as usize,
                        }
                    })?;
                    if has_code {
                        statements.push(sql[start..end].trim().to_string());
                    }
                    start = end + 1;
                    has_code = false;
                }
                Token::Whitespace(_) | Token::EOF => {}
                _ => has_code = true,
            }
        }

        if has_code {
            statements.push(sql[start..].trim().to_string());
        }

        Ok(statements)
    }
}

impl Default for StatementSplitter {
    fn default() -> Self {
        Self::duckdb()
    }
}

/// Split `sql` with the default (DuckDB) dialect.
pub fn split(sql: &str) -> SqlResult<Vec<String>> {
    StatementSplitter::default().split(sql)
}

/// Maps tokenizer locations (1-based line, 1-based character column) back to
/// byte offsets.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(sql: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Byte offset of the `;` at `loc`, or `None` if `loc` does not point at one.
    fn offset(&self, sql: &str, loc: Location) -> Option<usize> {
        let line = usize::try_from(loc.line).ok()?.checked_sub(1)?;
        let column = usize::try_from(loc.column).ok()?.checked_sub(1)?;
        let line_start = *self.line_starts.get(line)?;
        let offset = sql[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)?;
        sql[offset..].starts_with(';').then_some(offset)
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
