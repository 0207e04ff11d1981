//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect
//! differences. Each dialect implements `SqlDialect` to handle its
//! specific syntax:
//!
//! - Identifier quoting: `` ` `` (Spark), `"` (DuckDB)
//!
//! # Usage
//!
//! ```ignore
//! use phenoql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Spark;
//! let quoted = dialect.quote_identifier("participant");  // `participant`
//! ```

mod duckdb;
pub mod helpers;
mod spark;

pub use duckdb::DuckDb;
pub use spark::Spark;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias).
    ///
    /// - Spark: `` `identifier` ``
    /// - DuckDB: `"identifier"`
    fn quote_identifier(&self, ident: &str) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// The remote dataset service executes Spark SQL.
    #[default]
    Spark,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Spark => &Spark,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
