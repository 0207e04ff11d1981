//! Spark SQL dialect.
//!
//! The dialect the remote dataset service executes. Backtick identifier
//! quoting, no lateral column aliases in the projection.

use super::helpers;
use super::SqlDialect;

/// Spark SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Spark;

impl SqlDialect for Spark {
    fn name(&self) -> &'static str {
        "spark"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }
}
