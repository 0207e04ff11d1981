//! Token-stream SQL generation.
//!
//! Queries are built as small ASTs and rendered through dialect-agnostic
//! tokens; each [`dialect::Dialect`] decides identifier quoting at
//! serialization time.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

pub use dialect::{Dialect, SqlDialect};
pub use expr::{col, table_col, Expr, ExprExt};
pub use query::{Join, JoinType, Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};
