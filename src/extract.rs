//! Extraction - run a compiled query, or just hand back its SQL.
//!
//! The SQL-only branch is pure serialization: it never touches the
//! metadata store. Execution is one-shot; store errors pass through
//! unmodified with no retry.

use crate::compile::CompiledQuery;
use crate::metadata::{MetadataStore, RawTable, StoreError};

/// What an extraction run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutput {
    /// The query's SQL text, unexecuted.
    Sql(String),
    /// Raw field values, one row per record in the target dataset,
    /// columns in the compiled field order.
    Table(RawTable),
}

/// Execute a compiled query, or return its SQL text when `sql_only`.
pub fn extract(
    query: &CompiledQuery,
    store: &dyn MetadataStore,
    sql_only: bool,
) -> Result<ExtractOutput, StoreError> {
    if sql_only {
        tracing::info!(dataset_id = %query.dataset_id, "emitting SQL without execution");
        return Ok(ExtractOutput::Sql(query.sql.clone()));
    }

    tracing::info!(
        dataset_id = %query.dataset_id,
        fields = query.fields.len(),
        "executing extraction"
    );
    let table = store.execute(&query.sql, &query.dataset_id)?;

    tracing::info!(rows = table.rows.len(), "extraction complete");
    Ok(ExtractOutput::Table(table))
}
