//! The cleaned phenotype table - the first of the two run outputs.
//!
//! One row per resolved phenotype, in the order the curated list gave
//! them. Unresolved references ride alongside as an explicit list; they
//! are reported, never silently missing. Partial lists are a normal
//! interim state during curation, so unresolved entries are warnings by
//! default and the caller decides whether they fail the run.

use std::io;

use serde_json::json;

use crate::model::FieldReference;
use crate::resolver::{Resolution, ResolvedPhenotype, ResolveWarning};

/// The finished phenotype table. Built once per run, written out,
/// discarded.
#[derive(Debug, Clone)]
pub struct PhenotypeTable {
    rows: Vec<ResolvedPhenotype>,
    unresolved: Vec<FieldReference>,
    warnings: Vec<ResolveWarning>,
}

impl PhenotypeTable {
    /// Assemble the table from a resolution outcome.
    pub fn build(resolution: Resolution) -> Self {
        if !resolution.unresolved.is_empty() {
            tracing::warn!(
                count = resolution.unresolved.len(),
                "phenotype list entries not found in the data dictionary"
            );
        }

        Self {
            rows: resolution.resolved,
            unresolved: resolution.unresolved,
            warnings: resolution.warnings,
        }
    }

    /// Rows, in original list order.
    pub fn rows(&self) -> &[ResolvedPhenotype] {
        &self.rows
    }

    /// References that matched nothing in the dictionary, in original
    /// list order.
    pub fn unresolved(&self) -> &[FieldReference] {
        &self.unresolved
    }

    /// Warnings accumulated during resolution.
    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    /// Batch report of everything that needs a curator's attention.
    ///
    /// One line per unresolved reference and per warning; `None` when
    /// the run was clean.
    pub fn report(&self) -> Option<String> {
        if self.unresolved.is_empty() && self.warnings.is_empty() {
            return None;
        }

        let mut lines = Vec::new();
        for field in &self.unresolved {
            lines.push(format!("unresolved: {}", field));
        }
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        Some(lines.join("\n"))
    }

    /// Write the table as CSV.
    ///
    /// Columns: entity, name, title, type, units, coding_name, codings.
    /// The coding set serializes as a JSON object of meaning -> code
    /// pairs so one cell holds the whole decoded set; empty when the
    /// field is uncoded.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "entity",
            "name",
            "title",
            "type",
            "units",
            "coding_name",
            "codings",
        ])?;

        for row in &self.rows {
            let codings = if row.codings.is_empty() {
                String::new()
            } else {
                let map: serde_json::Map<String, serde_json::Value> = row
                    .codings
                    .iter()
                    .map(|c| (c.meaning.clone(), json!(c.code)))
                    .collect();
                serde_json::Value::Object(map).to_string()
            };

            csv_writer.write_record([
                row.entry.entity.as_str(),
                row.entry.name.as_str(),
                row.entry.title.as_str(),
                row.entry.value_type.as_str(),
                row.entry.units.as_deref().unwrap_or(""),
                row.entry.coding_name.as_deref().unwrap_or(""),
                codings.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// The table as a CSV string.
    pub fn to_csv_string(&self) -> csv::Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8(buf).expect("CSV output is UTF-8"))
    }
}
