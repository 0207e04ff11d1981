//! Phenotype resolution - join field references against the metadata
//! artifacts.
//!
//! Resolution is a pure function over the supplied dictionary and coding
//! table: every input reference lands in exactly one of `resolved` or
//! `unresolved`, input order preserved in both. Nothing is dropped and
//! nothing aborts early; the caller sees the whole picture in one pass.

use crate::model::{CodingEntry, CodingTable, Dictionary, DictionaryEntry, FieldReference};

/// A field reference joined with its dictionary entry and coding rows.
///
/// Exists only when the reference matched the dictionary exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPhenotype {
    pub field: FieldReference,
    pub entry: DictionaryEntry,
    /// Empty when the field is uncoded, or when its declared coding has
    /// no rows (recorded as a [`ResolveWarning::CodingMissing`]).
    pub codings: Vec<CodingEntry>,
}

/// Non-fatal issues observed during resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveWarning {
    /// The dictionary declares a coding for this field but the coding
    /// table has no rows for it. The field still resolves.
    CodingMissing {
        field: FieldReference,
        coding_name: String,
    },
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::CodingMissing { field, coding_name } => {
                write!(f, "{}: coding {:?} has no rows", field, coding_name)
            }
        }
    }
}

/// Outcome of resolving a phenotype list: an exact partition of the
/// input plus accumulated warnings.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedPhenotype>,
    pub unresolved: Vec<FieldReference>,
    pub warnings: Vec<ResolveWarning>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolve each field reference against the dictionary and coding table.
///
/// Exact `(entity, name)` matching only. Unmatched references accumulate
/// in `unresolved`; a declared-but-empty coding accumulates a warning.
pub fn resolve(
    fields: &[FieldReference],
    dictionary: &Dictionary,
    codings: &CodingTable,
) -> Resolution {
    let mut resolution = Resolution::default();

    for field in fields {
        let entry = match dictionary.lookup(field) {
            Some(entry) => entry.clone(),
            None => {
                resolution.unresolved.push(field.clone());
                continue;
            }
        };

        let coding_rows = match &entry.coding_name {
            Some(coding_name) => match codings.lookup(coding_name) {
                Some(rows) => rows.to_vec(),
                None => {
                    tracing::warn!(
                        field = %field,
                        coding_name = %coding_name,
                        "declared coding has no rows"
                    );
                    resolution.warnings.push(ResolveWarning::CodingMissing {
                        field: field.clone(),
                        coding_name: coding_name.clone(),
                    });
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        resolution.resolved.push(ResolvedPhenotype {
            field: field.clone(),
            entry,
            codings: coding_rows,
        });
    }

    resolution
}
