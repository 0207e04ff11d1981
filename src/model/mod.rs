//! Typed phenotype metadata records.
//!
//! The curated phenotype list, data dictionary, and coding table arrive
//! as loosely-typed tabular artifacts. This module turns their rows into
//! validated records at load time; malformed rows fail here, not at some
//! later field access.

mod coding;
mod dictionary;
mod field;
pub mod types;

pub use coding::{CodingEntry, CodingTable};
pub use dictionary::{Dictionary, DictionaryEntry};
pub use field::{read_field_list, FieldReference};
pub use types::ValueType;

/// Errors raised while loading metadata artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Malformed record: {detail}")]
    MalformedRecord { detail: String },

    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse artifact: {0}")]
    Csv(#[from] csv::Error),
}
