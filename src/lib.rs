//! # Phenoql
//!
//! Compiles curated phenotype field lists into cleaned metadata tables
//! and dataset SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Phenotype list (entity/name pairs)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver + dictionary/codings]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Resolution (resolved ∪ unresolved, ordered)        │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼ [table builder]              ▼ [compile + dataset schema]
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  Cleaned phenotype table │   │  CompiledQuery (SQL)      │
//! └──────────────────────────┘   └──────────────────────────┘
//!                                           │
//!                                           ▼ [extract + metadata store]
//!                                ┌──────────────────────────┐
//!                                │  Raw field values         │
//!                                └──────────────────────────┘
//! ```

pub mod compile;
pub mod config;
pub mod extract;
pub mod metadata;
pub mod model;
pub mod process;
pub mod resolver;
pub mod schema;
pub mod sql;
pub mod table;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, CohortSelector, CompileError, CompileOptions, CompiledQuery,
    };
    pub use crate::config::{ArtifactRef, Settings};
    pub use crate::extract::{extract, ExtractOutput};
    pub use crate::metadata::{LocalStore, MetadataStore, RawTable, StoreError};
    pub use crate::model::{
        read_field_list, CodingEntry, CodingTable, Dictionary, DictionaryEntry, FieldReference,
        ValueType,
    };
    pub use crate::resolver::{resolve, Resolution, ResolvedPhenotype, ResolveWarning};
    pub use crate::schema::DatasetSchema;
    pub use crate::sql::Dialect;
    pub use crate::table::PhenotypeTable;
}
