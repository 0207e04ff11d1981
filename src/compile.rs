//! Query compilation - from a resolved phenotype list to an executable
//! field-extraction query.
//!
//! ```text
//! Field list -> dedup -> schema check -> join planning -> SQL
//! ```
//!
//! Compilation is a pure function of its inputs: the field list, the
//! dataset schema, the cohort selector, and the injected settings. A
//! field the dataset does not expose is a hard error here - silently
//! dropping a requested column would hand the caller an extract that
//! does not match what they asked for.
//!
//! # Example
//!
//! ```ignore
//! use phenoql::compile::{compile, CohortSelector, CompileOptions};
//!
//! let compiled = compile(
//!     &fields,
//!     &schema,
//!     &CohortSelector::Cohort("test".into()),
//!     &settings,
//!     CompileOptions::default(),
//! )?;
//! println!("{}", compiled.sql);
//! ```

use std::collections::HashSet;

use crate::config::Settings;
use crate::model::FieldReference;
use crate::schema::{DatasetSchema, EntityGraph, JoinStep, SchemaError};
use crate::sql::{table_col, Dialect, ExprExt, Query, SelectExpr, TableRef};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation. All fatal; compilation
/// produces either a complete query or nothing.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Field {field} is not present in the dataset schema")]
    SchemaMismatch { field: FieldReference },

    #[error("Entity {entity} cannot be joined to base entity {base}")]
    JoinUnreachable { entity: String, base: String },

    #[error("Cohort key {key:?} not found. Available keys: {available}")]
    UnknownCohort { key: String, available: String },

    #[error("No fields to compile")]
    NoFields,
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Cohort Selection
// ============================================================================

/// How the target dataset is chosen: a cohort key resolved through
/// configuration, or an explicit dataset ID that bypasses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohortSelector {
    Cohort(String),
    Dataset(String),
}

impl CohortSelector {
    /// Build a selector from optional CLI-style inputs. An explicit
    /// dataset ID always wins over the cohort key.
    pub fn from_options(cohort_key: &str, dataset_id: Option<&str>) -> Self {
        match dataset_id {
            Some(id) => CohortSelector::Dataset(id.to_string()),
            None => CohortSelector::Cohort(cohort_key.to_string()),
        }
    }

    /// Resolve to a concrete dataset ID.
    pub fn resolve(&self, settings: &Settings) -> CompileResult<String> {
        match self {
            CohortSelector::Dataset(id) => Ok(id.clone()),
            CohortSelector::Cohort(key) => {
                settings.cohorts.get(key).cloned().ok_or_else(|| {
                    let mut available: Vec<&str> =
                        settings.cohorts.keys().map(String::as_str).collect();
                    available.sort_unstable();
                    CompileError::UnknownCohort {
                        key: key.clone(),
                        available: available.join(", "),
                    }
                })
            }
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a field list against a dataset.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// The dataset the query is scoped to.
    pub dataset_id: String,

    /// The projected fields, deduplicated, in first-occurrence order.
    pub fields: Vec<FieldReference>,

    /// The query AST (for further manipulation if needed).
    pub query: Query,

    /// The dialect used for generation.
    pub dialect: Dialect,

    /// The generated SQL string.
    pub sql: String,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a field list into an extraction query.
///
/// # Arguments
///
/// * `fields` - Requested fields, in output order; duplicates collapse
///   to their first occurrence
/// * `schema` - The target dataset's schema
/// * `selector` - Cohort key or explicit dataset ID
/// * `settings` - Injected configuration (cohort map)
/// * `options` - Compilation options (dialect)
pub fn compile(
    fields: &[FieldReference],
    schema: &DatasetSchema,
    selector: &CohortSelector,
    settings: &Settings,
    options: CompileOptions,
) -> CompileResult<CompiledQuery> {
    let dataset_id = selector.resolve(settings)?;

    // Step 1: Deduplicate by (entity, name), first occurrence wins.
    let mut seen = HashSet::new();
    let fields: Vec<FieldReference> = fields
        .iter()
        .filter(|f| seen.insert((*f).clone()))
        .cloned()
        .collect();

    if fields.is_empty() {
        return Err(CompileError::NoFields);
    }

    // Step 2: Every requested field must exist in the dataset schema.
    for field in &fields {
        if !schema.contains_field(field) {
            return Err(CompileError::SchemaMismatch {
                field: field.clone(),
            });
        }
    }

    // Step 3: Plan joins from the base entity to every requested entity.
    let steps = plan_joins(&fields, schema)?;

    // Step 4: Assemble the query.
    let mut query = Query::new().from(
        TableRef::new(&schema.base_entity).with_database(&schema.database),
    );

    for field in &fields {
        query = query.select_expr(
            SelectExpr::new(table_col(&field.entity, &field.name))
                .with_alias(&field.qualified_name()),
        );
    }

    for step in &steps {
        let mut pairs = step.on.iter();
        let (first_from, first_to) = pairs.next().expect("join steps carry at least one column pair");
        let mut on = table_col(&step.from, first_from).eq(table_col(&step.to, first_to));
        for (from_col, to_col) in pairs {
            on = on.and(table_col(&step.from, from_col).eq(table_col(&step.to, to_col)));
        }

        query = query.left_join(
            TableRef::new(&step.to).with_database(&schema.database),
            on,
        );
    }

    // Step 5: Generate SQL.
    let sql = query.to_sql(options.dialect);

    Ok(CompiledQuery {
        dataset_id,
        fields,
        query,
        dialect: options.dialect,
        sql,
    })
}

/// BFS paths from the base entity to each requested entity, flattened
/// into an ordered list of unique join steps. Steps shared between
/// targets are emitted once, at first need.
fn plan_joins(
    fields: &[FieldReference],
    schema: &DatasetSchema,
) -> CompileResult<Vec<JoinStep>> {
    let graph = EntityGraph::new(schema);

    let mut entities = Vec::new();
    let mut seen_entities = HashSet::new();
    for field in fields {
        if field.entity != schema.base_entity && seen_entities.insert(field.entity.clone()) {
            entities.push(field.entity.clone());
        }
    }

    let mut steps = Vec::new();
    let mut seen_steps = HashSet::new();
    for entity in &entities {
        // Path finding fails as NoPathFound or UnknownEntity; either way
        // the entity is unreachable from the base.
        let path = graph
            .find_path(&schema.base_entity, entity)
            .map_err(|_: SchemaError| CompileError::JoinUnreachable {
                entity: entity.clone(),
                base: schema.base_entity.clone(),
            })?;

        for step in path.steps {
            if seen_steps.insert((step.from.clone(), step.to.clone())) {
                steps.push(step);
            }
        }
    }

    Ok(steps)
}

// ============================================================================
// Tests
// ============================================================================
