//! Field references - the join key into all phenotype metadata.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Identifies one column in the remote dataset: an entity (table) and a
/// field name within it.
///
/// `(entity, name)` is the join key into the data dictionary and, after
/// compilation, into the dataset schema. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldReference {
    pub entity: String,
    pub name: String,
}

impl FieldReference {
    /// Build a field reference, rejecting empty components.
    ///
    /// Surrounding whitespace is stripped; curated lists are hand-edited
    /// and trailing spaces are routine.
    pub fn new(entity: &str, name: &str) -> Result<Self, ModelError> {
        let entity = entity.trim();
        let name = name.trim();

        if entity.is_empty() {
            return Err(ModelError::MalformedRecord {
                detail: format!("field reference with empty entity (name: {:?})", name),
            });
        }
        if name.is_empty() {
            return Err(ModelError::MalformedRecord {
                detail: format!("field reference with empty name (entity: {:?})", entity),
            });
        }

        Ok(Self {
            entity: entity.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a dotted `entity.name` reference.
    pub fn parse(qualified: &str) -> Result<Self, ModelError> {
        match qualified.split_once('.') {
            Some((entity, name)) => Self::new(entity, name),
            None => Err(ModelError::MalformedRecord {
                detail: format!("expected entity.name, got {:?}", qualified),
            }),
        }
    }

    /// The dotted form used in projections and extract headers.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.entity, self.name)
    }
}

impl std::fmt::Display for FieldReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.entity, self.name)
    }
}

/// Read an ordered phenotype list from CSV.
///
/// The file must carry `entity` and `name` columns; any other columns a
/// curation tool left behind are ignored. Input order is preserved.
pub fn read_field_list<R: std::io::Read>(reader: R) -> Result<Vec<FieldReference>, ModelError> {
    #[derive(Deserialize)]
    struct Row {
        entity: String,
        name: String,
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut fields = Vec::new();
    for (idx, row) in csv_reader.deserialize::<Row>().enumerate() {
        let row = row.map_err(|e| ModelError::MalformedRecord {
            detail: format!("phenotype list row {}: {}", idx + 1, e),
        })?;
        fields.push(FieldReference::new(&row.entity, &row.name)?);
    }

    Ok(fields)
}
