//! The data dictionary artifact: per-field metadata.

use std::collections::HashMap;

use serde::Deserialize;

use super::field::FieldReference;
use super::types::ValueType;
use super::ModelError;

/// Metadata for one `(entity, name)` pair, as recorded in the data
/// dictionary artifact. Read-only during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    pub entity: String,
    pub name: String,
    /// Human-readable label.
    pub title: String,
    pub value_type: ValueType,
    /// Reference into the coding table, when the field is coded.
    pub coding_name: Option<String>,
    pub units: Option<String>,
    pub linkout: Option<String>,
}

/// The full data dictionary, indexed by `(entity, name)`.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<FieldReference, DictionaryEntry>,
}

impl Dictionary {
    /// Exact-match lookup. No fuzzy or case-insensitive matching.
    pub fn lookup(&self, field: &FieldReference) -> Option<&DictionaryEntry> {
        self.entries.get(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the dictionary from CSV.
    ///
    /// Required columns: `entity`, `name`, `title`, `type`. Optional:
    /// `coding_name`, `units`, `linkout` (empty cells mean absent).
    /// Duplicate `(entity, name)` rows keep the first occurrence.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ModelError> {
        #[derive(Deserialize)]
        struct Row {
            entity: String,
            name: String,
            title: String,
            #[serde(rename = "type")]
            value_type: String,
            #[serde(default)]
            coding_name: Option<String>,
            #[serde(default)]
            units: Option<String>,
            #[serde(default)]
            linkout: Option<String>,
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for (idx, row) in csv_reader.deserialize::<Row>().enumerate() {
            let row = row.map_err(|e| ModelError::MalformedRecord {
                detail: format!("data dictionary row {}: {}", idx + 1, e),
            })?;

            let field = FieldReference::new(&row.entity, &row.name)?;
            if entries.contains_key(&field) {
                tracing::warn!(field = %field, "duplicate dictionary row, keeping first");
                continue;
            }

            entries.insert(
                field.clone(),
                DictionaryEntry {
                    entity: field.entity,
                    name: field.name,
                    title: row.title,
                    value_type: ValueType::parse(&row.value_type),
                    coding_name: row.coding_name.filter(|s| !s.is_empty()),
                    units: row.units.filter(|s| !s.is_empty()),
                    linkout: row.linkout.filter(|s| !s.is_empty()),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Read the dictionary from a CSV file on disk.
    pub fn from_path(path: &std::path::Path) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}
