//! The coding table artifact: code -> meaning mappings for coded fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// One code -> meaning mapping within a named coding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingEntry {
    pub coding_name: String,
    pub code: String,
    pub meaning: String,
}

/// All codings, grouped by coding name. Entries keep file order within
/// each coding.
#[derive(Debug, Clone, Default)]
pub struct CodingTable {
    codings: HashMap<String, Vec<CodingEntry>>,
}

impl CodingTable {
    /// All entries for a coding name, in file order.
    pub fn lookup(&self, coding_name: &str) -> Option<&[CodingEntry]> {
        self.codings.get(coding_name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.codings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codings.is_empty()
    }

    /// Read the coding table from CSV.
    ///
    /// Required columns: `coding_name`, `code`, `meaning`.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ModelError> {
        #[derive(Deserialize)]
        struct Row {
            coding_name: String,
            code: String,
            meaning: String,
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut codings: HashMap<String, Vec<CodingEntry>> = HashMap::new();
        for (idx, row) in csv_reader.deserialize::<Row>().enumerate() {
            let row = row.map_err(|e| ModelError::MalformedRecord {
                detail: format!("coding table row {}: {}", idx + 1, e),
            })?;

            if row.coding_name.is_empty() {
                return Err(ModelError::MalformedRecord {
                    detail: format!("coding table row {}: empty coding_name", idx + 1),
                });
            }

            codings
                .entry(row.coding_name.clone())
                .or_default()
                .push(CodingEntry {
                    coding_name: row.coding_name,
                    code: row.code,
                    meaning: row.meaning,
                });
        }

        Ok(Self { codings })
    }

    /// Read the coding table from a CSV file on disk.
    pub fn from_path(path: &std::path::Path) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}
