//! Declared value types from the data dictionary.

use serde::{Deserialize, Serialize};

/// Declared type of a field, as recorded in the data dictionary.
///
/// Dictionaries drift; unrecognized declarations are carried through
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Integer,
    Float,
    String,
    Date,
    DateTime,
    Other(String),
}

impl ValueType {
    /// Parse a dictionary type declaration. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => ValueType::Integer,
            "float" | "double" => ValueType::Float,
            "string" | "text" => ValueType::String,
            "date" => ValueType::Date,
            "datetime" | "timestamp" => ValueType::DateTime,
            _ => ValueType::Other(raw.trim().to_string()),
        }
    }

    /// The declaration as written out in the cleaned table.
    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
