//! Record and query types for the record store.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A row of the record store, reduced to the columns that were asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key rendered as a string
    pub id: String,
    /// Column values keyed by column name
    pub fields: Map<String, JsonValue>,
}

impl Record {
    /// Create a record from an id and its fields.
    pub fn new(id: impl Into<String>, fields: Map<String, JsonValue>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object, taking the id from `id_column`.
    ///
    /// String and number ids are accepted; anything else yields `None`.
    pub fn from_json(value: JsonValue, id_column: &str) -> Option<Self> {
        let JsonValue::Object(fields) = value else {
            return None;
        };
        let id = match fields.get(id_column)? {
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self { id, fields })
    }

    /// Value of a column, if present.
    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.fields.get(column)
    }

    /// String value of a column, if present and a string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(JsonValue::as_str)
    }
}

/// A paged read of one table.
///
/// Rows are returned ordered by `id_column` so that offset paging is
/// deterministic for an unchanged table.
#[derive(Debug, Clone, PartialEq, Builder, Getters)]
#[builder(setter(into, strip_option))]
pub struct RecordQuery {
    /// Table to read.
    table: String,

    /// Primary key column.
    #[builder(default = "String::from(\"id\")")]
    id_column: String,

    /// Columns to return (empty = every column).
    #[builder(default)]
    columns: Vec<String>,

    /// Only rows whose `column` contains `needle` in its text rendering.
    #[builder(default)]
    contains: Option<(String, String)>,

    /// Row limit.
    #[builder(default)]
    limit: Option<usize>,

    /// Row offset for pagination.
    #[builder(default)]
    offset: Option<usize>,
}

impl RecordQuery {
    /// Start building a query.
    pub fn builder() -> RecordQueryBuilder {
        RecordQueryBuilder::default()
    }

    /// Same query moved to another page.
    pub fn page(&self, limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }

    /// Same query without paging, as used for counting.
    pub fn unpaged(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }
}
