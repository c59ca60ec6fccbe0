//! Collection shapes.

use serde::{Deserialize, Serialize};

/// Where a collection keeps its asset references.
///
/// Adding a new record shape means adding a variant here; the locator and
/// the rewriter match on it, the migrator never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionSchema {
    /// `field` holds zero or one URL
    FlatField {
        /// Column name
        field: String,
    },
    /// `field` holds an array whose elements keep a URL under `sub_field`
    ArrayField {
        /// Array column name
        field: String,
        /// Key inside each element
        sub_field: String,
    },
    /// `field` holds freeform text or HTML with any number of URLs
    EmbeddedText {
        /// Text column name
        field: String,
    },
}

impl CollectionSchema {
    /// Column holding the references.
    pub fn field(&self) -> &str {
        match self {
            CollectionSchema::FlatField { field }
            | CollectionSchema::ArrayField { field, .. }
            | CollectionSchema::EmbeddedText { field } => field,
        }
    }

    /// True when status is reported per record rather than per asset.
    pub fn counts_records(&self) -> bool {
        matches!(self, CollectionSchema::FlatField { .. })
    }
}

/// A named collection and how to read it from the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CollectionSpec {
    /// Name used by the `type` field of an invocation
    name: String,
    /// Table in the record store
    table: String,
    /// Primary key column
    #[serde(default = "default_id_column")]
    id_column: String,
    /// Column used as a human-readable label in results
    #[serde(default)]
    label_column: Option<String>,
    /// Destination folder in the target store
    folder: String,
    /// Reference layout
    schema: CollectionSchema,
}

fn default_id_column() -> String {
    "id".to_string()
}

impl CollectionSpec {
    /// Create a collection spec with an `id` primary key and no label column.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        folder: impl Into<String>,
        schema: CollectionSchema,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id_column: default_id_column(),
            label_column: None,
            folder: folder.into(),
            schema,
        }
    }

    /// Set the label column.
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Set the primary key column.
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Columns a fetch must return for this collection.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![self.id_column.clone(), self.schema.field().to_string()];
        if let Some(label) = &self.label_column {
            if !columns.contains(label) {
                columns.push(label.clone());
            }
        }
        columns
    }
}
