//! Data model for references, batch outcomes and storage inventory.

use serde::{Deserialize, Serialize};

/// How an asset reference is embedded in its record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LocationKind {
    /// A column holding zero or one URL
    FlatField,
    /// A sub-field of one element of an array column
    ArrayElementField,
    /// A URL found inside freeform text or HTML
    EmbeddedInText,
}

/// Exact position of a reference inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldPath {
    /// Whole value of `field`
    Field {
        /// Column name
        field: String,
    },
    /// `field[index].sub_field`
    Element {
        /// Array column name
        field: String,
        /// Position of the element within the array
        index: usize,
        /// Key inside the element holding the URL
        sub_field: String,
    },
    /// Occurrences of a literal substring inside `field`
    Text {
        /// Text column name
        field: String,
    },
}

impl FieldPath {
    /// Column the reference lives in.
    pub fn column(&self) -> &str {
        match self {
            FieldPath::Field { field }
            | FieldPath::Element { field, .. }
            | FieldPath::Text { field } => field,
        }
    }

    /// Location kind implied by this path.
    pub fn location_kind(&self) -> LocationKind {
        match self {
            FieldPath::Field { .. } => LocationKind::FlatField,
            FieldPath::Element { .. } => LocationKind::ArrayElementField,
            FieldPath::Text { .. } => LocationKind::EmbeddedInText,
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPath::Field { field } | FieldPath::Text { field } => write!(f, "{}", field),
            FieldPath::Element {
                field,
                index,
                sub_field,
            } => write!(f, "{}[{}].{}", field, index, sub_field),
        }
    }
}

/// A pointer from a record to a source-store asset.
///
/// Computed on demand from a record and never persisted: records mutate
/// between runs, so references are rediscovered every time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    /// Identifier of the record holding the reference
    pub container_record_id: String,
    /// Collection the record was read from
    pub container_collection: String,
    /// Literal URL as it appears in the record
    pub source_url: String,
    /// Where in the record the URL sits
    pub path: FieldPath,
}

impl AssetReference {
    /// Location kind of this reference.
    pub fn location_kind(&self) -> LocationKind {
        self.path.location_kind()
    }
}

/// Outcome of one record within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemStatus {
    /// At least one asset was transferred and the record persisted
    Success,
    /// Nothing was persisted for this record
    Error,
}

/// Per-record entry of a [`MigrationBatchResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerItemResult {
    /// Record identifier
    pub record_id: String,
    /// Human-readable label (title, name) when the collection has one
    pub title: Option<String>,
    /// Outcome
    pub status: ItemStatus,
    /// Last target URL written into the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    /// Failure description, also set on success when some assets failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Number of references rewritten
    pub assets_updated_count: usize,
    /// Number of references that kept their source URL
    pub assets_failed_count: usize,
}

impl PerItemResult {
    /// Build an error entry for a record nothing was written to.
    pub fn error(record_id: impl Into<String>, title: Option<String>, message: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            title,
            status: ItemStatus::Error,
            new_url: None,
            error_message: Some(message.into()),
            assets_updated_count: 0,
            assets_failed_count: 0,
        }
    }
}

/// Report of one `migrate_batch` invocation. Returned, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationBatchResult {
    /// Collection the batch ran against
    pub collection: String,
    /// Records the batch started processing
    pub attempted: usize,
    /// Records that ended with [`ItemStatus::Success`]
    pub succeeded: usize,
    /// Records that ended with [`ItemStatus::Error`]
    pub failed: usize,
    /// Records still holding source-store references after the batch
    pub remaining: u64,
    /// Per-record outcomes in processing order
    pub results: Vec<PerItemResult>,
    /// Wall-clock time spent
    pub elapsed_ms: u64,
    /// True when the budget ended the batch before the selection was done
    pub stopped_early: bool,
}

impl MigrationBatchResult {
    /// True once no record holds a source-store reference.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// One object physically present in the source store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInventoryEntry {
    /// Path of the object inside the bucket
    pub object_path: String,
    /// Size reported by the store
    pub size_bytes: u64,
}

/// What a collection's counts are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusUnit {
    /// Flat-field collections count records
    Records,
    /// Array and embedded collections count assets summed across records
    Assets,
}

/// Aggregate migration progress of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatus {
    /// Collection name
    pub collection: String,
    /// Unit of the counts below
    pub unit: StatusUnit,
    /// Records or assets with any image reference
    pub total: u64,
    /// Pointing at the target store
    pub migrated: u64,
    /// Pointing at the source store
    pub pending: u64,
    /// Pointing somewhere else entirely (external hosts)
    pub unmanaged: u64,
}

/// Classification of the source store against live references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Bucket that was listed
    pub bucket: String,
    /// Objects present in the bucket
    pub total_files: usize,
    /// Their combined size in MB
    pub total_size_mb: f64,
    /// Objects referenced by at least one record
    pub referenced_files: usize,
    /// Objects referenced by no record
    pub unreferenced_files: usize,
    /// Combined size of unreferenced objects in MB
    pub unreferenced_size_mb: f64,
    /// Space reclaimed if every unreferenced object were deleted
    pub potential_savings_mb: f64,
    /// Bounded sample of unreferenced paths for human review
    pub sample_unreferenced_files: Vec<String>,
}

/// Result of a destructive cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    /// Objects deleted by this invocation
    pub deleted_count: usize,
    /// Orphans still present after re-listing the store
    pub remaining_unreferenced: usize,
    /// True when the budget ended deletion early
    pub stopped_early: bool,
    /// Set when a sub-batch failed; earlier sub-batches stay deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
