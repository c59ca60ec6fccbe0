//! In-memory record store.

use async_trait::async_trait;
use ferry_error::{FerryResult, RecordError, RecordErrorKind};
use ferry_interface::{Record, RecordQuery, RecordStore};
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type Row = Map<String, JsonValue>;

/// Text rendering of a column, the way `column::text` renders it.
fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn row_id(row: &Row, id_column: &str) -> Option<String> {
    match row.get(id_column)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Record store holding tables of JSON rows in memory.
///
/// Mirrors the PostgreSQL store's observable behavior: rows come back ordered
/// by id, `contains` matches the text rendering of a column, and updates of a
/// missing row fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<BTreeMap<String, Vec<Row>>>>,
    rejected_updates: Arc<RwLock<HashSet<String>>>,
}

impl MemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Non-object values are ignored.
    pub async fn insert(&self, table: &str, row: JsonValue) {
        if let JsonValue::Object(row) = row {
            self.tables
                .write()
                .await
                .entry(table.to_string())
                .or_default()
                .push(row);
        }
    }

    /// Current contents of one row.
    pub async fn row(&self, table: &str, id_column: &str, id: &str) -> Option<Row> {
        self.tables
            .read()
            .await
            .get(table)?
            .iter()
            .find(|row| row_id(row, id_column).as_deref() == Some(id))
            .cloned()
    }

    /// Make every future update of row `id` fail.
    pub async fn reject_updates_for(&self, id: &str) {
        self.rejected_updates.write().await.insert(id.to_string());
    }

    async fn matching(&self, query: &RecordQuery) -> Vec<Row> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(query.table()) else {
            return Vec::new();
        };

        let mut selected: Vec<Row> = rows
            .iter()
            .filter(|row| match query.contains() {
                Some((column, needle)) => row
                    .get(column)
                    .filter(|v| !v.is_null())
                    .map(|v| render(v).contains(needle.as_str()))
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();

        let id_column = query.id_column();
        selected.sort_by(|a, b| {
            let a = row_id(a, id_column).unwrap_or_default();
            let b = row_id(b, id_column).unwrap_or_default();
            compare_ids(&a, &b)
        });
        selected
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch(&self, query: &RecordQuery) -> FerryResult<Vec<Record>> {
        let offset = query.offset().unwrap_or(0);
        let limit = query.limit().unwrap_or(usize::MAX);

        let records = self
            .matching(query)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                if query.columns().is_empty() {
                    row
                } else {
                    row.into_iter()
                        .filter(|(k, _)| k == query.id_column() || query.columns().contains(k))
                        .collect()
                }
            })
            .filter_map(|row| Record::from_json(JsonValue::Object(row), query.id_column()))
            .collect::<Vec<_>>();

        debug!(table = %query.table(), count = records.len(), "Fetched records");
        Ok(records)
    }

    async fn count(&self, query: &RecordQuery) -> FerryResult<u64> {
        Ok(self.matching(query).await.len() as u64)
    }

    async fn update_fields(
        &self,
        table: &str,
        id_column: &str,
        id: &str,
        fields: &Map<String, JsonValue>,
    ) -> FerryResult<()> {
        if self.rejected_updates.read().await.contains(id) {
            return Err(RecordError::new(RecordErrorKind::Update(format!(
                "update of {}/{} rejected",
                table, id
            )))
            .into());
        }

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row_id(row, id_column).as_deref() == Some(id))
            })
            .ok_or_else(|| {
                RecordError::new(RecordErrorKind::NotFound(format!("{}/{}", table, id)))
            })?;

        for (column, value) in fields {
            row.insert(column.clone(), value.clone());
        }
        Ok(())
    }
}
