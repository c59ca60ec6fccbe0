//! PostgreSQL record store.

use crate::{like_pattern, validate_identifier};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Json, Text};
use ferry_error::{FerryResult, RecordError, RecordErrorKind};
use ferry_interface::{Record, RecordQuery, RecordStore};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, instrument};

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Json)]
    json: JsonValue,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Record store over the content database.
///
/// Rows are read as `row_to_json` so any table shape maps onto [`Record`]
/// without a compiled schema. Blocking diesel calls run on the blocking pool.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRecordStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl PostgresRecordStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool for `database_url`.
    ///
    /// The pool is created lazily so an unreachable database surfaces on
    /// first use rather than at startup.
    pub fn connect(database_url: &str, max_size: u32) -> FerryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_size.max(1))
            .build_unchecked(manager);
        Ok(Self { pool })
    }

    async fn run<T, F>(&self, op: F) -> FerryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, RecordError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| RecordError::new(RecordErrorKind::Connection(e.to_string())))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| RecordError::new(RecordErrorKind::Query(e.to_string())))?;
        Ok(result?)
    }
}

/// `FROM ... WHERE ...` part of a query plus the optional bound pattern.
fn from_clause(query: &RecordQuery) -> Result<(String, Option<String>), RecordError> {
    let table = validate_identifier(query.table())?;
    let mut clause = format!("FROM {}", table);
    let mut pattern = None;

    if let Some((column, needle)) = query.contains() {
        let column = validate_identifier(column)?;
        clause.push_str(&format!(" WHERE {}::text LIKE $1", column));
        pattern = Some(like_pattern(needle));
    }

    Ok((clause, pattern))
}

fn select_sql(query: &RecordQuery) -> Result<(String, Option<String>), RecordError> {
    let id_column = validate_identifier(query.id_column())?;
    let columns = if query.columns().is_empty() {
        "*".to_string()
    } else {
        query
            .columns()
            .iter()
            .map(|c| validate_identifier(c))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ")
    };

    let (from, pattern) = from_clause(query)?;
    let mut sql = format!("SELECT {} {} ORDER BY {}", columns, from, id_column);
    if let Some(limit) = query.limit() {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(offset) = query.offset() {
        sql.push_str(&format!(" OFFSET {}", offset));
    }

    Ok((
        format!("SELECT row_to_json(t) AS json FROM ({}) t", sql),
        pattern,
    ))
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self), fields(table = %query.table(), limit = ?query.limit(), offset = ?query.offset()))]
    async fn fetch(&self, query: &RecordQuery) -> FerryResult<Vec<Record>> {
        let (sql, pattern) = select_sql(query)?;
        let id_column = query.id_column().clone();
        debug!(sql = %sql, "Fetching records");

        let rows = self
            .run(move |conn| {
                let mut statement = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
                if let Some(pattern) = pattern {
                    statement = statement.bind::<Text, _>(pattern);
                }
                Ok(statement.load::<JsonRow>(conn)?)
            })
            .await?;

        let records: Vec<Record> = rows
            .into_iter()
            .filter_map(|row| Record::from_json(row.json, &id_column))
            .collect();
        debug!(count = records.len(), "Fetched records");
        Ok(records)
    }

    #[instrument(skip(self), fields(table = %query.table()))]
    async fn count(&self, query: &RecordQuery) -> FerryResult<u64> {
        let (from, pattern) = from_clause(query)?;
        let sql = format!("SELECT COUNT(*) AS count {}", from);

        let row = self
            .run(move |conn| {
                let mut statement = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
                if let Some(pattern) = pattern {
                    statement = statement.bind::<Text, _>(pattern);
                }
                Ok(statement.get_result::<CountRow>(conn)?)
            })
            .await?;

        Ok(row.count.max(0) as u64)
    }

    #[instrument(skip(self, fields), fields(columns = fields.len()))]
    async fn update_fields(
        &self,
        table: &str,
        id_column: &str,
        id: &str,
        fields: &Map<String, JsonValue>,
    ) -> FerryResult<()> {
        let table = validate_identifier(table)?.to_string();
        let id_column = validate_identifier(id_column)?.to_string();
        for column in fields.keys() {
            validate_identifier(column)?;
        }
        let id = id.to_string();
        let fields = fields.clone();

        self.run(move |conn| {
            conn.transaction::<_, RecordError, _>(|conn| {
                for (column, value) in &fields {
                    let affected = match value {
                        JsonValue::Null => diesel::sql_query(format!(
                            "UPDATE {} SET {} = NULL WHERE {}::text = $1",
                            table, column, id_column
                        ))
                        .bind::<Text, _>(&id)
                        .execute(conn)?,
                        JsonValue::String(text) => diesel::sql_query(format!(
                            "UPDATE {} SET {} = $1 WHERE {}::text = $2",
                            table, column, id_column
                        ))
                        .bind::<Text, _>(text)
                        .bind::<Text, _>(&id)
                        .execute(conn)?,
                        other => diesel::sql_query(format!(
                            "UPDATE {} SET {} = CAST($1 AS jsonb) WHERE {}::text = $2",
                            table, column, id_column
                        ))
                        .bind::<Text, _>(serde_json::to_string(other)?)
                        .bind::<Text, _>(&id)
                        .execute(conn)?,
                    };

                    if affected == 0 {
                        return Err(RecordError::new(RecordErrorKind::NotFound(format!(
                            "{}/{}",
                            table, id
                        ))));
                    }
                }
                Ok(())
            })
        })
        .await?;

        debug!("Record updated");
        Ok(())
    }
}
