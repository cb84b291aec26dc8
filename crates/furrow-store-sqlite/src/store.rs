//! [`SqliteBackend`] — the SQLite implementation of [`Backend`].

use std::{collections::HashMap, path::Path};

use furrow_core::{Record, backend::Backend, query::Query};
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};

use crate::{
  Error, Result,
  encode::{ColumnType, column_types, decode_value, encode_value, quote_ident},
  schema::RETAIL_SCHEMA,
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A Furrow backend over a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteBackend {
  conn: tokio_rusqlite::Connection,
}

impl SqliteBackend {
  /// Open (or create) a database at `path`. No schema is applied.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Create the retail tables if they do not exist.
  pub async fn init_retail_schema(&self) -> Result<()> {
    self.execute_batch(RETAIL_SCHEMA).await
  }

  /// Run arbitrary SQL, e.g. seed data or a deployment-specific schema.
  pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL building ────────────────────────────────────────────────────────────

/// Build a parameterised `SELECT` for `query` against `table`.
fn select_sql(table: &str, query: &Query) -> Result<(String, Vec<SqlValue>)> {
  let mut sql = format!("SELECT * FROM {}", quote_ident(table)?);
  let mut params = Vec::with_capacity(query.filters.len());

  if !query.filters.is_empty() {
    let mut conds = Vec::with_capacity(query.filters.len());
    for (i, filter) in query.filters.iter().enumerate() {
      // `IS` rather than `=` so a null filter matches null columns.
      conds.push(format!("{} IS ?{}", quote_ident(&filter.field)?, i + 1));
      params.push(encode_value(&filter.value));
    }
    sql.push_str(" WHERE ");
    sql.push_str(&conds.join(" AND "));
  }

  if let Some(order) = &query.order_by {
    let dir = if order.descending { "DESC" } else { "ASC" };
    sql.push_str(&format!(" ORDER BY {} {dir}", quote_ident(&order.field)?));
  }

  match (query.limit, query.offset) {
    (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
    (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
    (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
    (None, None) => {}
  }

  Ok((sql, params))
}

/// Build an `INSERT ... RETURNING *` for `record`.
fn insert_sql(table: &str, record: &Record) -> Result<(String, Vec<SqlValue>)> {
  let table = quote_ident(table)?;
  if record.is_empty() {
    return Ok((format!("INSERT INTO {table} DEFAULT VALUES RETURNING *"), Vec::new()));
  }

  let mut columns = Vec::with_capacity(record.len());
  let mut placeholders = Vec::with_capacity(record.len());
  let mut params = Vec::with_capacity(record.len());
  for (i, (column, value)) in record.iter().enumerate() {
    columns.push(quote_ident(column)?);
    placeholders.push(format!("?{}", i + 1));
    params.push(encode_value(value));
  }

  Ok((
    format!(
      "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
      columns.join(", "),
      placeholders.join(", ")
    ),
    params,
  ))
}

// ─── Row decoding ────────────────────────────────────────────────────────────

/// Pair each result column with its declared type.
fn typed_columns(
  stmt: &rusqlite::Statement<'_>,
  types: &HashMap<String, ColumnType>,
) -> Vec<(String, ColumnType)> {
  stmt
    .column_names()
    .into_iter()
    .map(|name| {
      let ty = types.get(name).copied().unwrap_or(ColumnType::Other);
      (name.to_owned(), ty)
    })
    .collect()
}

fn decode_row(row: &rusqlite::Row<'_>, columns: &[(String, ColumnType)]) -> rusqlite::Result<Record> {
  let mut record = Record::new();
  for (i, (name, ty)) in columns.iter().enumerate() {
    record.insert(name.clone(), decode_value(row.get_ref(i)?, *ty));
  }
  Ok(record)
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for SqliteBackend {
  type Error = Error;

  async fn probe_readable(&self, table: &str) -> Result<()> {
    let sql = format!("SELECT * FROM {} LIMIT 0", quote_ident(table)?);
    self
      .conn
      .call(move |conn| {
        conn.prepare(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn sample_row(&self, table: &str) -> Result<Option<Record>> {
    let quoted = quote_ident(table)?;
    let row = self
      .conn
      .call(move |conn| {
        let types = column_types(conn, &quoted)?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {quoted} LIMIT 1"))?;
        let columns = typed_columns(&stmt, &types);
        let row = stmt.query_row([], |row| decode_row(row, &columns)).optional()?;
        Ok(row)
      })
      .await?;
    Ok(row)
  }

  async fn columns(&self, table: &str) -> Result<Option<Vec<String>>> {
    let sql = format!("SELECT * FROM {} LIMIT 0", quote_ident(table)?);
    let names = self
      .conn
      .call(move |conn| {
        let stmt = conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        Ok(names)
      })
      .await?;
    Ok(Some(names))
  }

  async fn read(&self, table: &str, query: &Query) -> Result<Vec<Record>> {
    let quoted = quote_ident(table)?;
    let (sql, params) = select_sql(table, query)?;
    tracing::debug!(%sql, "sqlite read");

    let rows = self
      .conn
      .call(move |conn| {
        let types = column_types(conn, &quoted)?;
        let mut stmt = conn.prepare(&sql)?;
        let columns = typed_columns(&stmt, &types);
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| decode_row(row, &columns))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn write(&self, table: &str, record: Record) -> Result<Record> {
    let quoted = quote_ident(table)?;
    let (sql, params) = insert_sql(table, &record)?;
    tracing::debug!(%sql, "sqlite write");

    let row = self
      .conn
      .call(move |conn| {
        let types = column_types(conn, &quoted)?;
        let mut stmt = conn.prepare(&sql)?;
        let columns = typed_columns(&stmt, &types);
        let row = stmt.query_row(rusqlite::params_from_iter(params.iter()), |row| {
          decode_row(row, &columns)
        })?;
        Ok(row)
      })
      .await?;
    Ok(row)
  }
}
