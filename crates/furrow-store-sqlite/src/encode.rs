//! Conversions between JSON record values and SQLite values, plus identifier
//! quoting.
//!
//! SQLite has no boolean or JSON storage class, so the declared column type
//! (from `PRAGMA table_info`) decides how an `INTEGER` or `TEXT` value is
//! decoded. Blobs are surfaced as lowercase hex strings.

use std::collections::HashMap;

use furrow_core::backend::is_plain_identifier;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::Value;

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Validate a plain identifier and return it double-quoted.
pub fn quote_ident(name: &str) -> Result<String> {
  if !is_plain_identifier(name) {
    return Err(Error::InvalidIdentifier(name.to_owned()));
  }
  Ok(format!("\"{name}\""))
}

// ─── Column types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Boolean,
  Json,
  Other,
}

impl ColumnType {
  pub fn from_decl(decl: &str) -> Self {
    let decl = decl.to_ascii_uppercase();
    if decl.contains("BOOL") {
      Self::Boolean
    } else if decl.contains("JSON") {
      Self::Json
    } else {
      Self::Other
    }
  }
}

/// Declared types of every column of `table` (already quoted).
pub fn column_types(
  conn: &rusqlite::Connection,
  quoted_table: &str,
) -> rusqlite::Result<HashMap<String, ColumnType>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({quoted_table})"))?;
  let rows = stmt
    .query_map([], |row| {
      let name: String = row.get("name")?;
      let decl: String = row.get("type")?;
      Ok((name, ColumnType::from_decl(&decl)))
    })?
    .collect::<rusqlite::Result<HashMap<_, _>>>()?;
  Ok(rows)
}

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
  }
}

pub fn decode_value(value: ValueRef<'_>, ty: ColumnType) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) if ty == ColumnType::Boolean => Value::Bool(i != 0),
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
    ValueRef::Text(bytes) => {
      if ty == ColumnType::Json
        && let Ok(parsed) = serde_json::from_slice(bytes)
      {
        return parsed;
      }
      Value::String(String::from_utf8_lossy(bytes).into_owned())
    }
    ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
  }
}
