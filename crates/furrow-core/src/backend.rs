//! The `Backend` trait — the storage capabilities the mapper consumes.
//!
//! Implemented by storage crates (`furrow-store-sqlite`, `furrow-store-rest`).
//! All records crossing this trait use storage (snake_case) column names.

use std::future::Future;

use crate::{Record, query::Query};

/// Abstraction over a relational storage backend.
///
/// All methods return `Send` futures so a mapper can be shared across tasks
/// in a multi-threaded runtime.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cheap existence and permission check; reads zero rows.
  ///
  /// An absent table and a permission failure are both reported as `Err`.
  fn probe_readable<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return one row of `table`, or `None` if the table is empty.
  fn sample_row<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Column names of `table` without reading a row.
  ///
  /// Backends that cannot introspect return `Ok(None)`, which is the default.
  fn columns<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<String>>, Self::Error>> + Send + 'a {
    let _ = table;
    async { Ok(None) }
  }

  /// Rows matching `query`. Field names in `query` are storage names.
  fn read<'a>(
    &'a self,
    table: &'a str,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a;

  /// Insert `record` and return the row as stored.
  fn write<'a>(
    &'a self,
    table: &'a str,
    record: Record,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + 'a;
}

/// `true` for `[A-Za-z_][A-Za-z0-9_]*`, the only table and column names
/// backends interpolate into queries.
pub fn is_plain_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
