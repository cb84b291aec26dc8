//! [`SchemaMapper`] — the public facade over registry, translator, resolver
//! and discovery.

use std::{sync::Arc, time::Duration};

use crate::{
  Error, Record, Result,
  backend::Backend,
  discover::SchemaDiscrepancy,
  query::Query,
  registry::Registry,
  resolve::{BoundTable, TableResolver, bounded},
  translate,
};

#[derive(Debug, Clone)]
pub struct MapperOptions {
  /// Upper bound for each table probe and each discovery sample read.
  pub probe_timeout: Duration,
}

impl Default for MapperOptions {
  fn default() -> Self { Self { probe_timeout: Duration::from_secs(5) } }
}

/// Translates and routes entity records to an injected backend.
///
/// Build one per process and share it; the table cache lives inside.
pub struct SchemaMapper<B: Backend> {
  registry: Arc<Registry>,
  backend:  Arc<B>,
  resolver: TableResolver,
}

impl<B: Backend> SchemaMapper<B> {
  pub fn new(registry: Arc<Registry>, backend: Arc<B>, options: MapperOptions) -> Self {
    Self { registry, backend, resolver: TableResolver::new(options.probe_timeout) }
  }

  pub fn registry(&self) -> &Registry { &self.registry }

  pub fn backend(&self) -> &B { &self.backend }

  // ── Translation ───────────────────────────────────────────────────────

  pub fn to_storage(&self, entity: &str, logical: &Record) -> Result<Record> {
    translate::to_storage(self.registry.get_entity(entity)?, logical)
  }

  pub fn from_storage(&self, entity: &str, storage: &Record) -> Result<Record> {
    Ok(translate::from_storage(self.registry.get_entity(entity)?, storage))
  }

  // ── Resolution ────────────────────────────────────────────────────────

  pub async fn resolve(&self, entity: &str) -> Result<BoundTable> {
    let spec = self.registry.get_entity(entity)?;
    self.resolver.resolve(self.backend.as_ref(), spec).await
  }

  /// Drop the cached binding so the next call probes again.
  pub fn invalidate(&self, entity: &str) -> Result<bool> {
    self.registry.get_entity(entity)?;
    Ok(self.resolver.invalidate(entity))
  }

  // ── Discovery ─────────────────────────────────────────────────────────

  /// Diff the registry's view of `entity` against its bound table.
  ///
  /// Only an unknown entity is an error; every backend problem is reported
  /// inside the returned [`SchemaDiscrepancy`].
  pub async fn discover(&self, entity: &str) -> Result<SchemaDiscrepancy> {
    let spec = self.registry.get_entity(entity)?;

    let bound = match self.resolver.resolve(self.backend.as_ref(), spec).await {
      Ok(bound) => bound,
      Err(e) => return Ok(SchemaDiscrepancy::unresolved(entity, None, e.to_string())),
    };
    let table = bound.table.as_str();
    let limit = self.resolver.probe_timeout();

    let sample = match bounded(limit, self.backend.sample_row(table)).await {
      Ok(sample) => sample,
      Err(reason) => {
        return Ok(SchemaDiscrepancy::unresolved(
          entity,
          Some(table),
          format!("sample read failed: {reason}"),
        ));
      }
    };

    if let Some(row) = sample {
      return Ok(SchemaDiscrepancy::compare(spec, table, row.keys().map(String::as_str)));
    }

    tracing::debug!(entity, table, "table is empty, trying schema-only probe");
    match bounded(limit, self.backend.columns(table)).await {
      Ok(Some(columns)) => Ok(SchemaDiscrepancy::compare(
        spec,
        table,
        columns.iter().map(String::as_str),
      )),
      Ok(None) => Ok(SchemaDiscrepancy::no_sample(entity, table)),
      Err(reason) => Ok(SchemaDiscrepancy::unresolved(
        entity,
        Some(table),
        format!("column probe failed: {reason}"),
      )),
    }
  }

  /// Discover every registered entity, one after another, in registry order.
  pub async fn discover_all(&self) -> Vec<SchemaDiscrepancy> {
    let mut reports = Vec::new();
    for entity in self.registry.list_entities() {
      match self.discover(entity).await {
        Ok(report) => reports.push(report),
        Err(e) => reports.push(SchemaDiscrepancy::unresolved(entity, None, e.to_string())),
      }
    }
    reports
  }

  // ── Data access ───────────────────────────────────────────────────────

  /// Read rows through the mapper. `query` uses logical field names.
  pub async fn read(&self, entity: &str, query: &Query) -> Result<Vec<Record>> {
    let spec = self.registry.get_entity(entity)?;
    let storage_query = translate::to_storage_query(spec, query)?;
    let bound = self.resolver.resolve(self.backend.as_ref(), spec).await?;

    let rows = self
      .backend
      .read(&bound.table, &storage_query)
      .await
      .map_err(|e| Error::Access { table: bound.table.clone(), source: Box::new(e) })?;

    Ok(rows.iter().map(|row| translate::from_storage(spec, row)).collect())
  }

  /// Write a logical record. Translation happens before any backend call.
  pub async fn write(&self, entity: &str, logical: &Record) -> Result<Record> {
    let spec = self.registry.get_entity(entity)?;
    let storage = translate::to_storage(spec, logical)?;
    let bound = self.resolver.resolve(self.backend.as_ref(), spec).await?;

    let stored = self
      .backend
      .write(&bound.table, storage)
      .await
      .map_err(|e| Error::Write { table: bound.table.clone(), source: Box::new(e) })?;

    Ok(translate::from_storage(spec, &stored))
  }
}
