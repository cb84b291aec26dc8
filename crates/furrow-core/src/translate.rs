//! Naming translation between logical (camelCase) and storage (snake_case)
//! records.
//!
//! Writes fail loudly on any key without a mapping. Reads drop unknown
//! columns and backfill required fields so callers can rely on key presence.

use crate::{
  Error, Record, Result, date,
  query::{Filter, Order, Query},
  registry::{FieldKind, LogicalEntity},
};

/// Map a logical record to storage column names.
///
/// Returns [`Error::UnmappedField`] for the first key with no registered
/// field; nothing is produced in that case.
pub fn to_storage(entity: &LogicalEntity, logical: &Record) -> Result<Record> {
  let mut out = Record::new();
  for (key, value) in logical {
    let spec = entity.field_by_logical(key).ok_or_else(|| Error::UnmappedField {
      entity: entity.name.clone(),
      field:  key.clone(),
    })?;

    let value = match spec.kind {
      FieldKind::Date => date::normalize(value).ok_or_else(|| Error::InvalidDate {
        entity: entity.name.clone(),
        field:  key.clone(),
        value:  value.to_string(),
      })?,
      _ => value.clone(),
    };
    out.insert(spec.storage_name.clone(), value);
  }
  Ok(out)
}

/// Map a storage row back to logical field names.
///
/// Columns with no registered field are dropped. Required fields the row does
/// not contain are filled with [`FieldKind::empty_value`].
pub fn from_storage(entity: &LogicalEntity, storage: &Record) -> Record {
  let mut out = Record::new();

  for (column, value) in storage {
    let Some(spec) = entity.field_by_storage(column) else {
      tracing::debug!(entity = %entity.name, column = %column, "dropping unmapped column");
      continue;
    };
    let value = match spec.kind {
      FieldKind::Date => date::normalize(value).unwrap_or_else(|| value.clone()),
      _ => value.clone(),
    };
    out.insert(spec.logical_name.clone(), value);
  }

  for spec in entity.fields.iter().filter(|f| f.required) {
    if !out.contains_key(&spec.logical_name) {
      out.insert(spec.logical_name.clone(), spec.kind.empty_value());
    }
  }

  out
}

fn storage_field(entity: &LogicalEntity, field: &str) -> Result<String> {
  entity
    .field_by_logical(field)
    .map(|f| f.storage_name.clone())
    .ok_or_else(|| Error::UnmappedField {
      entity: entity.name.clone(),
      field:  field.to_owned(),
    })
}

/// Translate filter and ordering field names of a logical query.
pub fn to_storage_query(entity: &LogicalEntity, query: &Query) -> Result<Query> {
  let filters = query
    .filters
    .iter()
    .map(|f| {
      let spec = entity.field_by_logical(&f.field);
      let value = match spec.map(|s| s.kind) {
        Some(FieldKind::Date) => date::normalize(&f.value).unwrap_or_else(|| f.value.clone()),
        _ => f.value.clone(),
      };
      Ok(Filter { field: storage_field(entity, &f.field)?, value })
    })
    .collect::<Result<Vec<_>>>()?;

  let order_by = query
    .order_by
    .as_ref()
    .map(|o| -> Result<Order> {
      Ok(Order { field: storage_field(entity, &o.field)?, descending: o.descending })
    })
    .transpose()?;

  Ok(Query { filters, order_by, limit: query.limit, offset: query.offset })
}
