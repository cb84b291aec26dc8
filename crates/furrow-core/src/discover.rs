//! Schema discovery — diffing the registry against the live backend.
//!
//! Column sets are inferred from a single sampled row, with a schema-only
//! probe as fallback for empty tables. Discovery never writes; it only
//! reports, and can render the DDL a maintainer would run to close the gap.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::registry::LogicalEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// A required field has no column, or the entity has no usable table.
  Blocking,
  Informational,
}

/// Outcome of one discovery run for one entity. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiscrepancy {
  #[serde(rename = "entityName")]
  pub entity:              String,
  /// The bound table the columns were observed on.
  pub table:               Option<String>,
  /// Storage names of registered fields with no observed column, in registry
  /// order.
  pub missing_in_storage:  Vec<String>,
  /// Observed columns with no registered field, sorted.
  pub extra_in_storage:    Vec<String>,
  pub severity:            Severity,
  /// The table was empty and the backend offers no schema-only probe.
  pub no_sample_available: bool,
  /// Why the table could not be resolved or sampled.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unresolved:          Option<String>,
}

impl SchemaDiscrepancy {
  /// Diff `entity` against the columns observed on `table`.
  pub fn compare<'a>(
    entity: &LogicalEntity,
    table: &str,
    observed: impl IntoIterator<Item = &'a str>,
  ) -> Self {
    let observed: BTreeSet<&str> = observed.into_iter().collect();

    let missing: Vec<_> = entity
      .fields
      .iter()
      .filter(|f| !observed.contains(f.storage_name.as_str()))
      .collect();

    let extra_in_storage = observed
      .iter()
      .filter(|col| entity.field_by_storage(col).is_none())
      .map(|col| (*col).to_owned())
      .collect();

    let severity = if missing.iter().any(|f| f.required) {
      Severity::Blocking
    } else {
      Severity::Informational
    };

    Self {
      entity: entity.name.clone(),
      table: Some(table.to_owned()),
      missing_in_storage: missing.iter().map(|f| f.storage_name.clone()).collect(),
      extra_in_storage,
      severity,
      no_sample_available: false,
      unresolved: None,
    }
  }

  /// Report for an entity whose table could not be resolved or read.
  pub fn unresolved(entity: &str, table: Option<&str>, reason: impl Into<String>) -> Self {
    Self {
      entity:              entity.to_owned(),
      table:               table.map(str::to_owned),
      missing_in_storage:  Vec::new(),
      extra_in_storage:    Vec::new(),
      severity:            Severity::Blocking,
      no_sample_available: false,
      unresolved:          Some(reason.into()),
    }
  }

  /// Report for an empty table with no way to list its columns.
  pub fn no_sample(entity: &str, table: &str) -> Self {
    Self {
      entity:              entity.to_owned(),
      table:               Some(table.to_owned()),
      missing_in_storage:  Vec::new(),
      extra_in_storage:    Vec::new(),
      severity:            Severity::Informational,
      no_sample_available: true,
      unresolved:          None,
    }
  }

  pub fn is_blocking(&self) -> bool { self.severity == Severity::Blocking }

  /// `true` if the table matched the registry exactly.
  pub fn is_clean(&self) -> bool {
    self.unresolved.is_none()
      && !self.no_sample_available
      && self.missing_in_storage.is_empty()
      && self.extra_in_storage.is_empty()
  }

  /// `ALTER TABLE` statements that would add the missing columns.
  ///
  /// Only rendered, never executed: DDL needs privileges the runtime lacks.
  pub fn suggested_sql(&self, entity: &LogicalEntity) -> Vec<String> {
    let Some(table) = self.table.as_deref() else {
      return Vec::new();
    };
    self
      .missing_in_storage
      .iter()
      .filter_map(|col| entity.field_by_storage(col))
      .map(|f| {
        let hint = if f.required { " -- required: backfill, then SET NOT NULL" } else { "" };
        format!(
          "ALTER TABLE \"{table}\" ADD COLUMN IF NOT EXISTS \"{}\" {};{hint}",
          f.storage_name,
          f.kind.sql_type()
        )
      })
      .collect()
  }
}

impl fmt::Display for SchemaDiscrepancy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mark = match self.severity {
      Severity::Blocking => "✗",
      Severity::Informational if self.is_clean() => "✓",
      Severity::Informational => "!",
    };
    match &self.table {
      Some(table) => writeln!(f, "{mark} {} ({table})", self.entity)?,
      None => writeln!(f, "{mark} {}", self.entity)?,
    }
    if let Some(reason) = &self.unresolved {
      writeln!(f, "    unresolved: {reason}")?;
    }
    if self.no_sample_available {
      writeln!(f, "    table is empty; columns could not be observed")?;
    }
    for col in &self.missing_in_storage {
      writeln!(f, "    [ ] missing column {col}")?;
    }
    for col in &self.extra_in_storage {
      writeln!(f, "    [ ] unmapped column {col}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::registry::{FieldKind, FieldSpec};

  fn category() -> LogicalEntity {
    LogicalEntity::new("Category")
      .candidate("categories", 1)
      .field(FieldSpec::required("name", "name", FieldKind::String))
      .field(FieldSpec::optional("isActive", "is_active", FieldKind::Boolean))
  }

  #[test]
  fn missing_optional_column_is_informational() {
    let d = SchemaDiscrepancy::compare(&category(), "categories", ["id", "name", "sort_order"]);
    assert_eq!(d.missing_in_storage, ["is_active"]);
    assert_eq!(d.extra_in_storage, ["id", "sort_order"]);
    assert_eq!(d.severity, Severity::Informational);
    assert!(!d.is_clean());
  }

  #[test]
  fn missing_required_column_is_blocking() {
    let d = SchemaDiscrepancy::compare(&category(), "categories", ["is_active"]);
    assert_eq!(d.missing_in_storage, ["name"]);
    assert!(d.is_blocking());
  }

  #[test]
  fn exact_match_is_clean() {
    let d = SchemaDiscrepancy::compare(&category(), "categories", ["name", "is_active"]);
    assert!(d.is_clean());
    assert!(d.to_string().starts_with("✓ Category (categories)"));
  }

  #[test]
  fn suggested_sql_covers_missing_columns() {
    let entity = category();
    let d = SchemaDiscrepancy::compare(&entity, "categories", ["id"]);
    let sql = d.suggested_sql(&entity);
    assert_eq!(sql.len(), 2);
    assert!(sql[0].starts_with("ALTER TABLE \"categories\" ADD COLUMN IF NOT EXISTS \"name\" text;"));
    assert!(sql[0].contains("required"));
    assert_eq!(
      sql[1],
      "ALTER TABLE \"categories\" ADD COLUMN IF NOT EXISTS \"is_active\" boolean;"
    );
  }

  #[test]
  fn unresolved_report_has_no_sql() {
    let d = SchemaDiscrepancy::unresolved("Category", None, "no table");
    assert!(d.is_blocking());
    assert!(d.suggested_sql(&category()).is_empty());
  }

  #[test]
  fn serialises_with_camel_case_keys() {
    let d = SchemaDiscrepancy::no_sample("Category", "categories");
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["entityName"], "Category");
    assert_eq!(json["noSampleAvailable"], true);
    assert_eq!(json["severity"], "informational");
    assert!(json["missingInStorage"].as_array().unwrap().is_empty());
    assert!(json.get("unresolved").is_none());
  }
}
