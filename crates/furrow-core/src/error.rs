//! Error types for `furrow-core`.

use std::fmt;

use thiserror::Error;

/// Boxed error reported by a storage backend, kept unchanged.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// One rejected candidate table from a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
  pub table:  String,
  pub reason: String,
}

impl fmt::Display for ProbeFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.table, self.reason)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown entity: {0:?}")]
  UnknownEntity(String),

  #[error("entity {entity:?} has no mapping for field {field:?}")]
  UnmappedField { entity: String, field: String },

  #[error("entity {entity:?} field {field:?} is not a recognisable date: {value}")]
  InvalidDate {
    entity: String,
    field:  String,
    value:  String,
  },

  #[error(
    "no accessible table for entity {entity:?} (tried {})",
    display_attempts(.attempts)
  )]
  NoAccessibleTable {
    entity:   String,
    attempts: Vec<ProbeFailure>,
  },

  #[error("access error on table {table:?}: {source}")]
  Access {
    table:  String,
    #[source]
    source: BackendError,
  },

  #[error("write error on table {table:?}: {source}")]
  Write {
    table:  String,
    #[source]
    source: BackendError,
  },

  #[error("invalid registry: {0}")]
  Registry(String),

  #[error("registry file error: {0}")]
  RegistryFormat(#[from] toml::de::Error),
}

fn display_attempts(attempts: &[ProbeFailure]) -> String {
  if attempts.is_empty() {
    return "no candidates".to_owned();
  }
  attempts
    .iter()
    .map(ProbeFailure::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
