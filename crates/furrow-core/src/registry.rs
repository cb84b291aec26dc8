//! The schema registry — static knowledge of every logical entity.
//!
//! A [`Registry`] is built once at startup, either from the compiled-in
//! definitions in [`crate::builtin`] or from a deployment-owned TOML file, and
//! is read-only afterwards. Storage names are always declared, never derived
//! from logical names.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Field kinds ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  #[default]
  String,
  Number,
  Boolean,
  Date,
  Uuid,
  Json,
}

impl FieldKind {
  /// Value emitted on read for a required field the backend did not return.
  pub fn empty_value(self) -> serde_json::Value {
    use serde_json::Value;
    match self {
      Self::String => Value::String(String::new()),
      Self::Number => Value::from(0),
      Self::Boolean => Value::Bool(false),
      Self::Date | Self::Uuid | Self::Json => Value::Null,
    }
  }

  /// Postgres column type used when suggesting DDL for a missing column.
  pub fn sql_type(self) -> &'static str {
    match self {
      Self::String => "text",
      Self::Number => "numeric",
      Self::Boolean => "boolean",
      Self::Date => "timestamptz",
      Self::Uuid => "uuid",
      Self::Json => "jsonb",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::String => "string",
      Self::Number => "number",
      Self::Boolean => "boolean",
      Self::Date => "date",
      Self::Uuid => "uuid",
      Self::Json => "json",
    }
  }
}

// ─── Field spec ──────────────────────────────────────────────────────────────

/// One field of a logical entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
  /// camelCase name used by application code.
  #[serde(rename = "logical")]
  pub logical_name: String,
  /// snake_case column name in the backend.
  #[serde(rename = "storage")]
  pub storage_name: String,
  #[serde(default)]
  pub required:     bool,
  #[serde(default)]
  pub kind:         FieldKind,
}

impl FieldSpec {
  pub fn required(logical: &str, storage: &str, kind: FieldKind) -> Self {
    Self {
      logical_name: logical.to_owned(),
      storage_name: storage.to_owned(),
      required: true,
      kind,
    }
  }

  pub fn optional(logical: &str, storage: &str, kind: FieldKind) -> Self {
    Self { required: false, ..Self::required(logical, storage, kind) }
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

/// A physical table that might back an entity in a given deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageTableCandidate {
  pub table:    String,
  /// Lower values are probed first.
  pub priority: u32,
}

// ─── Entity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalEntity {
  pub name:       String,
  #[serde(default)]
  pub candidates: Vec<StorageTableCandidate>,
  #[serde(default)]
  pub fields:     Vec<FieldSpec>,
}

impl LogicalEntity {
  pub fn new(name: &str) -> Self {
    Self { name: name.to_owned(), candidates: Vec::new(), fields: Vec::new() }
  }

  pub fn candidate(mut self, table: &str, priority: u32) -> Self {
    self
      .candidates
      .push(StorageTableCandidate { table: table.to_owned(), priority });
    self
  }

  pub fn field(mut self, spec: FieldSpec) -> Self {
    self.fields.push(spec);
    self
  }

  pub fn field_by_logical(&self, logical: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.logical_name == logical)
  }

  pub fn field_by_storage(&self, storage: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.storage_name == storage)
  }

  /// Candidates in probe order (ascending priority, then declaration order).
  pub fn candidates_in_order(&self) -> Vec<&StorageTableCandidate> {
    let mut ordered: Vec<_> = self.candidates.iter().collect();
    ordered.sort_by_key(|c| c.priority);
    ordered
  }

  fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Registry("entity with empty name".to_owned()));
    }
    if self.candidates.is_empty() {
      return Err(Error::Registry(format!(
        "entity {:?} declares no candidate tables",
        self.name
      )));
    }

    let mut tables = HashSet::new();
    for c in &self.candidates {
      if !tables.insert(c.table.as_str()) {
        return Err(Error::Registry(format!(
          "entity {:?} lists candidate table {:?} twice",
          self.name, c.table
        )));
      }
    }

    let mut logical = HashSet::new();
    let mut storage = HashSet::new();
    for f in &self.fields {
      if !logical.insert(f.logical_name.as_str()) {
        return Err(Error::Registry(format!(
          "entity {:?} declares field {:?} twice",
          self.name, f.logical_name
        )));
      }
      if !storage.insert(f.storage_name.as_str()) {
        return Err(Error::Registry(format!(
          "entity {:?} maps two fields onto column {:?}",
          self.name, f.storage_name
        )));
      }
    }
    Ok(())
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Shape of a registry TOML file.
#[derive(Deserialize)]
struct RegistryFile {
  #[serde(default, rename = "entity")]
  entities: Vec<LogicalEntity>,
}

/// Immutable lookup table of logical entities.
#[derive(Debug, Clone)]
pub struct Registry {
  entities: Vec<LogicalEntity>,
  index:    HashMap<String, usize>,
}

impl Registry {
  /// Validate `entities` and build a registry. Order is preserved for
  /// [`Registry::list_entities`].
  pub fn new(entities: Vec<LogicalEntity>) -> Result<Self> {
    let mut index = HashMap::with_capacity(entities.len());
    for (i, entity) in entities.iter().enumerate() {
      entity.validate()?;
      if index.insert(entity.name.clone(), i).is_some() {
        return Err(Error::Registry(format!(
          "entity {:?} registered twice",
          entity.name
        )));
      }
    }
    Ok(Self { entities, index })
  }

  /// Parse a registry from TOML (`[[entity]]` tables).
  pub fn from_toml(source: &str) -> Result<Self> {
    let file: RegistryFile = toml::from_str(source)?;
    Self::new(file.entities)
  }

  pub fn get_entity(&self, name: &str) -> Result<&LogicalEntity> {
    self
      .index
      .get(name)
      .map(|&i| &self.entities[i])
      .ok_or_else(|| Error::UnknownEntity(name.to_owned()))
  }

  pub fn list_entities(&self) -> impl Iterator<Item = &str> + '_ {
    self.entities.iter().map(|e| e.name.as_str())
  }

  pub fn entities(&self) -> &[LogicalEntity] { &self.entities }
}
