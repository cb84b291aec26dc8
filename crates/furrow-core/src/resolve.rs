//! Table resolution — binding each logical entity to one physical table.
//!
//! Candidates are probed in ascending priority and the first readable table
//! wins. The outcome, success or failure, is cached for the process lifetime;
//! only [`TableResolver::invalidate`] causes a fresh probe sequence.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::{
  Error, Result,
  backend::Backend,
  error::ProbeFailure,
  registry::LogicalEntity,
};

/// The physical table resolved for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundTable {
  pub entity:   String,
  pub table:    String,
  pub priority: u32,
}

type Resolution = std::result::Result<BoundTable, Vec<ProbeFailure>>;

/// Per-process cache of resolved tables.
///
/// Each entity gets one [`OnceCell`]; concurrent callers for an unresolved
/// entity all wait on the same probe sequence.
pub struct TableResolver {
  cells:         Mutex<HashMap<String, Arc<OnceCell<Resolution>>>>,
  probe_timeout: Duration,
}

impl TableResolver {
  pub fn new(probe_timeout: Duration) -> Self {
    Self { cells: Mutex::new(HashMap::new()), probe_timeout }
  }

  pub fn probe_timeout(&self) -> Duration { self.probe_timeout }

  fn cell(&self, entity: &str) -> Arc<OnceCell<Resolution>> {
    let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
    cells.entry(entity.to_owned()).or_default().clone()
  }

  /// Resolve `entity`, probing only if no earlier call has.
  pub async fn resolve<B: Backend>(
    &self,
    backend: &B,
    entity: &LogicalEntity,
  ) -> Result<BoundTable> {
    let cell = self.cell(&entity.name);
    let resolution = cell
      .get_or_init(|| probe_candidates(backend, entity, self.probe_timeout))
      .await;

    match resolution {
      Ok(bound) => Ok(bound.clone()),
      Err(attempts) => Err(Error::NoAccessibleTable {
        entity:   entity.name.clone(),
        attempts: attempts.clone(),
      }),
    }
  }

  /// The cached binding for `entity`, if it resolved successfully.
  pub fn cached(&self, entity: &str) -> Option<BoundTable> {
    let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
    cells.get(entity)?.get()?.as_ref().ok().cloned()
  }

  /// Forget the cached outcome for `entity`. Returns `true` if one existed.
  pub fn invalidate(&self, entity: &str) -> bool {
    let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
    let removed = cells.remove(entity).is_some();
    if removed {
      tracing::info!(entity, "table binding invalidated");
    }
    removed
  }
}

/// Await `fut` for at most `limit`, flattening backend errors and timeouts
/// into a printable reason.
pub(crate) async fn bounded<F, T, E>(limit: Duration, fut: F) -> std::result::Result<T, String>
where
  F: Future<Output = std::result::Result<T, E>>,
  E: std::fmt::Display,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => Err(e.to_string()),
    Err(_) => Err(format!("timed out after {limit:?}")),
  }
}

async fn probe_candidates<B: Backend>(
  backend: &B,
  entity: &LogicalEntity,
  limit: Duration,
) -> Resolution {
  let mut attempts = Vec::new();

  for candidate in entity.candidates_in_order() {
    match bounded(limit, backend.probe_readable(&candidate.table)).await {
      Ok(()) => {
        tracing::info!(entity = %entity.name, table = %candidate.table, "bound entity to table");
        return Ok(BoundTable {
          entity:   entity.name.clone(),
          table:    candidate.table.clone(),
          priority: candidate.priority,
        });
      }
      Err(reason) => {
        tracing::debug!(
          entity = %entity.name,
          table = %candidate.table,
          %reason,
          "candidate rejected"
        );
        attempts.push(ProbeFailure { table: candidate.table.clone(), reason });
      }
    }
  }

  tracing::warn!(entity = %entity.name, tried = attempts.len(), "no accessible table");
  Err(attempts)
}
