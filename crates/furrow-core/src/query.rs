//! Read queries passed through the mapper to a backend.
//!
//! A [`Query`] is written against logical field names by callers and
//! translated to storage names by
//! [`translate::to_storage_query`](crate::translate::to_storage_query) before
//! it reaches [`Backend::read`](crate::backend::Backend::read).

use serde_json::Value;

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
  pub field: String,
  pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
  pub field:      String,
  pub descending: bool,
}

/// Parameters for [`Backend::read`](crate::backend::Backend::read).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
  /// All filters must match (logical AND).
  pub filters:  Vec<Filter>,
  pub order_by: Option<Order>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

impl Query {
  pub fn new() -> Self { Self::default() }

  pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.push(Filter { field: field.into(), value: value.into() });
    self
  }

  pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
    self.order_by = Some(Order { field: field.into(), descending });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }
}
