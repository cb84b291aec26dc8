//! [`RestBackend`] — HTTP client for a PostgREST gateway.

use std::time::Duration;

use furrow_core::{
  Record,
  backend::{Backend, is_plain_identifier},
  query::Query,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

fn default_timeout_secs() -> u64 { 30 }

/// Connection settings for the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
  /// Project URL, e.g. `https://abcd.supabase.co`.
  pub url:          String,
  pub api_key:      String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

/// A Furrow backend over PostgREST.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RestBackend {
  client: Client,
  config: RestConfig,
}

impl RestBackend {
  pub fn new(config: RestConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn table_url(&self, table: &str) -> Result<String> {
    if !is_plain_identifier(table) {
      return Err(Error::InvalidIdentifier(table.to_owned()));
    }
    Ok(format!("{}/rest/v1/{table}", self.config.url.trim_end_matches('/')))
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req
      .header("apikey", &self.config.api_key)
      .bearer_auth(&self.config.api_key)
  }

  // ── Request construction ──────────────────────────────────────────────

  fn select_request(&self, table: &str, params: &[(String, String)]) -> Result<RequestBuilder> {
    let url = self.table_url(table)?;
    Ok(self.auth(self.client.get(url)).query(params))
  }

  fn probe_request(&self, table: &str) -> Result<RequestBuilder> {
    self.select_request(table, &[("select".into(), "*".into()), ("limit".into(), "0".into())])
  }

  fn sample_request(&self, table: &str) -> Result<RequestBuilder> {
    self.select_request(table, &[("select".into(), "*".into()), ("limit".into(), "1".into())])
  }

  fn read_request(&self, table: &str, query: &Query) -> Result<RequestBuilder> {
    self.select_request(table, &query_params(query)?)
  }

  fn write_request(&self, table: &str, record: &Record) -> Result<RequestBuilder> {
    for column in record.keys() {
      if !is_plain_identifier(column) {
        return Err(Error::InvalidIdentifier(column.clone()));
      }
    }
    let url = self.table_url(table)?;
    Ok(
      self
        .auth(self.client.post(url))
        .header("Prefer", "return=representation")
        .json(record),
    )
  }
}

/// Render a filter value in PostgREST operator syntax.
fn filter_value(value: &Value) -> String {
  match value {
    Value::Null => "is.null".to_owned(),
    Value::String(s) => format!("eq.{s}"),
    other => format!("eq.{other}"),
  }
}

fn query_params(query: &Query) -> Result<Vec<(String, String)>> {
  let mut params = vec![("select".to_owned(), "*".to_owned())];

  for filter in &query.filters {
    if !is_plain_identifier(&filter.field) {
      return Err(Error::InvalidIdentifier(filter.field.clone()));
    }
    params.push((filter.field.clone(), filter_value(&filter.value)));
  }

  if let Some(order) = &query.order_by {
    if !is_plain_identifier(&order.field) {
      return Err(Error::InvalidIdentifier(order.field.clone()));
    }
    let dir = if order.descending { "desc" } else { "asc" };
    params.push(("order".to_owned(), format!("{}.{dir}", order.field)));
  }
  if let Some(limit) = query.limit {
    params.push(("limit".to_owned(), limit.to_string()));
  }
  if let Some(offset) = query.offset {
    params.push(("offset".to_owned(), offset.to_string()));
  }

  Ok(params)
}

/// Turn a non-2xx response into [`Error::Status`] with the body attached.
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { status: status.as_u16(), body })
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for RestBackend {
  type Error = Error;

  async fn probe_readable(&self, table: &str) -> Result<()> {
    check(self.probe_request(table)?.send().await?).await?;
    Ok(())
  }

  async fn sample_row(&self, table: &str) -> Result<Option<Record>> {
    let resp = check(self.sample_request(table)?.send().await?).await?;
    let rows: Vec<Record> = resp.json().await?;
    Ok(rows.into_iter().next())
  }

  async fn read(&self, table: &str, query: &Query) -> Result<Vec<Record>> {
    let resp = check(self.read_request(table, query)?.send().await?).await?;
    let rows: Vec<Record> = resp.json().await?;
    tracing::debug!(table, rows = rows.len(), "rest read");
    Ok(rows)
  }

  async fn write(&self, table: &str, record: Record) -> Result<Record> {
    let resp = check(self.write_request(table, &record)?.send().await?).await?;
    let rows: Vec<Record> = resp.json().await?;
    rows
      .into_iter()
      .next()
      .ok_or_else(|| Error::EmptyResponse(table.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn backend() -> RestBackend {
    RestBackend::new(RestConfig {
      url:          "https://demo.supabase.co/".to_owned(),
      api_key:      "anon-key".to_owned(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[test]
  fn probe_selects_zero_rows_with_auth() {
    let req = backend().probe_request("products").unwrap().build().unwrap();
    assert_eq!(req.method(), reqwest::Method::GET);
    assert_eq!(
      req.url().as_str(),
      "https://demo.supabase.co/rest/v1/products?select=*&limit=0"
    );
    assert_eq!(req.headers()["apikey"], "anon-key");
    assert_eq!(req.headers()["authorization"], "Bearer anon-key");
  }

  #[test]
  fn sample_takes_one_row() {
    let req = backend().sample_request("categories").unwrap().build().unwrap();
    assert_eq!(req.url().query(), Some("select=*&limit=1"));
  }

  #[test]
  fn read_renders_postgrest_operators() {
    let q = Query::new()
      .filter("is_active", true)
      .filter("category_id", Value::Null)
      .filter("name", "Urea 46%")
      .order_by("created_at", true)
      .limit(20)
      .offset(40);
    let req = backend().read_request("products", &q).unwrap().build().unwrap();
    let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
    assert_eq!(
      pairs,
      [
        ("select".into(), "*".into()),
        ("is_active".into(), "eq.true".into()),
        ("category_id".into(), "is.null".into()),
        ("name".into(), "eq.Urea 46%".into()),
        ("order".into(), "created_at.desc".into()),
        ("limit".into(), "20".into()),
        ("offset".into(), "40".into()),
      ]
    );
  }

  #[test]
  fn write_posts_json_and_asks_for_representation() {
    let mut record = Record::new();
    record.insert("name".into(), json!("Seeds"));
    let req = backend().write_request("categories", &record).unwrap().build().unwrap();
    assert_eq!(req.method(), reqwest::Method::POST);
    assert_eq!(req.headers()["prefer"], "return=representation");
    let body = req.body().and_then(|b| b.as_bytes()).unwrap();
    assert_eq!(serde_json::from_slice::<Value>(body).unwrap(), json!({ "name": "Seeds" }));
  }

  #[test]
  fn rejects_unsafe_names() {
    let b = backend();
    assert!(matches!(b.probe_request("../auth"), Err(Error::InvalidIdentifier(_))));
    assert!(matches!(
      b.read_request("products", &Query::new().filter("or", 1).order_by("a,b", false)),
      Err(Error::InvalidIdentifier(_))
    ));
  }
}
