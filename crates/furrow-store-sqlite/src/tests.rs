//! Integration tests for `SqliteBackend` against an in-memory database.

use std::{sync::Arc, time::Duration};

use furrow_core::{
  MapperOptions, Record, SchemaMapper,
  backend::Backend,
  discover::Severity,
  query::Query,
  registry::Registry,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::SqliteBackend;

async fn backend() -> SqliteBackend {
  let b = SqliteBackend::open_in_memory()
    .await
    .expect("in-memory backend");
  b.init_retail_schema().await.expect("schema");
  b
}

fn mapper(backend: SqliteBackend) -> SchemaMapper<SqliteBackend> {
  SchemaMapper::new(
    Arc::new(Registry::builtin().unwrap()),
    Arc::new(backend),
    MapperOptions { probe_timeout: Duration::from_secs(5) },
  )
}

fn record(value: Value) -> Record {
  match value {
    Value::Object(map) => map,
    other => panic!("not an object: {other}"),
  }
}

// ─── Backend capabilities ────────────────────────────────────────────────────

#[tokio::test]
async fn probe_existing_and_missing_tables() {
  let b = backend().await;
  assert!(b.probe_readable("products").await.is_ok());

  let err = b.probe_readable("inventory").await.unwrap_err();
  assert!(err.to_string().contains("no such table"), "{err}");
}

#[tokio::test]
async fn probe_rejects_injection() {
  let b = backend().await;
  assert!(matches!(
    b.probe_readable("products; DROP TABLE products").await,
    Err(crate::Error::InvalidIdentifier(_))
  ));
}

#[tokio::test]
async fn sample_row_on_empty_table_is_none() {
  let b = backend().await;
  assert!(b.sample_row("categories").await.unwrap().is_none());
}

#[tokio::test]
async fn columns_lists_every_column() {
  let b = backend().await;
  let cols = b.columns("brands").await.unwrap().unwrap();
  assert_eq!(cols, ["id", "name", "description", "is_active", "created_at", "updated_at"]);
}

#[tokio::test]
async fn write_returns_stored_row_with_defaults() {
  let b = backend().await;
  let row = b
    .write("categories", record(json!({ "name": "Seeds", "sort_order": 3 })))
    .await
    .unwrap();

  assert_eq!(row["name"], json!("Seeds"));
  assert_eq!(row["sort_order"], json!(3));
  assert_eq!(row["is_active"], json!(true));
  assert_eq!(row["id"].as_str().unwrap().len(), 32);
  assert!(row["created_at"].as_str().unwrap().ends_with('Z'));
  assert_eq!(row["updated_at"], Value::Null);
}

#[tokio::test]
async fn json_and_boolean_columns_round_trip() {
  let b = backend().await;
  let id = Uuid::new_v4().to_string();
  b.write(
    "profiles",
    record(json!({
      "id": id,
      "email": "ops@example.com",
      "is_active": false,
      "preferences": { "theme": "dark", "pinned": [1, 2] },
    })),
  )
  .await
  .unwrap();

  let row = b.sample_row("profiles").await.unwrap().unwrap();
  assert_eq!(row["is_active"], json!(false));
  assert_eq!(row["preferences"], json!({ "theme": "dark", "pinned": [1, 2] }));
}

#[tokio::test]
async fn write_constraint_violation_is_an_error() {
  let b = backend().await;
  let err = b.write("categories", record(json!({ "description": "no name" }))).await.unwrap_err();
  assert!(err.to_string().contains("NOT NULL"), "{err}");
}

#[tokio::test]
async fn read_filters_orders_and_pages() {
  let b = backend().await;
  b.execute_batch(
    "INSERT INTO categories (name, sort_order, is_active) VALUES
       ('Seeds', 1, 1), ('Tools', 2, 0), ('Fertilizer', 3, 1), ('Pesticide', 4, 1);",
  )
  .await
  .unwrap();

  let q = Query::new()
    .filter("is_active", true)
    .order_by("sort_order", true)
    .limit(2)
    .offset(1);
  let rows = b.read("categories", &q).await.unwrap();
  let names: Vec<_> = rows.iter().map(|r| r["name"].clone()).collect();
  assert_eq!(names, [json!("Fertilizer"), json!("Seeds")]);
}

#[tokio::test]
async fn read_null_filter_matches_null() {
  let b = backend().await;
  b.execute_batch(
    "INSERT INTO categories (name, description) VALUES ('Seeds', NULL), ('Tools', 'hand tools');",
  )
  .await
  .unwrap();

  let rows = b
    .read("categories", &Query::new().filter("description", Value::Null))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["name"], json!("Seeds"));
}

// ─── Through the mapper ──────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_schema_matches_builtin_registry() {
  let m = mapper(backend().await);

  for report in m.discover_all().await {
    assert!(report.is_clean(), "{report}");
  }
}

#[tokio::test]
async fn user_profile_binds_to_profiles() {
  let m = mapper(backend().await);
  assert_eq!(m.resolve("UserProfile").await.unwrap().table, "profiles");
}

#[tokio::test]
async fn legacy_users_table_is_found_and_diffed() {
  let b = SqliteBackend::open_in_memory().await.unwrap();
  b.execute_batch(
    "CREATE TABLE users (
       id         TEXT PRIMARY KEY,
       email      TEXT,
       name       TEXT,
       role       TEXT,
       created_at TEXT
     );
     INSERT INTO users (id, email, name, role, created_at)
       VALUES ('u1', 'a@example.com', 'Ama', 'admin', '2024-01-05 08:00:00');",
  )
  .await
  .unwrap();
  let m = mapper(b);

  let report = m.discover("UserProfile").await.unwrap();
  assert_eq!(report.table.as_deref(), Some("users"));
  assert_eq!(report.missing_in_storage, ["full_name", "is_active", "preferences", "updated_at"]);
  assert_eq!(report.extra_in_storage, ["name"]);
  assert_eq!(report.severity, Severity::Informational);

  let rows = m.read("UserProfile", &Query::new()).await.unwrap();
  assert_eq!(
    Value::Object(rows[0].clone()),
    json!({
      "id":        "u1",
      "email":     "a@example.com",
      "role":      "admin",
      "createdAt": "2024-01-05T08:00:00Z",
    })
  );
}

#[tokio::test]
async fn missing_required_column_blocks() {
  let b = SqliteBackend::open_in_memory().await.unwrap();
  b.execute_batch("CREATE TABLE categories (id TEXT, title TEXT);").await.unwrap();
  let m = mapper(b);

  let report = m.discover("Category").await.unwrap();
  assert_eq!(report.severity, Severity::Blocking);
  assert!(report.missing_in_storage.contains(&"name".to_owned()));
  assert_eq!(report.extra_in_storage, ["title"]);
  let ddl = report.suggested_sql(m.registry().get_entity("Category").unwrap());
  assert!(ddl.iter().any(|s| s.contains("\"name\" text")), "{ddl:?}");
}

#[tokio::test]
async fn no_candidate_table_makes_entity_unusable() {
  let m = mapper(SqliteBackend::open_in_memory().await.unwrap());

  let err = m.write("Brand", &record(json!({ "name": "Yara" }))).await.unwrap_err();
  assert!(matches!(err, furrow_core::Error::NoAccessibleTable { .. }), "{err}");
  let report = m.discover("Brand").await.unwrap();
  assert!(report.is_blocking());
}

#[tokio::test]
async fn product_write_and_read_through_mapper() {
  let m = mapper(backend().await);

  let category = m
    .write("Category", &record(json!({ "name": "Nitrogen" })))
    .await
    .unwrap();
  let category_id = category["id"].clone();

  let product = m
    .write(
      "Product",
      &record(json!({
        "name":       "Urea 46% 50kg",
        "sku":        "UREA-50",
        "categoryId": category_id,
        "unitPrice":  32.5,
        "isActive":   true,
      })),
    )
    .await
    .unwrap();
  assert_eq!(product["stockQuantity"], json!(0));
  assert_eq!(product["categoryId"], category_id);
  assert_eq!(product["isActive"], json!(true));
  assert!(!product.contains_key("category_id"));

  let rows = m
    .read("Product", &Query::new().filter("categoryId", category_id.clone()))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["sku"], json!("UREA-50"));
  assert_eq!(rows[0]["unitPrice"], json!(32.5));
}

#[tokio::test]
async fn unmapped_field_never_touches_database() {
  let b = backend().await;
  let m = mapper(b.clone());

  let err = m
    .write("Product", &record(json!({ "name": "Urea", "unitPrice": 1, "category": "Nitrogen" })))
    .await
    .unwrap_err();
  assert!(matches!(err, furrow_core::Error::UnmappedField { ref field, .. } if field == "category"));
  assert!(b.sample_row("products").await.unwrap().is_none());
}
