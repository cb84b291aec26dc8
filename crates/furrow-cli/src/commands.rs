//! Subcommand implementations, generic over the configured backend.

use std::process::ExitCode;

use anyhow::{Context as _, bail};
use furrow_core::{Record, SchemaMapper, backend::Backend, query::Query};
use serde_json::Value;

use crate::Command;

pub async fn run<B: Backend>(mapper: &SchemaMapper<B>, command: Command) -> anyhow::Result<ExitCode> {
  match command {
    Command::Entities => {
      for entity in mapper.registry().entities() {
        let tables: Vec<String> = entity
          .candidates_in_order()
          .into_iter()
          .map(|c| format!("{} ({})", c.table, c.priority))
          .collect();
        println!("{:<14} {}", entity.name, tables.join(", "));
      }
    }

    Command::Discover { entity, json, sql } => {
      let reports = match entity {
        Some(name) => vec![mapper.discover(&name).await?],
        None => mapper.discover_all().await,
      };

      if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
      } else {
        for report in &reports {
          print!("{report}");
        }
      }

      if sql {
        for report in &reports {
          let entity = mapper.registry().get_entity(&report.entity)?;
          for line in report.suggested_sql(entity) {
            println!("{line}");
          }
        }
      }

      let blocking = reports.iter().filter(|r| r.is_blocking()).count();
      if blocking > 0 {
        tracing::warn!(blocking, "discovery found blocking discrepancies");
        return Ok(ExitCode::FAILURE);
      }
    }

    Command::Resolve { entity } => {
      let bound = mapper.resolve(&entity).await?;
      println!("{} -> {} (priority {})", bound.entity, bound.table, bound.priority);
    }

    Command::Map { entity, json, reverse } => {
      let record = parse_record(&json)?;
      let mapped = if reverse {
        mapper.from_storage(&entity, &record)?
      } else {
        mapper.to_storage(&entity, &record)?
      };
      println!("{}", serde_json::to_string_pretty(&mapped)?);
    }

    Command::Read { entity, filter, order, limit } => {
      let query = build_query(&filter, order.as_deref(), limit)?;
      let rows = mapper.read(&entity, &query).await?;
      println!("{}", serde_json::to_string_pretty(&rows)?);
    }

    Command::Write { entity, json } => {
      let record = parse_record(&json)?;
      let stored = mapper.write(&entity, &record).await?;
      println!("{}", serde_json::to_string_pretty(&stored)?);
    }

    // Handled before the mapper is built.
    Command::Init => bail!("init is only supported for the sqlite backend"),
  }

  Ok(ExitCode::SUCCESS)
}

fn parse_record(json: &str) -> anyhow::Result<Record> {
  serde_json::from_str(json).context("--json must be a JSON object")
}

/// `field=value`; the value is read as JSON when it parses, otherwise as a
/// plain string. Quote it (`name="42"`) to force a string.
fn parse_filter(arg: &str) -> anyhow::Result<(String, Value)> {
  let Some((field, raw)) = arg.split_once('=') else {
    bail!("filter {arg:?} is not of the form field=value");
  };
  if field.is_empty() {
    bail!("filter {arg:?} has no field name");
  }
  let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
  Ok((field.to_owned(), value))
}

/// `field`, `field:asc` or `field:desc`.
fn parse_order(arg: &str) -> anyhow::Result<(String, bool)> {
  match arg.rsplit_once(':') {
    None => Ok((arg.to_owned(), false)),
    Some((field, "asc")) => Ok((field.to_owned(), false)),
    Some((field, "desc")) => Ok((field.to_owned(), true)),
    Some((_, dir)) => bail!("unknown sort direction {dir:?} (expected asc or desc)"),
  }
}

fn build_query(filters: &[String], order: Option<&str>, limit: Option<usize>) -> anyhow::Result<Query> {
  let mut query = Query::new();
  for arg in filters {
    let (field, value) = parse_filter(arg)?;
    query = query.filter(field, value);
  }
  if let Some(order) = order {
    let (field, descending) = parse_order(order)?;
    query = query.order_by(field, descending);
  }
  query.limit = limit;
  Ok(query)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn filter_values_are_json_when_possible() {
    assert_eq!(parse_filter("isActive=true").unwrap(), ("isActive".into(), json!(true)));
    assert_eq!(parse_filter("stock=0").unwrap(), ("stock".into(), json!(0)));
    assert_eq!(parse_filter("sku=\"0042\"").unwrap(), ("sku".into(), json!("0042")));
    assert_eq!(parse_filter("name=Urea 46%").unwrap(), ("name".into(), json!("Urea 46%")));
    assert_eq!(parse_filter("notes=a=b").unwrap(), ("notes".into(), json!("a=b")));
  }

  #[test]
  fn malformed_filters_are_rejected() {
    assert!(parse_filter("isActive").is_err());
    assert!(parse_filter("=true").is_err());
  }

  #[test]
  fn order_directions() {
    assert_eq!(parse_order("createdAt").unwrap(), ("createdAt".into(), false));
    assert_eq!(parse_order("createdAt:desc").unwrap(), ("createdAt".into(), true));
    assert_eq!(parse_order("name:asc").unwrap(), ("name".into(), false));
    assert!(parse_order("name:sideways").is_err());
  }

  #[test]
  fn query_from_args() {
    let q = build_query(&["categoryId=null".to_owned()], Some("name"), Some(10)).unwrap();
    assert_eq!(q, Query::new().filter("categoryId", Value::Null).order_by("name", false).limit(10));
  }

  #[test]
  fn record_must_be_an_object() {
    assert!(parse_record(r#"{"name":"Seeds"}"#).is_ok());
    assert!(parse_record("[1,2]").is_err());
  }
}
