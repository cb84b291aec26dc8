//! ISO-8601 normalisation for `date` fields.
//!
//! Timestamps are rendered as UTC RFC 3339 (`2024-03-01T09:30:00Z`, with a
//! fractional part only when non-zero). Date-only values stay `YYYY-MM-DD`.
//! Normalising an already-normalised value returns it unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Postgres text output for `timestamptz`, e.g. `2024-03-01 09:30:00+00`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

fn render(dt: DateTime<Utc>) -> Value {
  Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn normalize_str(s: &str) -> Option<Value> {
  let s = s.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(render(dt.with_timezone(&Utc)));
  }
  for fmt in OFFSET_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
      return Some(render(dt.with_timezone(&Utc)));
    }
  }
  for fmt in NAIVE_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(render(dt.and_utc()));
    }
  }
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(Value::String(d.format("%Y-%m-%d").to_string()));
  }
  None
}

/// Normalise a date value. Returns `None` if the value is not recognisable as
/// a date. `null` is returned as-is; integers are Unix epoch milliseconds.
pub fn normalize(value: &Value) -> Option<Value> {
  match value {
    Value::Null => Some(Value::Null),
    Value::String(s) => normalize_str(s),
    Value::Number(n) => n
      .as_i64()
      .and_then(DateTime::from_timestamp_millis)
      .map(render),
    _ => None,
  }
}
