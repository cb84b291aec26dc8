//! Error type for `furrow-store-rest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// Non-2xx response; `body` carries the gateway's error payload
  /// (e.g. `{"code":"42P01","message":"relation ... does not exist"}`).
  #[error("gateway returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  /// The insert succeeded but row-level security hid the returned row.
  #[error("write to {0:?} returned no row")]
  EmptyResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
