//! PostgREST backend for the Furrow schema mapper.
//!
//! Talks to the hosted Postgres service over its REST gateway
//! (`{url}/rest/v1/{table}`), authenticating with the project API key. The
//! gateway exposes no column introspection to ordinary keys, so discovery
//! relies on sampled rows.

mod client;

pub mod error;

pub use client::{RestBackend, RestConfig};
pub use error::{Error, Result};
