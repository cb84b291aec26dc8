//! SQLite backend for the Furrow schema mapper.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::RETAIL_SCHEMA;
pub use store::SqliteBackend;

#[cfg(test)]
mod tests;
