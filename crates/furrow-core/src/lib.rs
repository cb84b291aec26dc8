//! Core schema-mapping layer for Furrow.
//!
//! Translates entity records between the application's camelCase field names
//! and the backend's snake_case columns, resolves which physical table backs
//! each entity, and reports drift between the registry and the live schema.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`backend::Backend`] in their own crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod backend;
pub mod builtin;
pub mod date;
pub mod discover;
pub mod error;
pub mod mapper;
pub mod query;
pub mod registry;
pub mod resolve;
pub mod translate;

pub use error::{Error, Result};
pub use mapper::{MapperOptions, SchemaMapper};

/// A single row or record, keyed by either logical or storage field names.
pub type Record = serde_json::Map<String, serde_json::Value>;
