//! `furrow` — inspect and exercise the schema mapper against a live backend.
//!
//! # Usage
//!
//! ```
//! furrow --config furrow.toml discover --sql
//! furrow map Product --json '{"name":"Urea 46%","categoryId":"c1"}'
//! furrow read Product --filter isActive=true --order name --limit 20
//! ```

mod commands;
mod settings;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use furrow_core::{SchemaMapper, backend::Backend, registry::Registry};
use furrow_store_rest::RestBackend;
use furrow_store_sqlite::SqliteBackend;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{BackendConfig, FurrowConfig};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "furrow", version, about = "Furrow schema mapper")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "furrow.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
pub enum Command {
  /// List registered entities and their candidate tables.
  Entities,

  /// Compare the registry against the live schema.
  Discover {
    /// A single entity; all entities when omitted.
    entity: Option<String>,
    /// Print reports as JSON.
    #[arg(long)]
    json:   bool,
    /// Print `ALTER TABLE` statements for missing columns.
    #[arg(long)]
    sql:    bool,
  },

  /// Print the table an entity is bound to.
  Resolve { entity: String },

  /// Translate a record without touching the backend.
  Map {
    entity:  String,
    /// Record as a JSON object.
    #[arg(long)]
    json:    String,
    /// Treat the input as a storage row and translate it to logical names.
    #[arg(long)]
    reverse: bool,
  },

  /// Read records, using logical field names.
  Read {
    entity: String,
    /// Equality filter `field=value`; repeatable.
    #[arg(long)]
    filter: Vec<String>,
    /// Sort key `field[:asc|:desc]`.
    #[arg(long)]
    order:  Option<String>,
    #[arg(long)]
    limit:  Option<usize>,
  },

  /// Write a logical record and print it as stored.
  Write {
    entity: String,
    #[arg(long)]
    json:   String,
  },

  /// Create the retail tables in a SQLite database.
  Init,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = FurrowConfig::load(&cli.config)?;

  let registry = match &cfg.registry_path {
    Some(path) => {
      let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read registry {path:?}"))?;
      Registry::from_toml(&source).with_context(|| format!("invalid registry {path:?}"))?
    }
    None => Registry::builtin().context("built-in registry is invalid")?,
  };
  let registry = Arc::new(registry);

  match &cfg.backend {
    BackendConfig::Sqlite { path } => {
      let backend = SqliteBackend::open(path)
        .await
        .with_context(|| format!("failed to open database at {path:?}"))?;

      if matches!(cli.command, Command::Init) {
        backend
          .init_retail_schema()
          .await
          .context("failed to apply retail schema")?;
        tracing::info!(path = %path.display(), "retail schema applied");
        return Ok(ExitCode::SUCCESS);
      }

      run_with(registry, backend, &cfg, cli.command).await
    }
    BackendConfig::Rest(rest) => {
      let backend = RestBackend::new(rest.clone()).context("failed to build HTTP client")?;
      run_with(registry, backend, &cfg, cli.command).await
    }
  }
}

async fn run_with<B: Backend>(
  registry: Arc<Registry>,
  backend: B,
  cfg: &FurrowConfig,
  command: Command,
) -> anyhow::Result<ExitCode> {
  let mapper = SchemaMapper::new(registry, Arc::new(backend), cfg.mapper_options());
  commands::run(&mapper, command).await
}
