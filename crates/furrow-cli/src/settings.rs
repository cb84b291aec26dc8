//! Runtime configuration, layered from `furrow.toml` and `FURROW_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use furrow_core::MapperOptions;
use furrow_store_rest::RestConfig;
use serde::Deserialize;

fn default_probe_timeout_ms() -> u64 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct FurrowConfig {
  pub backend:          BackendConfig,
  #[serde(default = "default_probe_timeout_ms")]
  pub probe_timeout_ms: u64,
  /// Deployment-owned registry file; the built-in registry when absent.
  #[serde(default)]
  pub registry_path:    Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
  Sqlite { path: PathBuf },
  Rest(RestConfig),
}

impl FurrowConfig {
  /// Read `path` (if it exists) under `FURROW_`-prefixed environment
  /// variables, e.g. `FURROW_BACKEND__KIND=rest`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(environment())
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise FurrowConfig")?;
    cfg.expand_paths();
    Ok(cfg)
  }

  pub fn mapper_options(&self) -> MapperOptions {
    MapperOptions { probe_timeout: Duration::from_millis(self.probe_timeout_ms) }
  }

  fn expand_paths(&mut self) {
    if let BackendConfig::Sqlite { path } = &mut self.backend {
      *path = expand_tilde(path);
    }
    if let Some(path) = &mut self.registry_path {
      *path = expand_tilde(path);
    }
  }
}

fn environment() -> config::Environment {
  config::Environment::with_prefix("FURROW")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> FurrowConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn sqlite_backend_with_defaults() {
    let cfg = parse(
      r#"
      [backend]
      kind = "sqlite"
      path = "pos.db"
      "#,
    );
    assert!(matches!(&cfg.backend, BackendConfig::Sqlite { path } if path == Path::new("pos.db")));
    assert_eq!(cfg.mapper_options().probe_timeout, Duration::from_secs(5));
    assert!(cfg.registry_path.is_none());
  }

  #[test]
  fn rest_backend() {
    let cfg = parse(
      r#"
      probe_timeout_ms = 750
      registry_path = "registry.toml"

      [backend]
      kind = "rest"
      url = "https://demo.supabase.co"
      api_key = "anon"
      "#,
    );
    let BackendConfig::Rest(rest) = &cfg.backend else {
      panic!("expected rest backend, got {:?}", cfg.backend);
    };
    assert_eq!(rest.url, "https://demo.supabase.co");
    assert_eq!(rest.timeout_secs, 30);
    assert_eq!(cfg.mapper_options().probe_timeout, Duration::from_millis(750));
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/pos.db")), PathBuf::from(home).join("pos.db"));
    assert_eq!(expand_tilde(Path::new("/srv/pos.db")), PathBuf::from("/srv/pos.db"));
  }
}
