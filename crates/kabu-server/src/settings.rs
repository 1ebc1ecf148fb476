//! Runtime server configuration.
//!
//! Read from a TOML file (missing file is fine) and overlaid with `KABU_*`
//! environment variables, e.g. `KABU_PORT=9000`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Deserialised from `config.toml` plus the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// SQLite file; a leading `~/` is expanded.
  pub database_path:   PathBuf,
  /// The only origin allowed to make cross-origin requests.
  pub frontend_origin: String,
}

impl ServerConfig {
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080_i64)?
      .set_default("database_path", "kabu.db")?
      .set_default("frontend_origin", "http://localhost:3000")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("KABU"))
      .build()?;

    Ok(settings.try_deserialize()?)
  }

  /// `database_path` with `~` expanded.
  pub fn resolved_database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
