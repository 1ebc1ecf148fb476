//! Error type for `kabu-server` setup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("invalid frontend origin {0:?}")]
  InvalidOrigin(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
