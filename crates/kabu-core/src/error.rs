//! Error types for `kabu-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("state type must not be blank")]
  BlankStateType,

  #[error("harvested amount must be a non-negative number, got {0}")]
  InvalidHarvestAmount(f64),

  #[error("watering amount must be a non-negative number, got {0}")]
  InvalidWateringAmount(f64),

  #[error("name must not be blank")]
  BlankName,

  #[error("date {0} is outside years 0000 through 9999")]
  DateOutOfRange(DateTime<Utc>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind { ErrorKind::Invalid }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse classification of a store failure, used by transport layers to pick
/// a status code without knowing the concrete backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced row (position, plant, recipe, ...) does not exist.
  NotFound,
  /// The caller supplied input that can never succeed.
  Invalid,
  /// Anything else: I/O, constraint violations, commit failures.
  Internal,
}

/// Implemented by the error type of every [`crate::store::PlantStore`]
/// backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}
