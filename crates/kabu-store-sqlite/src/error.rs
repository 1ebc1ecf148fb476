//! Error type for `kabu-store-sqlite`.

use kabu_core::{ErrorKind, StoreError, location::PositionQuery};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Core(#[from] kabu_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The shelf → level → position chain does not connect.
  #[error("position not found")]
  PositionNotFound(PositionQuery),

  #[error("shelf not found: {0}")]
  ShelfNotFound(i64),

  #[error("level not found: {0}")]
  LevelNotFound(i64),

  #[error("plant not found: {0}")]
  PlantNotFound(i64),

  #[error("fertilizer recipe not found: {0}")]
  RecipeNotFound(i64),

  #[error("failed to create plant")]
  CreatePlant(#[source] rusqlite::Error),

  #[error("failed to record initial state")]
  CreateInitialState(#[source] rusqlite::Error),

  #[error("failed to commit registration")]
  Commit(#[source] rusqlite::Error),
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::PositionNotFound(_)
      | Error::ShelfNotFound(_)
      | Error::LevelNotFound(_)
      | Error::PlantNotFound(_)
      | Error::RecipeNotFound(_) => ErrorKind::NotFound,
      Error::Database(_)
      | Error::Sqlite(_)
      | Error::DateParse(_)
      | Error::CreatePlant(_)
      | Error::CreateInitialState(_)
      | Error::Commit(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
