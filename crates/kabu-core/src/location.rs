//! The location taxonomy: shelf → level → position.
//!
//! Every position belongs to exactly one level and every level to exactly one
//! shelf. Rows are created once and never updated or deleted.

use serde::{Deserialize, Serialize};

/// A physical shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
  pub id:   i64,
  pub name: String,
}

/// One tier of a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
  pub id:           i64,
  pub shelf_id:     i64,
  pub level_number: i64,
}

/// The smallest unit of storage; plants are placed into positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub id:              i64,
  pub level_id:        i64,
  pub position_number: i64,
}

/// Human-readable coordinates of a position, produced by joining the whole
/// chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLabel {
  pub shelf_name:      String,
  pub level_number:    i64,
  pub position_number: i64,
}

/// A flattened view of one position together with its shelf and level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  /// The position id.
  pub location_id: i64,
  pub shelf:       String,
  pub level:       i64,
  pub position:    i64,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::PlantStore::resolve_position`].
///
/// `shelf_id` and `level_id` are optional constraints: when set, the position
/// only resolves if it hangs off that level and shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionQuery {
  pub position_id: i64,
  pub shelf_id:    Option<i64>,
  pub level_id:    Option<i64>,
}

impl PositionQuery {
  /// A lookup keyed by the position id alone.
  pub fn by_id(position_id: i64) -> Self {
    Self { position_id, ..Self::default() }
  }

  /// A lookup that only succeeds for a fully connected triple.
  pub fn chain(shelf_id: i64, level_id: i64, position_id: i64) -> Self {
    Self { position_id, shelf_id: Some(shelf_id), level_id: Some(level_id) }
  }
}
