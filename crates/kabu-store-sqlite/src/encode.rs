//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that ordering by the text column is chronological.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use kabu_core::{
  lifecycle::PlantState,
  plant::{Plant, PlantSummary},
  watering::Watering,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current instant at the precision the store keeps, so values handed
/// back to callers compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { truncate(Utc::now()) }

/// Drop sub-microsecond precision, matching what [`encode_dt`] persists.
pub fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `plants` row.
pub struct RawPlant {
  pub plant_id:    i64,
  pub position_id: i64,
  pub entry_date:  String,
}

impl RawPlant {
  pub fn into_plant(self) -> Result<Plant> {
    Ok(Plant {
      plant_id:    self.plant_id,
      position_id: self.position_id,
      entry_date:  decode_dt(&self.entry_date)?,
    })
  }
}

/// Raw values of a plant joined with its location chain and current state.
pub struct RawPlantSummary {
  pub plant_id:   i64,
  pub shelf:      String,
  pub level:      i64,
  pub position:   i64,
  pub entry_date: String,
  pub state_type: String,
}

impl RawPlantSummary {
  pub fn into_summary(self) -> Result<PlantSummary> {
    Ok(PlantSummary {
      plant_id:   self.plant_id,
      shelf:      self.shelf,
      level:      self.level,
      position:   self.position,
      entry_date: decode_dt(&self.entry_date)?,
      state_type: self.state_type,
    })
  }
}

/// Raw values read from `plant_states` (or the `current_plant_states` view).
pub struct RawPlantState {
  pub id:             i64,
  pub plant_id:       i64,
  pub state_date:     String,
  pub state_type:     String,
  pub harvest_weight: Option<f64>,
  pub description:    Option<String>,
}

impl RawPlantState {
  /// Column order expected by [`RawPlantState::from_row`].
  pub const COLUMNS: &'static str =
    "id, plant_id, state_date, state_type, harvest_weight, description";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      plant_id:       row.get(1)?,
      state_date:     row.get(2)?,
      state_type:     row.get(3)?,
      harvest_weight: row.get(4)?,
      description:    row.get(5)?,
    })
  }

  pub fn into_state(self) -> Result<PlantState> {
    Ok(PlantState {
      id:             self.id,
      plant_id:       self.plant_id,
      state_date:     decode_dt(&self.state_date)?,
      state_type:     self.state_type,
      harvest_weight: self.harvest_weight,
      description:    self.description,
    })
  }
}

/// Raw values of a `watering_history` row with the recipe name joined in.
pub struct RawWatering {
  pub id:                   i64,
  pub plant_id:             i64,
  pub watering_date:        String,
  pub amount:               f64,
  pub fertilizer_recipe_id: Option<i64>,
  pub recipe_name:          Option<String>,
  pub description:          Option<String>,
}

impl RawWatering {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      plant_id:             row.get(1)?,
      watering_date:        row.get(2)?,
      amount:               row.get(3)?,
      fertilizer_recipe_id: row.get(4)?,
      recipe_name:          row.get(5)?,
      description:          row.get(6)?,
    })
  }

  pub fn into_watering(self) -> Result<Watering> {
    Ok(Watering {
      id:                     self.id,
      plant_id:               self.plant_id,
      watering_date:          decode_dt(&self.watering_date)?,
      amount:                 self.amount,
      fertilizer_recipe_id:   self.fertilizer_recipe_id,
      fertilizer_recipe_name: self.recipe_name.unwrap_or_default(),
      description:            self.description,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = decode_dt("2024-03-01T10:00:00Z").unwrap();
    let later = decode_dt("2024-03-01T10:00:00.5Z").unwrap();
    let (a, b) = (encode_dt(whole), encode_dt(later));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
  }

  #[test]
  fn dt_roundtrip_at_store_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }
}
