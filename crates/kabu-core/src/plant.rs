//! Plants and the registration request that creates them.
//!
//! A plant is bound to one position for its whole life; there is no relocation
//! operation. Its lifecycle lives in the state history (see
//! [`crate::lifecycle`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  lifecycle::{harvest_weight_for, validate_harvest_amount, validate_state_type},
};

/// A physical plant as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
  pub plant_id:    i64,
  pub position_id: i64,
  pub entry_date:  DateTime<Utc>,
}

/// A plant joined with its location and its current state: the row shape of
/// the plant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSummary {
  pub plant_id:   i64,
  pub shelf:      String,
  pub level:      i64,
  pub position:   i64,
  pub entry_date: DateTime<Utc>,
  /// [`crate::lifecycle::UNSET_STATE`] when the plant has no state rows.
  pub state_type: String,
}

/// Input to [`crate::store::PlantStore::register_plant`].
///
/// The three ids must form a connected shelf → level → position chain.
#[derive(Debug, Clone)]
pub struct Registration {
  pub shelf_id:         i64,
  pub level_id:         i64,
  pub position_id:      i64,
  pub initial_state:    String,
  pub harvested_amount: Option<f64>,
}

impl Registration {
  pub fn new(
    shelf_id: i64,
    level_id: i64,
    position_id: i64,
    initial_state: impl Into<String>,
  ) -> Self {
    Self {
      shelf_id,
      level_id,
      position_id,
      initial_state: initial_state.into(),
      harvested_amount: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate_state_type(&self.initial_state)?;
    if let Some(amount) = self.harvested_amount {
      validate_harvest_amount(amount)?;
    }
    Ok(())
  }

  /// The `harvest_weight` of the initial state row: the supplied amount when
  /// the plant is registered as harvested, otherwise unset.
  pub fn initial_harvest_weight(&self) -> Option<f64> {
    harvest_weight_for(&self.initial_state, self.harvested_amount)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lifecycle::HARVESTED_STATE;

  #[test]
  fn harvested_registration_carries_amount() {
    let mut r = Registration::new(1, 1, 1, HARVESTED_STATE);
    r.harvested_amount = Some(40.0);
    assert_eq!(r.initial_harvest_weight(), Some(40.0));
  }

  #[test]
  fn amount_ignored_for_other_states() {
    let mut r = Registration::new(1, 1, 1, "planted");
    r.harvested_amount = Some(40.0);
    assert_eq!(r.initial_harvest_weight(), None);
    assert!(r.validate().is_ok());
  }

  #[test]
  fn summary_serialises_with_snake_case_fields() {
    let summary = PlantSummary {
      plant_id:   7,
      shelf:      "A".into(),
      level:      2,
      position:   3,
      entry_date: DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc),
      state_type: "planted".into(),
    };
    let v = serde_json::to_value(&summary).unwrap();
    assert_eq!(v["plant_id"], 7);
    assert_eq!(v["state_type"], "planted");
    assert_eq!(v["shelf"], "A");
  }
}
