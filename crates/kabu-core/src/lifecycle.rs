//! Lifecycle state history.
//!
//! State rows are immutable facts. A plant's current state is never stored;
//! it is the row with the greatest `state_date` for that plant, computed at
//! query time. When two rows share the greatest `state_date`, the one with the
//! higher `id` (the later insert) wins.

use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reported as the current state of a plant that has no state rows.
pub const UNSET_STATE: &str = "unset";

/// The state type that carries a harvest weight.
pub const HARVESTED_STATE: &str = "harvested";

/// Whether `state_type` is the harvested sentinel.
pub fn is_harvested(state_type: &str) -> bool { state_type == HARVESTED_STATE }

/// One entry in a plant's append-only state history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
  pub id:             i64,
  pub plant_id:       i64,
  pub state_date:     DateTime<Utc>,
  pub state_type:     String,
  /// Only ever set on `harvested` rows.
  pub harvest_weight: Option<f64>,
  pub description:    Option<String>,
}

/// Input to [`crate::store::PlantStore::record_state`].
#[derive(Debug, Clone)]
pub struct NewPlantState {
  pub plant_id:       i64,
  pub state_type:     String,
  /// Defaults to the time of recording.
  pub state_date:     Option<DateTime<Utc>>,
  pub harvest_weight: Option<f64>,
  pub description:    Option<String>,
}

impl NewPlantState {
  pub fn new(plant_id: i64, state_type: impl Into<String>) -> Self {
    Self {
      plant_id,
      state_type: state_type.into(),
      state_date: None,
      harvest_weight: None,
      description: None,
    }
  }

  pub fn at(mut self, state_date: DateTime<Utc>) -> Self {
    self.state_date = Some(state_date);
    self
  }

  pub fn validate(&self) -> Result<()> {
    validate_state_type(&self.state_type)?;
    if let Some(w) = self.harvest_weight {
      validate_harvest_amount(w)?;
    }
    if let Some(date) = self.state_date {
      validate_event_date(date)?;
    }
    Ok(())
  }

  /// The weight to persist: dropped unless this is a harvested state.
  pub fn effective_harvest_weight(&self) -> Option<f64> {
    harvest_weight_for(&self.state_type, self.harvest_weight)
  }
}

pub(crate) fn validate_state_type(state_type: &str) -> Result<()> {
  if state_type.trim().is_empty() {
    return Err(Error::BlankStateType);
  }
  Ok(())
}

pub(crate) fn validate_harvest_amount(amount: f64) -> Result<()> {
  if !amount.is_finite() || amount < 0.0 {
    return Err(Error::InvalidHarvestAmount(amount));
  }
  Ok(())
}

/// Event dates are stored as four-digit-year RFC 3339 text, which only sorts
/// chronologically (and parses back) inside this range.
pub(crate) fn validate_event_date(date: DateTime<Utc>) -> Result<()> {
  if !(0..=9999).contains(&date.year()) {
    return Err(Error::DateOutOfRange(date));
  }
  Ok(())
}

pub(crate) fn harvest_weight_for(
  state_type: &str,
  amount: Option<f64>,
) -> Option<f64> {
  if is_harvested(state_type) { amount } else { None }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn harvest_weight_only_kept_for_harvested() {
    let mut s = NewPlantState::new(1, "planted");
    s.harvest_weight = Some(12.5);
    assert_eq!(s.effective_harvest_weight(), None);

    s.state_type = HARVESTED_STATE.into();
    assert_eq!(s.effective_harvest_weight(), Some(12.5));
  }

  #[test]
  fn blank_state_is_rejected() {
    let s = NewPlantState::new(1, "   ");
    assert!(matches!(s.validate(), Err(Error::BlankStateType)));
  }

  #[test]
  fn negative_or_nan_weight_is_rejected() {
    let mut s = NewPlantState::new(1, HARVESTED_STATE);
    s.harvest_weight = Some(-1.0);
    assert!(matches!(s.validate(), Err(Error::InvalidHarvestAmount(_))));
    s.harvest_weight = Some(f64::NAN);
    assert!(s.validate().is_err());
  }

  #[test]
  fn dates_beyond_four_digit_years_are_rejected() {
    use chrono::TimeZone as _;

    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let s = NewPlantState::new(1, "planted").at(far);
    assert!(matches!(s.validate(), Err(Error::DateOutOfRange(_))));

    let before_zero = Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap();
    let w = crate::watering::NewWatering::new(1, 5.0).at(before_zero);
    assert!(matches!(w.validate(), Err(Error::DateOutOfRange(_))));

    let edge = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
    assert!(NewPlantState::new(1, "planted").at(edge).validate().is_ok());
  }
}
