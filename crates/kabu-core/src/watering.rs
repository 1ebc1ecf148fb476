//! Watering events and the fertilizer recipes they may reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, lifecycle::validate_event_date};

/// A named fertilizer mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerRecipe {
  pub recipe_id:   i64,
  pub recipe_name: String,
  pub description: Option<String>,
}

/// One append-only watering event, with the recipe name resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watering {
  pub id:                     i64,
  pub plant_id:               i64,
  pub watering_date:          DateTime<Utc>,
  pub amount:                 f64,
  pub fertilizer_recipe_id:   Option<i64>,
  /// Empty when no recipe was used.
  pub fertilizer_recipe_name: String,
  pub description:            Option<String>,
}

/// Input to [`crate::store::PlantStore::record_watering`].
#[derive(Debug, Clone)]
pub struct NewWatering {
  pub plant_id:             i64,
  pub amount:               f64,
  /// Defaults to the time of recording.
  pub watering_date:        Option<DateTime<Utc>>,
  pub fertilizer_recipe_id: Option<i64>,
  pub description:          Option<String>,
}

impl NewWatering {
  pub fn new(plant_id: i64, amount: f64) -> Self {
    Self {
      plant_id,
      amount,
      watering_date: None,
      fertilizer_recipe_id: None,
      description: None,
    }
  }

  pub fn at(mut self, watering_date: DateTime<Utc>) -> Self {
    self.watering_date = Some(watering_date);
    self
  }

  pub fn validate(&self) -> Result<()> {
    if !self.amount.is_finite() || self.amount < 0.0 {
      return Err(Error::InvalidWateringAmount(self.amount));
    }
    if let Some(date) = self.watering_date {
      validate_event_date(date)?;
    }
    Ok(())
  }
}
