//! Handlers for the append-only history endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/state-history` | Optional `?plant_id`; newest first |
//! | `POST` | `/state-history` | Body: [`NewStateBody`]; returns 201 + row |
//! | `GET`  | `/watering-history` | Optional `?plant_id`; newest first |
//! | `POST` | `/watering-history` | Body: [`NewWateringBody`]; returns 201 + row |
//! | `GET`  | `/state-types` | Sorted distinct state types |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use kabu_core::{
  lifecycle::{NewPlantState, PlantState},
  store::PlantStore,
  watering::{NewWatering, Watering},
};
use serde::{Deserialize, Deserializer};

use crate::{
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

#[derive(Debug, Deserialize, Default)]
pub struct HistoryParams {
  /// `?plant_id=` with no value means no filter.
  #[serde(default, deserialize_with = "empty_as_none")]
  pub plant_id: Option<i64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
  }
}

// ─── State history ────────────────────────────────────────────────────────────

/// `GET /state-history[?plant_id=<id>]`
pub async fn list_states<S: PlantStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<Vec<PlantState>>, ApiError> {
  let states = store
    .list_state_history(params.plant_id)
    .await
    .map_err(ApiError::store("failed to list state history"))?;
  Ok(Json(states))
}

#[derive(Debug, Deserialize)]
pub struct NewStateBody {
  pub plant_id:       i64,
  pub state_type:     String,
  pub state_date:     Option<DateTime<Utc>>,
  pub harvest_weight: Option<f64>,
  pub description:    Option<String>,
}

impl From<NewStateBody> for NewPlantState {
  fn from(b: NewStateBody) -> Self {
    NewPlantState {
      plant_id:       b.plant_id,
      state_type:     b.state_type,
      state_date:     b.state_date,
      harvest_weight: b.harvest_weight,
      description:    b.description,
    }
  }
}

/// `POST /state-history`: append a lifecycle transition.
pub async fn record_state<S: PlantStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewStateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let state = store
    .record_state(NewPlantState::from(body))
    .await
    .map_err(ApiError::store("failed to record state"))?;
  Ok((StatusCode::CREATED, Json(state)))
}

/// `GET /state-types`
pub async fn state_types<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<String>>, ApiError> {
  let types = store
    .list_state_types()
    .await
    .map_err(ApiError::store("failed to list state types"))?;
  Ok(Json(types))
}

// ─── Watering history ─────────────────────────────────────────────────────────

/// `GET /watering-history[?plant_id=<id>]`
pub async fn list_waterings<S: PlantStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<Vec<Watering>>, ApiError> {
  let waterings = store
    .list_watering_history(params.plant_id)
    .await
    .map_err(ApiError::store("failed to list watering history"))?;
  Ok(Json(waterings))
}

#[derive(Debug, Deserialize)]
pub struct NewWateringBody {
  pub plant_id:             i64,
  pub amount:               f64,
  pub watering_date:        Option<DateTime<Utc>>,
  pub fertilizer_recipe_id: Option<i64>,
  pub description:          Option<String>,
}

impl From<NewWateringBody> for NewWatering {
  fn from(b: NewWateringBody) -> Self {
    NewWatering {
      plant_id:             b.plant_id,
      amount:               b.amount,
      watering_date:        b.watering_date,
      fertilizer_recipe_id: b.fertilizer_recipe_id,
      description:          b.description,
    }
  }
}

/// `POST /watering-history`: append a watering event.
pub async fn record_watering<S: PlantStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewWateringBody>,
) -> Result<impl IntoResponse, ApiError> {
  let watering = store
    .record_watering(NewWatering::from(body))
    .await
    .map_err(ApiError::store("failed to record watering"))?;
  Ok((StatusCode::CREATED, Json(watering)))
}
