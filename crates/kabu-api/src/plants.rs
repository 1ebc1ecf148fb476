//! Handlers for `/plants`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plants` | Every plant with its location and current state |
//! | `POST` | `/plants` | Body: [`RegisterBody`]; returns 201 + `{"plant_id": ..}` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kabu_core::{
  plant::{PlantSummary, Registration},
  store::PlantStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extract::JsonBody};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /plants`
pub async fn list<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PlantSummary>>, ApiError> {
  let plants = store
    .list_plants()
    .await
    .map_err(ApiError::store("failed to list plants"))?;
  Ok(Json(plants))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /plants`. Location fields are ids.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub shelf:            i64,
  pub level:            i64,
  pub position:         i64,
  pub state:            String,
  /// Only kept when `state` is `harvested`.
  #[serde(rename = "harvestedAmount", default)]
  pub harvested_amount: Option<f64>,
}

impl From<RegisterBody> for Registration {
  fn from(b: RegisterBody) -> Self {
    Registration {
      shelf_id:         b.shelf,
      level_id:         b.level,
      position_id:      b.position,
      initial_state:    b.state,
      harvested_amount: b.harvested_amount,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct Registered {
  pub plant_id: i64,
}

/// `POST /plants`: 201 on success; 404 if the shelf/level/position ids do not
/// form a connected chain. A non-2xx response means nothing was written.
pub async fn register<S: PlantStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let plant = store
    .register_plant(Registration::from(body))
    .await
    .map_err(ApiError::store("failed to register plant"))?;
  Ok((StatusCode::CREATED, Json(Registered { plant_id: plant.plant_id })))
}
