//! Handlers for the location taxonomy and recipe lookups.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/shelves` | |
//! | `GET`  | `/levels` | `?shelf_id` required |
//! | `GET`  | `/positions` | `?level_id` required |
//! | `GET`  | `/position` | `?position_id` required; optional `shelf_id`, `level_id`; 404 if the chain does not connect |
//! | `GET`  | `/locations` | Every position flattened with its shelf and level |
//! | `GET`  | `/fertilizer-recipes` | |

use std::sync::Arc;

use axum::{Json, extract::State};
use kabu_core::{
  location::{Level, Location, Position, PositionLabel, PositionQuery, Shelf},
  store::PlantStore,
  watering::FertilizerRecipe,
};
use serde::Deserialize;

use crate::{error::ApiError, extract::QueryParams};

/// `GET /shelves`
pub async fn shelves<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Shelf>>, ApiError> {
  let shelves = store
    .list_shelves()
    .await
    .map_err(ApiError::store("failed to list shelves"))?;
  Ok(Json(shelves))
}

#[derive(Debug, Deserialize)]
pub struct LevelsParams {
  pub shelf_id: Option<i64>,
}

/// `GET /levels?shelf_id=<id>`
pub async fn levels<S: PlantStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<LevelsParams>,
) -> Result<Json<Vec<Level>>, ApiError> {
  let shelf_id = params.shelf_id.ok_or_else(|| ApiError::missing_param("shelf_id"))?;
  let levels = store
    .list_levels(shelf_id)
    .await
    .map_err(ApiError::store("failed to list levels"))?;
  Ok(Json(levels))
}

#[derive(Debug, Deserialize)]
pub struct PositionsParams {
  pub level_id: Option<i64>,
}

/// `GET /positions?level_id=<id>`
pub async fn positions<S: PlantStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<PositionsParams>,
) -> Result<Json<Vec<Position>>, ApiError> {
  let level_id = params.level_id.ok_or_else(|| ApiError::missing_param("level_id"))?;
  let positions = store
    .list_positions(level_id)
    .await
    .map_err(ApiError::store("failed to list positions"))?;
  Ok(Json(positions))
}

#[derive(Debug, Deserialize)]
pub struct PositionParams {
  pub position_id: Option<i64>,
  pub shelf_id:    Option<i64>,
  pub level_id:    Option<i64>,
}

/// `GET /position?position_id=<id>[&shelf_id=..][&level_id=..]`
pub async fn position<S: PlantStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<PositionParams>,
) -> Result<Json<PositionLabel>, ApiError> {
  let position_id = params
    .position_id
    .ok_or_else(|| ApiError::missing_param("position_id"))?;
  let query = PositionQuery {
    position_id,
    shelf_id: params.shelf_id,
    level_id: params.level_id,
  };

  let label = store
    .resolve_position(query)
    .await
    .map_err(ApiError::store("failed to resolve position"))?
    .ok_or_else(|| ApiError::NotFound("position not found".into()))?;
  Ok(Json(label))
}

/// `GET /locations`
pub async fn locations<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Location>>, ApiError> {
  let locations = store
    .list_locations()
    .await
    .map_err(ApiError::store("failed to list locations"))?;
  Ok(Json(locations))
}

/// `GET /fertilizer-recipes`
pub async fn recipes<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<FertilizerRecipe>>, ApiError> {
  let recipes = store
    .list_fertilizer_recipes()
    .await
    .map_err(ApiError::store("failed to list fertilizer recipes"))?;
  Ok(Json(recipes))
}
