//! The `PlantStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `kabu-store-sqlite`).
//! Higher layers (`kabu-api`, `kabu-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  StoreError,
  lifecycle::{NewPlantState, PlantState},
  location::{Level, Location, Position, PositionLabel, PositionQuery, Shelf},
  plant::{Plant, PlantSummary, Registration},
  watering::{FertilizerRecipe, NewWatering, Watering},
};

/// Abstraction over a Kabu inventory backend.
///
/// Plants, state rows and watering rows are append-only: nothing here updates
/// or deletes. "Current" values are always derived from history.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PlantStore: Send + Sync {
  type Error: StoreError;

  /// Round-trip a trivial statement to prove the backend is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  fn add_shelf(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Shelf, Self::Error>> + Send + '_;

  /// Fails with a not-found error if the shelf does not exist.
  fn add_level(
    &self,
    shelf_id: i64,
    level_number: i64,
  ) -> impl Future<Output = Result<Level, Self::Error>> + Send + '_;

  /// Fails with a not-found error if the level does not exist.
  fn add_position(
    &self,
    level_id: i64,
    position_number: i64,
  ) -> impl Future<Output = Result<Position, Self::Error>> + Send + '_;

  fn list_shelves(
    &self,
  ) -> impl Future<Output = Result<Vec<Shelf>, Self::Error>> + Send + '_;

  /// Levels of one shelf; empty if the shelf has none (or does not exist).
  fn list_levels(
    &self,
    shelf_id: i64,
  ) -> impl Future<Output = Result<Vec<Level>, Self::Error>> + Send + '_;

  /// Positions of one level; empty if the level has none.
  fn list_positions(
    &self,
    level_id: i64,
  ) -> impl Future<Output = Result<Vec<Position>, Self::Error>> + Send + '_;

  /// Join the shelf → level → position chain. `None` if the chain does not
  /// connect.
  fn resolve_position(
    &self,
    query: PositionQuery,
  ) -> impl Future<Output = Result<Option<PositionLabel>, Self::Error>> + Send + '_;

  /// Every position, flattened with its shelf and level.
  fn list_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  // ── Recipes ───────────────────────────────────────────────────────────

  fn add_fertilizer_recipe(
    &self,
    name: String,
    description: Option<String>,
  ) -> impl Future<Output = Result<FertilizerRecipe, Self::Error>> + Send + '_;

  fn list_fertilizer_recipes(
    &self,
  ) -> impl Future<Output = Result<Vec<FertilizerRecipe>, Self::Error>> + Send + '_;

  // ── Registration ──────────────────────────────────────────────────────

  /// Atomically create a plant at a validated position together with its
  /// initial state row.
  ///
  /// Either both rows are written or neither is. Not idempotent: a retried
  /// call after an ambiguous failure may create a second plant.
  fn register_plant(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Plant, Self::Error>> + Send + '_;

  // ── Append-only history ───────────────────────────────────────────────

  /// Append a state row for an existing plant.
  fn record_state(
    &self,
    input: NewPlantState,
  ) -> impl Future<Output = Result<PlantState, Self::Error>> + Send + '_;

  /// Append a watering event for an existing plant.
  fn record_watering(
    &self,
    input: NewWatering,
  ) -> impl Future<Output = Result<Watering, Self::Error>> + Send + '_;

  // ── Derived reads ─────────────────────────────────────────────────────

  /// The state row with the latest `state_date` for `plant_id` (ties go to
  /// the highest id), or `None` if the plant has no state rows.
  fn current_state(
    &self,
    plant_id: i64,
  ) -> impl Future<Output = Result<Option<PlantState>, Self::Error>> + Send + '_;

  /// All plants with their location and current state.
  fn list_plants(
    &self,
  ) -> impl Future<Output = Result<Vec<PlantSummary>, Self::Error>> + Send + '_;

  /// State history, newest first, optionally for one plant.
  fn list_state_history(
    &self,
    plant_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<PlantState>, Self::Error>> + Send + '_;

  /// Watering history, newest first, optionally for one plant.
  fn list_watering_history(
    &self,
    plant_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Watering>, Self::Error>> + Send + '_;

  /// Distinct state types ever recorded, sorted.
  fn list_state_types(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
