//! JSON REST API for Kabu.
//!
//! Exposes an axum [`Router`] backed by any [`kabu_core::store::PlantStore`].
//! CORS, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kabu_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod history;
pub mod locations;
pub mod plants;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use kabu_core::store::PlantStore;
use serde::Serialize;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PlantStore + 'static,
{
  Router::new()
    // Plants
    .route("/plants", get(plants::list::<S>).post(plants::register::<S>))
    // History
    .route(
      "/state-history",
      get(history::list_states::<S>).post(history::record_state::<S>),
    )
    .route(
      "/watering-history",
      get(history::list_waterings::<S>).post(history::record_watering::<S>),
    )
    .route("/state-types", get(history::state_types::<S>))
    // Taxonomy
    .route("/shelves", get(locations::shelves::<S>))
    .route("/levels", get(locations::levels::<S>))
    .route("/positions", get(locations::positions::<S>))
    .route("/position", get(locations::position::<S>))
    .route("/locations", get(locations::locations::<S>))
    .route("/fertilizer-recipes", get(locations::recipes::<S>))
    // Health
    .route("/health", get(health::<S>))
    .with_state(store)
}

#[derive(Debug, Serialize)]
struct Health {
  status: &'static str,
}

/// `GET /health`: 200 once the store answers a trivial query.
async fn health<S: PlantStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Health>, ApiError> {
  store
    .ping()
    .await
    .map_err(ApiError::store("store unavailable"))?;
  Ok(Json(Health { status: "ok" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use kabu_core::{lifecycle::NewPlantState, watering::NewWatering};
  use kabu_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  /// A store seeded with shelf 1 → level 1 → position 1, plus an unrelated
  /// shelf 2 → level 2 → position 2.
  async fn seeded_store() -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for (name, number) in [("A", 1), ("B", 1)] {
      let shelf = store.add_shelf(name.into()).await.unwrap();
      let level = store.add_level(shelf.id, number).await.unwrap();
      store.add_position(level.id, 1).await.unwrap();
    }
    Arc::new(store)
  }

  async fn send(
    store: Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(store)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn register(store: &Arc<SqliteStore>, body: Value) -> (StatusCode, Value) {
    send(store.clone(), "POST", "/plants", Some(body)).await
  }

  // ── Registration ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_201_and_one_state_row() {
    let store = seeded_store().await;
    let (status, body) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plant_id = body["plant_id"].as_i64().expect("numeric plant_id");

    let (status, history) =
      send(store, "GET", &format!("/state-history?plant_id={plant_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["state_type"], "planted");
    assert_eq!(rows[0]["plant_id"], plant_id);
  }

  #[tokio::test]
  async fn register_into_disconnected_chain_returns_404() {
    let store = seeded_store().await;
    // Shelf 2 does not own level 1.
    let (status, body) = register(
      &store,
      json!({ "shelf": 2, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "position not found");

    let (_, plants) = send(store.clone(), "GET", "/plants", None).await;
    assert_eq!(plants, json!([]));
    let (_, states) = send(store, "GET", "/state-history", None).await;
    assert_eq!(states, json!([]));
  }

  #[tokio::test]
  async fn register_with_harvested_amount_sets_weight() {
    let store = seeded_store().await;
    let (_, body) = register(
      &store,
      json!({
        "shelf": 1, "level": 1, "position": 1,
        "state": "harvested", "harvestedAmount": 87.25
      }),
    )
    .await;
    let with_weight = body["plant_id"].as_i64().unwrap();

    let (_, body) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "harvested" }),
    )
    .await;
    let without_weight = body["plant_id"].as_i64().unwrap();

    let (_, h) = send(
      store.clone(),
      "GET",
      &format!("/state-history?plant_id={with_weight}"),
      None,
    )
    .await;
    assert_eq!(h[0]["harvest_weight"], 87.25);

    let (_, h) = send(
      store,
      "GET",
      &format!("/state-history?plant_id={without_weight}"),
      None,
    )
    .await;
    assert!(h[0]["harvest_weight"].is_null());
  }

  #[tokio::test]
  async fn malformed_registration_body_returns_400() {
    let store = seeded_store().await;

    let (status, body) = register(&store, json!({ "shelf": 1, "level": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "  " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(
      &store,
      json!({
        "shelf": 1, "level": 1, "position": 1,
        "state": "harvested", "harvestedAmount": -3.0
      }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, plants) = send(store, "GET", "/plants", None).await;
    assert_eq!(plants, json!([]));
  }

  // ── Plant list ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn plant_list_reports_current_state_and_location() {
    let store = seeded_store().await;
    let (_, body) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;
    let plant_id = body["plant_id"].as_i64().unwrap();

    let later = chrono::Utc::now() + chrono::Duration::hours(1);
    store
      .record_state(NewPlantState::new(plant_id, "flowering").at(later))
      .await
      .unwrap();

    let (status, plants) = send(store, "GET", "/plants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plants[0]["plant_id"], plant_id);
    assert_eq!(plants[0]["shelf"], "A");
    assert_eq!(plants[0]["level"], 1);
    assert_eq!(plants[0]["position"], 1);
    assert_eq!(plants[0]["state_type"], "flowering");
  }

  // ── Required parameters ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn levels_and_positions_require_their_parent_id() {
    let store = seeded_store().await;

    let (status, _) = send(store.clone(), "GET", "/levels", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(store.clone(), "GET", "/positions", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(store.clone(), "GET", "/position", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, levels) = send(store.clone(), "GET", "/levels?shelf_id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels.as_array().unwrap().len(), 1);

    let (status, positions) = send(store, "GET", "/positions?level_id=999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(positions, json!([]));
  }

  #[tokio::test]
  async fn empty_plant_id_means_no_filter() {
    let store = seeded_store().await;
    register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;

    let (status, states) = send(store.clone(), "GET", "/state-history?plant_id=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(states.as_array().unwrap().len(), 1);

    let (status, waterings) = send(store, "GET", "/watering-history?plant_id=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(waterings, json!([]));
  }

  #[tokio::test]
  async fn five_digit_year_is_rejected_and_history_still_lists() {
    let store = seeded_store().await;
    let (_, body) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;
    let plant_id = body["plant_id"].as_i64().unwrap();

    let (status, body) = send(
      store.clone(),
      "POST",
      "/state-history",
      Some(json!({
        "plant_id": plant_id,
        "state_type": "flowering",
        "state_date": "+10000-01-01T00:00:00Z",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
      store.clone(),
      "POST",
      "/watering-history",
      Some(json!({
        "plant_id": plant_id,
        "amount": 5.0,
        "watering_date": "+10000-01-01T00:00:00Z",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, states) = send(store.clone(), "GET", "/state-history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(states.as_array().unwrap().len(), 1);
    let (status, _) = send(store, "GET", "/watering-history", None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn non_numeric_query_param_returns_400() {
    let store = seeded_store().await;
    let (status, body) =
      send(store, "GET", "/watering-history?plant_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn position_lookup_resolves_or_404s() {
    let store = seeded_store().await;

    let (status, label) = send(store.clone(), "GET", "/position?position_id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      label,
      json!({ "shelf_name": "A", "level_number": 1, "position_number": 1 })
    );

    let (status, _) = send(store.clone(), "GET", "/position?position_id=42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
      send(store, "GET", "/position?position_id=1&shelf_id=2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── History ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn watering_history_is_newest_first() {
    let store = seeded_store().await;
    let (_, body) = register(
      &store,
      json!({ "shelf": 1, "level": 1, "position": 1, "state": "planted" }),
    )
    .await;
    let plant_id = body["plant_id"].as_i64().unwrap();

    for date in [
      "2024-06-02T09:00:00Z",
      "2024-06-05T09:00:00Z",
      "2024-06-01T09:00:00Z",
    ] {
      let (status, _) = send(
        store.clone(),
        "POST",
        "/watering-history",
        Some(json!({ "plant_id": plant_id, "amount": 250.0, "watering_date": date })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, rows) = send(
      store,
      "GET",
      &format!("/watering-history?plant_id={plant_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = rows
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["watering_date"].as_str().unwrap())
      .collect();
    assert_eq!(dates.len(), 3);
    assert!(dates[0].starts_with("2024-06-05"));
    assert!(dates[1].starts_with("2024-06-02"));
    assert!(dates[2].starts_with("2024-06-01"));
    assert_eq!(rows[0]["fertilizer_recipe_name"], "");
  }

  #[tokio::test]
  async fn recording_for_unknown_plant_returns_404() {
    let store = seeded_store().await;
    let (status, _) = send(
      store.clone(),
      "POST",
      "/state-history",
      Some(json!({ "plant_id": 77, "state_type": "planted" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
      store,
      "POST",
      "/watering-history",
      Some(json!({ "plant_id": 77, "amount": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn state_types_and_recipes() {
    let store = seeded_store().await;
    for state in ["planted", "dormant", "planted"] {
      register(
        &store,
        json!({ "shelf": 1, "level": 1, "position": 1, "state": state }),
      )
      .await;
    }
    let recipe = store
      .add_fertilizer_recipe("Hyponex".into(), None)
      .await
      .unwrap();
    store
      .record_watering({
        let mut w = NewWatering::new(1, 100.0);
        w.fertilizer_recipe_id = Some(recipe.recipe_id);
        w
      })
      .await
      .unwrap();

    let (_, types) = send(store.clone(), "GET", "/state-types", None).await;
    assert_eq!(types, json!(["dormant", "planted"]));

    let (_, recipes) = send(store.clone(), "GET", "/fertilizer-recipes", None).await;
    assert_eq!(recipes[0]["recipe_name"], "Hyponex");

    let (_, waterings) = send(store, "GET", "/watering-history", None).await;
    assert_eq!(waterings[0]["fertilizer_recipe_name"], "Hyponex");
  }

  // ── Taxonomy & health ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn shelves_and_locations() {
    let store = seeded_store().await;

    let (_, shelves) = send(store.clone(), "GET", "/shelves", None).await;
    assert_eq!(shelves, json!([{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }]));

    let (_, locations) = send(store.clone(), "GET", "/locations", None).await;
    assert_eq!(locations.as_array().unwrap().len(), 2);
    assert_eq!(locations[1]["shelf"], "B");

    let (status, health) = send(store, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
  }

  #[tokio::test]
  async fn internal_errors_do_not_leak_details() {
    let store = seeded_store().await;
    let closed = SqliteStore::clone(&store);
    closed.close().await.unwrap();

    let (status, body) = send(store, "GET", "/plants", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "failed to list plants" }));
  }
}
