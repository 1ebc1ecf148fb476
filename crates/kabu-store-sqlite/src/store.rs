//! [`SqliteStore`]: the SQLite implementation of [`PlantStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info};

use kabu_core::{
  lifecycle::{NewPlantState, PlantState, UNSET_STATE},
  location::{Level, Location, Position, PositionLabel, PositionQuery, Shelf},
  plant::{Plant, PlantSummary, Registration},
  store::PlantStore,
  watering::{FertilizerRecipe, NewWatering, Watering},
};

use crate::{
  encode::{
    RawPlant, RawPlantState, RawPlantSummary, RawWatering, encode_dt, now,
    truncate,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Selects the position id of a connected shelf → level → position chain.
/// `?2`/`?3` may be NULL to leave the shelf or level unconstrained.
const RESOLVE_CHAIN: &str = "
  SELECT pos.id, sh.name, l.level_number, pos.position_number
  FROM positions pos
  JOIN levels  l  ON l.id  = pos.level_id
  JOIN shelves sh ON sh.id = l.shelf_id
  WHERE pos.id = ?1
    AND (?2 IS NULL OR sh.id = ?2)
    AND (?3 IS NULL OR l.id  = ?3)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kabu inventory backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Other clones of this store fail from
  /// then on.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single plant row.
  pub async fn get_plant(&self, plant_id: i64) -> Result<Option<Plant>> {
    let raw: Option<RawPlant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT plant_id, position_id, entry_date FROM plants WHERE plant_id = ?1",
              rusqlite::params![plant_id],
              |row| {
                Ok(RawPlant {
                  plant_id:    row.get(0)?,
                  position_id: row.get(1)?,
                  entry_date:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlant::into_plant).transpose()
  }

  /// Run arbitrary SQL against the connection; lets tests install triggers.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Steps 2–5 of registration. The transaction rolls back when `tx` is dropped
/// on any early return; only the final `commit` makes the rows visible.
fn register_in_tx(
  conn: &mut rusqlite::Connection,
  registration: &Registration,
  entry_date: &str,
  harvest_weight: Option<f64>,
) -> Result<(i64, i64)> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let position_id: Option<i64> = tx
    .query_row(
      RESOLVE_CHAIN,
      rusqlite::params![
        registration.position_id,
        registration.shelf_id,
        registration.level_id,
      ],
      |row| row.get(0),
    )
    .optional()?;

  let Some(position_id) = position_id else {
    return Err(Error::PositionNotFound(PositionQuery::chain(
      registration.shelf_id,
      registration.level_id,
      registration.position_id,
    )));
  };

  tx.execute(
    "INSERT INTO plants (position_id, entry_date) VALUES (?1, ?2)",
    rusqlite::params![position_id, entry_date],
  )
  .map_err(Error::CreatePlant)?;
  let plant_id = tx.last_insert_rowid();

  tx.execute(
    "INSERT INTO plant_states (plant_id, state_date, state_type, harvest_weight)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      plant_id,
      entry_date,
      registration.initial_state,
      harvest_weight,
    ],
  )
  .map_err(Error::CreateInitialState)?;

  tx.commit().map_err(Error::Commit)?;
  Ok((plant_id, position_id))
}

fn plant_exists(conn: &rusqlite::Connection, plant_id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM plants WHERE plant_id = ?1",
        rusqlite::params![plant_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// ─── PlantStore impl ─────────────────────────────────────────────────────────

impl PlantStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn add_shelf(&self, name: String) -> Result<Shelf> {
    if name.trim().is_empty() {
      return Err(kabu_core::Error::BlankName.into());
    }

    let stored = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute("INSERT INTO shelves (name) VALUES (?1)", rusqlite::params![stored])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Shelf { id, name })
  }

  async fn add_level(&self, shelf_id: i64, level_number: i64) -> Result<Level> {
    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let shelf_exists = conn
          .query_row(
            "SELECT 1 FROM shelves WHERE id = ?1",
            rusqlite::params![shelf_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !shelf_exists {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO levels (shelf_id, level_number) VALUES (?1, ?2)",
          rusqlite::params![shelf_id, level_number],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or(Error::ShelfNotFound(shelf_id))?;
    Ok(Level { id, shelf_id, level_number })
  }

  async fn add_position(&self, level_id: i64, position_number: i64) -> Result<Position> {
    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let level_exists = conn
          .query_row(
            "SELECT 1 FROM levels WHERE id = ?1",
            rusqlite::params![level_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !level_exists {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO positions (level_id, position_number) VALUES (?1, ?2)",
          rusqlite::params![level_id, position_number],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or(Error::LevelNotFound(level_id))?;
    Ok(Position { id, level_id, position_number })
  }

  async fn list_shelves(&self) -> Result<Vec<Shelf>> {
    let shelves = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM shelves ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(Shelf { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(shelves)
  }

  async fn list_levels(&self, shelf_id: i64) -> Result<Vec<Level>> {
    let levels = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, shelf_id, level_number FROM levels
           WHERE shelf_id = ?1
           ORDER BY level_number",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![shelf_id], |row| {
            Ok(Level {
              id:           row.get(0)?,
              shelf_id:     row.get(1)?,
              level_number: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(levels)
  }

  async fn list_positions(&self, level_id: i64) -> Result<Vec<Position>> {
    let positions = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, level_id, position_number FROM positions
           WHERE level_id = ?1
           ORDER BY position_number",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![level_id], |row| {
            Ok(Position {
              id:              row.get(0)?,
              level_id:        row.get(1)?,
              position_number: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(positions)
  }

  async fn resolve_position(&self, query: PositionQuery) -> Result<Option<PositionLabel>> {
    let label = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              RESOLVE_CHAIN,
              rusqlite::params![query.position_id, query.shelf_id, query.level_id],
              |row| {
                Ok(PositionLabel {
                  shelf_name:      row.get(1)?,
                  level_number:    row.get(2)?,
                  position_number: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(label)
  }

  async fn list_locations(&self) -> Result<Vec<Location>> {
    let locations = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT pos.id, sh.name, l.level_number, pos.position_number
           FROM positions pos
           JOIN levels  l  ON l.id  = pos.level_id
           JOIN shelves sh ON sh.id = l.shelf_id
           ORDER BY sh.id, l.level_number, pos.position_number",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Location {
              location_id: row.get(0)?,
              shelf:       row.get(1)?,
              level:       row.get(2)?,
              position:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(locations)
  }

  // ── Recipes ───────────────────────────────────────────────────────────────

  async fn add_fertilizer_recipe(
    &self,
    name:        String,
    description: Option<String>,
  ) -> Result<FertilizerRecipe> {
    if name.trim().is_empty() {
      return Err(kabu_core::Error::BlankName.into());
    }

    let (stored_name, stored_desc) = (name.clone(), description.clone());
    let recipe_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fertilizer_recipes (recipe_name, description) VALUES (?1, ?2)",
          rusqlite::params![stored_name, stored_desc],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(FertilizerRecipe { recipe_id, recipe_name: name, description })
  }

  async fn list_fertilizer_recipes(&self) -> Result<Vec<FertilizerRecipe>> {
    let recipes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT recipe_id, recipe_name, description FROM fertilizer_recipes
           ORDER BY recipe_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(FertilizerRecipe {
              recipe_id:   row.get(0)?,
              recipe_name: row.get(1)?,
              description: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(recipes)
  }

  // ── Registration ──────────────────────────────────────────────────────────

  async fn register_plant(&self, registration: Registration) -> Result<Plant> {
    registration.validate()?;

    let entry_date     = now();
    let entry_date_str = encode_dt(entry_date);
    let harvest_weight = registration.initial_harvest_weight();
    let initial_state  = registration.initial_state.clone();

    let (plant_id, position_id) = self
      .conn
      .call(move |conn| {
        Ok(register_in_tx(conn, &registration, &entry_date_str, harvest_weight))
      })
      .await??;

    info!(plant_id, position_id, state = %initial_state, "registered plant");
    Ok(Plant { plant_id, position_id, entry_date })
  }

  // ── Append-only history ───────────────────────────────────────────────────

  async fn record_state(&self, input: NewPlantState) -> Result<PlantState> {
    input.validate()?;

    let plant_id       = input.plant_id;
    let state_date     = input.state_date.unwrap_or_else(now);
    let state_date_str = encode_dt(state_date);
    let harvest_weight = input.effective_harvest_weight();
    let state_type     = input.state_type.clone();
    let description    = input.description.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        if !plant_exists(conn, plant_id)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO plant_states
             (plant_id, state_date, state_type, harvest_weight, description)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            plant_id,
            state_date_str,
            state_type,
            harvest_weight,
            description,
          ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or(Error::PlantNotFound(plant_id))?;
    debug!(plant_id, state_id = id, "recorded plant state");

    Ok(PlantState {
      id,
      plant_id,
      state_date: truncate(state_date),
      state_type: input.state_type,
      harvest_weight,
      description: input.description,
    })
  }

  async fn record_watering(&self, input: NewWatering) -> Result<Watering> {
    input.validate()?;

    let plant_id          = input.plant_id;
    let recipe_id         = input.fertilizer_recipe_id;
    let amount            = input.amount;
    let watering_date     = input.watering_date.unwrap_or_else(now);
    let watering_date_str = encode_dt(watering_date);
    let description       = input.description.clone();

    let outcome: std::result::Result<(i64, Option<String>), Error> = self
      .conn
      .call(move |conn| {
        if !plant_exists(conn, plant_id)? {
          return Ok(Err(Error::PlantNotFound(plant_id)));
        }
        let recipe_name = match recipe_id {
          Some(rid) => {
            let name: Option<String> = conn
              .query_row(
                "SELECT recipe_name FROM fertilizer_recipes WHERE recipe_id = ?1",
                rusqlite::params![rid],
                |row| row.get(0),
              )
              .optional()?;
            match name {
              Some(n) => Some(n),
              None => return Ok(Err(Error::RecipeNotFound(rid))),
            }
          }
          None => None,
        };
        conn.execute(
          "INSERT INTO watering_history
             (plant_id, watering_date, amount, fertilizer_recipe_id, description)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            plant_id,
            watering_date_str,
            amount,
            recipe_id,
            description,
          ],
        )?;
        Ok(Ok((conn.last_insert_rowid(), recipe_name)))
      })
      .await?;

    let (id, recipe_name) = outcome?;
    debug!(plant_id, watering_id = id, "recorded watering");

    Ok(Watering {
      id,
      plant_id,
      watering_date: truncate(watering_date),
      amount,
      fertilizer_recipe_id: recipe_id,
      fertilizer_recipe_name: recipe_name.unwrap_or_default(),
      description: input.description,
    })
  }

  // ── Derived reads ─────────────────────────────────────────────────────────

  async fn current_state(&self, plant_id: i64) -> Result<Option<PlantState>> {
    let raw: Option<RawPlantState> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM current_plant_states WHERE plant_id = ?1",
          RawPlantState::COLUMNS,
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![plant_id], RawPlantState::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlantState::into_state).transpose()
  }

  async fn list_plants(&self) -> Result<Vec<PlantSummary>> {
    let raws: Vec<RawPlantSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.plant_id, sh.name, l.level_number, pos.position_number,
                  p.entry_date, COALESCE(cs.state_type, ?1)
           FROM plants p
           JOIN positions pos ON pos.id = p.position_id
           JOIN levels    l   ON l.id   = pos.level_id
           JOIN shelves   sh  ON sh.id  = l.shelf_id
           LEFT JOIN current_plant_states cs ON cs.plant_id = p.plant_id
           ORDER BY p.plant_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![UNSET_STATE], |row| {
            Ok(RawPlantSummary {
              plant_id:   row.get(0)?,
              shelf:      row.get(1)?,
              level:      row.get(2)?,
              position:   row.get(3)?,
              entry_date: row.get(4)?,
              state_type: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlantSummary::into_summary).collect()
  }

  async fn list_state_history(&self, plant_id: Option<i64>) -> Result<Vec<PlantState>> {
    let raws: Vec<RawPlantState> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM plant_states
           WHERE (?1 IS NULL OR plant_id = ?1)
           ORDER BY state_date DESC, id DESC",
          RawPlantState::COLUMNS,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![plant_id], RawPlantState::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlantState::into_state).collect()
  }

  async fn list_watering_history(&self, plant_id: Option<i64>) -> Result<Vec<Watering>> {
    let raws: Vec<RawWatering> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT w.id, w.plant_id, w.watering_date, w.amount,
                  w.fertilizer_recipe_id, f.recipe_name, w.description
           FROM watering_history w
           LEFT JOIN fertilizer_recipes f ON f.recipe_id = w.fertilizer_recipe_id
           WHERE (?1 IS NULL OR w.plant_id = ?1)
           ORDER BY w.watering_date DESC, w.id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![plant_id], RawWatering::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWatering::into_watering).collect()
  }

  async fn list_state_types(&self) -> Result<Vec<String>> {
    let types = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT state_type FROM plant_states ORDER BY state_type",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(types)
  }
}
