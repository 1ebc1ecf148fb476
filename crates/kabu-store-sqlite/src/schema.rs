//! SQL schema for the Kabu SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS shelves (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS levels (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    shelf_id      INTEGER NOT NULL REFERENCES shelves(id),
    level_number  INTEGER NOT NULL,
    UNIQUE (shelf_id, level_number)
);

CREATE TABLE IF NOT EXISTS positions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    level_id         INTEGER NOT NULL REFERENCES levels(id),
    position_number  INTEGER NOT NULL,
    UNIQUE (level_id, position_number)
);

-- Several plants may share a position; position_id never changes.
CREATE TABLE IF NOT EXISTS plants (
    plant_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    position_id  INTEGER NOT NULL REFERENCES positions(id),
    entry_date   TEXT NOT NULL      -- RFC 3339 UTC, fixed width
);

-- Append-only. AUTOINCREMENT keeps ids monotonic, which the current-state
-- tie-break relies on.
CREATE TABLE IF NOT EXISTS plant_states (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_id        INTEGER NOT NULL REFERENCES plants(plant_id),
    state_date      TEXT NOT NULL,
    state_type      TEXT NOT NULL,
    harvest_weight  REAL,           -- only on 'harvested' rows
    description     TEXT
);

CREATE TABLE IF NOT EXISTS fertilizer_recipes (
    recipe_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_name  TEXT NOT NULL UNIQUE,
    description  TEXT
);

-- Append-only.
CREATE TABLE IF NOT EXISTS watering_history (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_id              INTEGER NOT NULL REFERENCES plants(plant_id),
    watering_date         TEXT NOT NULL,
    amount                REAL NOT NULL,
    fertilizer_recipe_id  INTEGER REFERENCES fertilizer_recipes(recipe_id),
    description           TEXT
);

CREATE TRIGGER IF NOT EXISTS plant_states_no_update
BEFORE UPDATE ON plant_states
BEGIN SELECT RAISE(ABORT, 'plant_states is append-only'); END;

CREATE TRIGGER IF NOT EXISTS plant_states_no_delete
BEFORE DELETE ON plant_states
BEGIN SELECT RAISE(ABORT, 'plant_states is append-only'); END;

CREATE TRIGGER IF NOT EXISTS watering_history_no_update
BEFORE UPDATE ON watering_history
BEGIN SELECT RAISE(ABORT, 'watering_history is append-only'); END;

CREATE TRIGGER IF NOT EXISTS watering_history_no_delete
BEFORE DELETE ON watering_history
BEGIN SELECT RAISE(ABORT, 'watering_history is append-only'); END;

-- The current state of each plant: its latest row by state_date, ties broken
-- by the highest id. Plants without state rows are absent.
CREATE VIEW IF NOT EXISTS current_plant_states AS
SELECT ps.id, ps.plant_id, ps.state_date, ps.state_type,
       ps.harvest_weight, ps.description
FROM plant_states ps
WHERE ps.id = (
    SELECT s.id
    FROM plant_states s
    WHERE s.plant_id = ps.plant_id
    ORDER BY s.state_date DESC, s.id DESC
    LIMIT 1
);

CREATE INDEX IF NOT EXISTS levels_shelf_idx         ON levels(shelf_id);
CREATE INDEX IF NOT EXISTS positions_level_idx      ON positions(level_id);
CREATE INDEX IF NOT EXISTS plants_position_idx      ON plants(position_id);
CREATE INDEX IF NOT EXISTS plant_states_plant_idx   ON plant_states(plant_id, state_date);
CREATE INDEX IF NOT EXISTS watering_plant_idx       ON watering_history(plant_id, watering_date);

PRAGMA user_version = 1;
";
