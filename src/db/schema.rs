//! Schema creation with version-gated migrations.
//!
//! Each migration checks the stored schema version, runs inside a
//! transaction and records its version in `db_version`, so it applies
//! exactly once per database.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Current schema version. Increment when adding a migration.
pub const SCHEMA_VERSION: i32 = 3;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS db_version (
      version INTEGER PRIMARY KEY,
      applied_at TEXT NOT NULL,
      description TEXT
    );
    "#,
  )?;

  let current_version = get_schema_version(conn)?;
  tracing::debug!("schema version: {}", current_version);

  if current_version < 1 {
    migrate_v0_to_v1(conn)?;
  }
  if current_version < 2 {
    migrate_v1_to_v2(conn)?;
  }
  if current_version < 3 {
    migrate_v2_to_v3(conn)?;
  }

  Ok(())
}

/// v0→v1: accounts and bearer sessions
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v0→v1: Create users and sessions");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL UNIQUE COLLATE NOCASE,
      password_hash TEXT NOT NULL,
      display_name TEXT NOT NULL,
      created_at TEXT NOT NULL,
      last_login_at TEXT
    );

    CREATE TABLE IF NOT EXISTS sessions (
      token_hash TEXT PRIMARY KEY,
      user_id INTEGER NOT NULL,
      created_at TEXT NOT NULL,
      expires_at TEXT NOT NULL,
      last_access_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
    "#,
  )?;
  record_version(&tx, 1, "Create users and sessions")?;
  tx.commit()
}

/// v1→v2: folders, sets and cards
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v1→v2: Create flashcard folders, sets and cards");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS fc_folders (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS fc_sets (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      folder_id INTEGER,
      name TEXT NOT NULL,
      times_practiced INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
      FOREIGN KEY (folder_id) REFERENCES fc_folders(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS fc_cards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      set_id INTEGER NOT NULL,
      side_jp TEXT NOT NULL,
      side_viet TEXT NOT NULL,
      image_url TEXT,
      mastery_level INTEGER NOT NULL DEFAULT 1 CHECK (mastery_level BETWEEN 1 AND 5),
      created_at TEXT NOT NULL,
      FOREIGN KEY (set_id) REFERENCES fc_sets(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_fc_folders_user ON fc_folders(user_id);
    CREATE INDEX IF NOT EXISTS idx_fc_sets_user ON fc_sets(user_id);
    CREATE INDEX IF NOT EXISTS idx_fc_sets_folder ON fc_sets(folder_id);
    CREATE INDEX IF NOT EXISTS idx_fc_cards_set ON fc_cards(set_id);
    "#,
  )?;
  record_version(&tx, 2, "Create flashcard folders, sets and cards")?;
  tx.commit()
}

/// v2→v3: study rounds, timed study sessions and round snapshots
fn migrate_v2_to_v3(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v2→v3: Create rounds, study sessions and snapshots");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS fc_rounds (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      set_id INTEGER NOT NULL,
      remembered_count INTEGER NOT NULL,
      not_remembered_count INTEGER NOT NULL,
      completed_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
      FOREIGN KEY (set_id) REFERENCES fc_sets(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS study_sessions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      source TEXT NOT NULL,
      source_id INTEGER,
      start_time TEXT NOT NULL,
      end_time TEXT NOT NULL,
      duration_seconds INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    -- Latest round display state, one row per (user, set)
    CREATE TABLE IF NOT EXISTS round_snapshots (
      user_id INTEGER NOT NULL,
      set_id INTEGER NOT NULL,
      payload TEXT NOT NULL,
      version INTEGER NOT NULL DEFAULT 1,
      updated_at TEXT NOT NULL,
      PRIMARY KEY (user_id, set_id),
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
      FOREIGN KEY (set_id) REFERENCES fc_sets(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_fc_rounds_user_set ON fc_rounds(user_id, set_id, completed_at);
    CREATE INDEX IF NOT EXISTS idx_study_sessions_user_start ON study_sessions(user_id, start_time);
    "#,
  )?;
  record_version(&tx, 3, "Create rounds, study sessions and round snapshots")?;
  tx.commit()
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
    params![version, Utc::now().to_rfc3339(), description],
  )?;
  Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<i32> {
  conn.query_row(
    "SELECT COALESCE(MAX(version), 0) FROM db_version",
    [],
    |row| row.get(0),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_reach_latest_version() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
  }

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();

    let rows: i64 = conn
      .query_row("SELECT COUNT(*) FROM db_version", [], |row| row.get(0))
      .unwrap();
    assert_eq!(rows, SCHEMA_VERSION as i64);
  }

  #[test]
  fn test_foreign_keys_enabled() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let enabled: i64 = conn
      .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
      .unwrap();
    assert_eq!(enabled, 1);
  }

  #[test]
  fn test_mastery_level_check_constraint() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn.execute_batch(
      r#"
      INSERT INTO users (email, password_hash, display_name, created_at) VALUES ('a@b.c', 'x', 'A', '2026-01-01T00:00:00Z');
      INSERT INTO fc_sets (user_id, name, created_at) VALUES (1, 'S', '2026-01-01T00:00:00Z');
      "#,
    )
    .unwrap();
    let bad = conn.execute(
      "INSERT INTO fc_cards (set_id, side_jp, side_viet, mastery_level, created_at) VALUES (1, 'a', 'b', 6, 'x')",
      [],
    );
    assert!(bad.is_err());
  }
}
