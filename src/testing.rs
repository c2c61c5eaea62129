//! Test utilities for database setup.
//!
//! Reuses the authoritative migrations so tests never carry their own
//! copy of the schema.

use rusqlite::Connection;
use tempfile::TempDir;

/// Test database in a temporary directory, removed on drop.
pub struct TestEnv {
  /// Temporary directory (kept alive for database file persistence)
  pub temp: TempDir,
  /// Connection with the full schema applied
  pub conn: Connection,
}

impl TestEnv {
  pub fn new() -> rusqlite::Result<Self> {
    let temp =
      TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let conn = Connection::open(temp.path().join("flashcards.db"))?;
    crate::db::schema::run_migrations(&conn)?;

    Ok(Self { temp, conn })
  }

  /// Insert a user with a placeholder password hash and return its id
  pub fn create_user(&self, email: &str) -> i64 {
    crate::auth::db::create_user(&self.conn, email, "test-hash", "Tester")
      .expect("create test user")
  }

  /// Add `count` cards to a set and return their ids in creation order
  pub fn add_cards(&self, set_id: i64, count: usize) -> Vec<i64> {
    (0..count)
      .map(|i| {
        crate::db::insert_card(&self.conn, set_id, &format!("言葉{i}"), &format!("từ {i}"), None)
          .expect("insert test card")
          .id
      })
      .collect()
  }
}
