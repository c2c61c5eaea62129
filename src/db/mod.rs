pub mod cards;
pub mod folders;
pub mod rounds;
pub mod schema;
pub mod sets;
pub mod snapshots;
pub mod study_sessions;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use cards::*;
pub use folders::*;
pub use rounds::*;
pub use schema::run_migrations;
pub use sets::*;
pub use snapshots::*;
pub use study_sessions::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with the full schema, used by tests
pub fn init_memory_db() -> Result<DbPool> {
  let conn = Connection::open_in_memory()?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Fixed-width RFC 3339 so stored timestamps sort as text
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read an RFC 3339 text column
pub(crate) fn timestamp_at(row: &rusqlite::Row, idx: usize) -> Result<DateTime<Utc>> {
  let raw: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_timestamps_sort_lexicographically() {
    let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::milliseconds(1500);
    assert!(format_timestamp(early) < format_timestamp(late));
    assert_eq!(format_timestamp(early).len(), format_timestamp(late).len());
  }

  #[test]
  fn test_log_warn() {
    let failed: std::result::Result<i64, &str> = Err("boom");
    assert_eq!(failed.log_warn("ignored"), None);
    let ok: std::result::Result<i64, &str> = Ok(4);
    assert_eq!(ok.log_warn("ignored"), Some(4));
  }

  #[test]
  fn test_memory_db_has_schema() {
    let pool = init_memory_db().unwrap();
    let conn = try_lock(&pool).unwrap();
    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM fc_sets", [], |row| row.get(0))
      .unwrap();
    assert_eq!(count, 0);
  }
}
