//! Per-user, per-set cache of the latest round's display state.
//!
//! Each write replaces the row and bumps its version. Writers run under
//! the pool lock, so the last completed round always wins.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::format_timestamp;
use crate::domain::RoundSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
  pub snapshot: RoundSnapshot,
  pub version: i64,
}

pub fn get_snapshot(conn: &Connection, user_id: i64, set_id: i64) -> Result<Option<StoredSnapshot>> {
  let row: Option<(String, i64)> = conn
    .query_row(
      "SELECT payload, version FROM round_snapshots WHERE user_id = ?1 AND set_id = ?2",
      params![user_id, set_id],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?;

  row
    .map(|(payload, version)| {
      let snapshot = serde_json::from_str(&payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
      })?;
      Ok(StoredSnapshot { snapshot, version })
    })
    .transpose()
}

/// Store the snapshot for (user, set), replacing any earlier one, and
/// return the new version
pub fn save_snapshot(
  conn: &Connection,
  user_id: i64,
  set_id: i64,
  snapshot: &RoundSnapshot,
) -> Result<i64> {
  let payload =
    serde_json::to_string(snapshot).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

  conn.query_row(
    r#"
    INSERT INTO round_snapshots (user_id, set_id, payload, version, updated_at)
    VALUES (?1, ?2, ?3, 1, ?4)
    ON CONFLICT (user_id, set_id) DO UPDATE
      SET payload = excluded.payload,
          version = round_snapshots.version + 1,
          updated_at = excluded.updated_at
    RETURNING version
    "#,
    params![user_id, set_id, payload, format_timestamp(Utc::now())],
    |row| row.get(0),
  )
}

pub fn delete_snapshot(conn: &Connection, user_id: i64, set_id: i64) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM round_snapshots WHERE user_id = ?1 AND set_id = ?2",
    params![user_id, set_id],
  )?;
  Ok(deleted > 0)
}
