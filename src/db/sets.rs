//! Flashcard set queries

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{format_timestamp, timestamp_at};
use crate::domain::{is_set_completed, FlashcardSet, FolderRef, SetSummary};

const SET_COLUMNS: &str = "s.id, s.user_id, s.folder_id, s.name, s.times_practiced, s.created_at";

fn row_to_set(row: &rusqlite::Row) -> Result<FlashcardSet> {
  Ok(FlashcardSet {
    id: row.get(0)?,
    user_id: row.get(1)?,
    folder_id: row.get(2)?,
    name: row.get(3)?,
    times_practiced: row.get(4)?,
    created_at: timestamp_at(row, 5)?,
  })
}

pub fn insert_set(
  conn: &Connection,
  user_id: i64,
  name: &str,
  folder_id: Option<i64>,
) -> Result<FlashcardSet> {
  let now = Utc::now();
  conn.execute(
    "INSERT INTO fc_sets (user_id, folder_id, name, times_practiced, created_at) VALUES (?1, ?2, ?3, 0, ?4)",
    params![user_id, folder_id, name, format_timestamp(now)],
  )?;
  Ok(FlashcardSet {
    id: conn.last_insert_rowid(),
    user_id,
    folder_id,
    name: name.to_string(),
    times_practiced: 0,
    created_at: now,
  })
}

/// Set lookup scoped to its owner; other users' sets read as missing
pub fn get_owned_set(conn: &Connection, user_id: i64, set_id: i64) -> Result<Option<FlashcardSet>> {
  conn
    .query_row(
      &format!("SELECT {SET_COLUMNS} FROM fc_sets s WHERE s.id = ?1 AND s.user_id = ?2"),
      params![set_id, user_id],
      row_to_set,
    )
    .optional()
}

/// Sets of a user, newest first, optionally restricted to one folder
pub fn list_sets(conn: &Connection, user_id: i64, folder_id: Option<i64>) -> Result<Vec<SetSummary>> {
  let mut stmt = conn.prepare(&format!(
    r#"
    SELECT {SET_COLUMNS}, f.id, f.name,
           (SELECT COUNT(*) FROM fc_cards c WHERE c.set_id = s.id) AS card_count,
           (SELECT COUNT(*) FROM fc_cards c WHERE c.set_id = s.id AND c.mastery_level >= 5) AS mastered,
           EXISTS (SELECT 1 FROM fc_rounds r WHERE r.set_id = s.id AND r.user_id = s.user_id) AS has_round
    FROM fc_sets s
    LEFT JOIN fc_folders f ON f.id = s.folder_id
    WHERE s.user_id = ?1 AND (?2 IS NULL OR s.folder_id = ?2)
    ORDER BY s.created_at DESC, s.id DESC
    "#
  ))?;

  let sets = stmt
    .query_map(params![user_id, folder_id], |row| {
      let set = row_to_set(row)?;
      let folder_id: Option<i64> = row.get(6)?;
      let folder_name: Option<String> = row.get(7)?;
      let card_count: i64 = row.get(8)?;
      let mastered: i64 = row.get(9)?;
      let has_round: bool = row.get(10)?;
      Ok(SetSummary {
        set,
        card_count,
        is_completed: is_set_completed(card_count, mastered, has_round),
        folder: folder_id.zip(folder_name).map(|(folder_id, folder_name)| FolderRef {
          folder_id,
          folder_name,
        }),
      })
    })?
    .collect::<Result<Vec<_>>>()?;

  Ok(sets)
}

pub fn get_set_folder(conn: &Connection, set: &FlashcardSet) -> Result<Option<FolderRef>> {
  let Some(folder_id) = set.folder_id else {
    return Ok(None);
  };
  conn
    .query_row(
      "SELECT id, name FROM fc_folders WHERE id = ?1",
      params![folder_id],
      |row| {
        Ok(FolderRef {
          folder_id: row.get(0)?,
          folder_name: row.get(1)?,
        })
      },
    )
    .optional()
}

/// Completion status of one set (all cards mastered, or any round completed)
pub fn is_owned_set_completed(conn: &Connection, user_id: i64, set_id: i64) -> Result<bool> {
  conn.query_row(
    r#"
    SELECT (SELECT COUNT(*) FROM fc_cards WHERE set_id = ?1),
           (SELECT COUNT(*) FROM fc_cards WHERE set_id = ?1 AND mastery_level >= 5),
           EXISTS (SELECT 1 FROM fc_rounds WHERE set_id = ?1 AND user_id = ?2)
    "#,
    params![set_id, user_id],
    |row| Ok(is_set_completed(row.get(0)?, row.get(1)?, row.get(2)?)),
  )
}

pub fn update_set(
  conn: &Connection,
  set_id: i64,
  name: &str,
  folder_id: Option<i64>,
) -> Result<()> {
  conn.execute(
    "UPDATE fc_sets SET name = ?1, folder_id = ?2 WHERE id = ?3",
    params![name, folder_id, set_id],
  )?;
  Ok(())
}

pub fn delete_set(conn: &Connection, user_id: i64, set_id: i64) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM fc_sets WHERE id = ?1 AND user_id = ?2",
    params![set_id, user_id],
  )?;
  Ok(deleted > 0)
}

pub fn increment_times_practiced(conn: &Connection, set_id: i64) -> Result<()> {
  conn.execute(
    "UPDATE fc_sets SET times_practiced = times_practiced + 1 WHERE id = ?1",
    params![set_id],
  )?;
  Ok(())
}
