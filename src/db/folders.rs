//! Flashcard folder queries

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{format_timestamp, timestamp_at};
use crate::domain::{Folder, FolderSetEntry, FolderWithSets};

fn row_to_folder(row: &rusqlite::Row) -> Result<Folder> {
  Ok(Folder {
    id: row.get(0)?,
    user_id: row.get(1)?,
    name: row.get(2)?,
    created_at: timestamp_at(row, 3)?,
  })
}

pub fn insert_folder(conn: &Connection, user_id: i64, name: &str) -> Result<Folder> {
  let now = Utc::now();
  conn.execute(
    "INSERT INTO fc_folders (user_id, name, created_at) VALUES (?1, ?2, ?3)",
    params![user_id, name, format_timestamp(now)],
  )?;
  Ok(Folder {
    id: conn.last_insert_rowid(),
    user_id,
    name: name.to_string(),
    created_at: now,
  })
}

/// Folder lookup scoped to its owner; other users' folders read as missing
pub fn get_owned_folder(conn: &Connection, user_id: i64, folder_id: i64) -> Result<Option<Folder>> {
  conn
    .query_row(
      "SELECT id, user_id, name, created_at FROM fc_folders WHERE id = ?1 AND user_id = ?2",
      params![folder_id, user_id],
      row_to_folder,
    )
    .optional()
}

/// All folders of a user, newest first, each with its sets
pub fn list_folders_with_sets(conn: &Connection, user_id: i64) -> Result<Vec<FolderWithSets>> {
  let mut stmt = conn.prepare(
    "SELECT id, user_id, name, created_at FROM fc_folders WHERE user_id = ?1 ORDER BY id DESC",
  )?;
  let folders = stmt
    .query_map(params![user_id], row_to_folder)?
    .collect::<Result<Vec<_>>>()?;

  let mut set_stmt = conn.prepare(
    r#"
    SELECT s.id, s.name, s.times_practiced, s.created_at,
           (SELECT COUNT(*) FROM fc_cards c WHERE c.set_id = s.id) AS card_count
    FROM fc_sets s
    WHERE s.folder_id = ?1
    ORDER BY s.id ASC
    "#,
  )?;

  let mut result = Vec::with_capacity(folders.len());
  for folder in folders {
    let sets = set_stmt
      .query_map(params![folder.id], |row| {
        Ok(FolderSetEntry {
          set_id: row.get(0)?,
          set_name: row.get(1)?,
          times_practiced: row.get(2)?,
          created_at: timestamp_at(row, 3)?,
          card_count: row.get(4)?,
        })
      })?
      .collect::<Result<Vec<_>>>()?;
    result.push(FolderWithSets { folder, sets });
  }
  Ok(result)
}

/// Delete a folder owned by the user. Its sets stay, detached.
pub fn delete_folder(conn: &Connection, user_id: i64, folder_id: i64) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM fc_folders WHERE id = ?1 AND user_id = ?2",
    params![folder_id, user_id],
  )?;
  Ok(deleted > 0)
}
