//! Study round records (append-only, removed only by a reset)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{format_timestamp, timestamp_at};
use crate::domain::Round;

pub fn insert_round(
  conn: &Connection,
  user_id: i64,
  set_id: i64,
  remembered_count: u32,
  not_remembered_count: u32,
  completed_at: DateTime<Utc>,
) -> Result<Round> {
  conn.execute(
    r#"
    INSERT INTO fc_rounds (user_id, set_id, remembered_count, not_remembered_count, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
    params![
      user_id,
      set_id,
      remembered_count,
      not_remembered_count,
      format_timestamp(completed_at)
    ],
  )?;
  Ok(Round {
    id: conn.last_insert_rowid(),
    user_id,
    set_id,
    remembered_count,
    not_remembered_count,
    completed_at,
  })
}

/// Most recently completed round of a user over a set
pub fn get_latest_round(conn: &Connection, user_id: i64, set_id: i64) -> Result<Option<Round>> {
  conn
    .query_row(
      r#"
      SELECT id, user_id, set_id, remembered_count, not_remembered_count, completed_at
      FROM fc_rounds
      WHERE user_id = ?1 AND set_id = ?2
      ORDER BY completed_at DESC, id DESC
      LIMIT 1
      "#,
      params![user_id, set_id],
      |row| {
        Ok(Round {
          id: row.get(0)?,
          user_id: row.get(1)?,
          set_id: row.get(2)?,
          remembered_count: row.get(3)?,
          not_remembered_count: row.get(4)?,
          completed_at: timestamp_at(row, 5)?,
        })
      },
    )
    .optional()
}

pub fn count_rounds(conn: &Connection, user_id: i64, set_id: i64) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM fc_rounds WHERE user_id = ?1 AND set_id = ?2",
    params![user_id, set_id],
    |row| row.get(0),
  )
}

pub fn delete_rounds(conn: &Connection, user_id: i64, set_id: i64) -> Result<usize> {
  conn.execute(
    "DELETE FROM fc_rounds WHERE user_id = ?1 AND set_id = ?2",
    params![user_id, set_id],
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::insert_set;
  use crate::testing::TestEnv;
  use chrono::Duration;

  #[test]
  fn test_latest_round_by_completion_time() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let set = insert_set(&env.conn, user, "N5", None).unwrap();
    let now = Utc::now();

    let newer = insert_round(&env.conn, user, set.id, 3, 0, now).unwrap();
    // Inserted later but completed earlier
    insert_round(&env.conn, user, set.id, 0, 3, now - Duration::minutes(5)).unwrap();

    let latest = get_latest_round(&env.conn, user, set.id).unwrap().unwrap();
    assert_eq!(latest.id, newer.id);
    assert_eq!(latest.remembered_count, 3);
    assert_eq!(count_rounds(&env.conn, user, set.id).unwrap(), 2);
  }

  #[test]
  fn test_delete_rounds_only_touches_one_set() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let first = insert_set(&env.conn, user, "A", None).unwrap();
    let second = insert_set(&env.conn, user, "B", None).unwrap();
    insert_round(&env.conn, user, first.id, 1, 1, Utc::now()).unwrap();
    insert_round(&env.conn, user, first.id, 2, 0, Utc::now()).unwrap();
    insert_round(&env.conn, user, second.id, 2, 0, Utc::now()).unwrap();

    assert_eq!(delete_rounds(&env.conn, user, first.id).unwrap(), 2);
    assert!(get_latest_round(&env.conn, user, first.id).unwrap().is_none());
    assert_eq!(count_rounds(&env.conn, user, second.id).unwrap(), 1);
  }
}
