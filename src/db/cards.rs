//! Flashcard CRUD and mastery updates

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{format_timestamp, timestamp_at};
use crate::domain::{Card, StudyMode};
use crate::srs::MasteryLevel;

const CARD_COLUMNS: &str = "id, set_id, side_jp, side_viet, image_url, mastery_level, created_at";

pub(crate) fn row_to_card(row: &rusqlite::Row) -> Result<Card> {
  Ok(Card {
    id: row.get(0)?,
    set_id: row.get(1)?,
    side_jp: row.get(2)?,
    side_viet: row.get(3)?,
    image_url: row.get(4)?,
    mastery_level: row.get(5)?,
    created_at: timestamp_at(row, 6)?,
  })
}

pub fn insert_card(
  conn: &Connection,
  set_id: i64,
  side_jp: &str,
  side_viet: &str,
  image_url: Option<&str>,
) -> Result<Card> {
  let now = Utc::now();
  conn.execute(
    r#"
    INSERT INTO fc_cards (set_id, side_jp, side_viet, image_url, mastery_level, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
    params![
      set_id,
      side_jp,
      side_viet,
      image_url,
      MasteryLevel::INITIAL,
      format_timestamp(now)
    ],
  )?;
  Ok(Card {
    id: conn.last_insert_rowid(),
    set_id,
    side_jp: side_jp.to_string(),
    side_viet: side_viet.to_string(),
    image_url: image_url.map(str::to_string),
    mastery_level: MasteryLevel::INITIAL,
    created_at: now,
  })
}

/// Card lookup restricted to one set
pub fn get_set_card(conn: &Connection, set_id: i64, card_id: i64) -> Result<Option<Card>> {
  conn
    .query_row(
      &format!("SELECT {CARD_COLUMNS} FROM fc_cards WHERE id = ?1 AND set_id = ?2"),
      params![card_id, set_id],
      row_to_card,
    )
    .optional()
}

/// Cards of a set in creation order
pub fn list_set_cards(conn: &Connection, set_id: i64) -> Result<Vec<Card>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {CARD_COLUMNS} FROM fc_cards WHERE set_id = ?1 ORDER BY id ASC"
  ))?;
  let cards = stmt
    .query_map(params![set_id], row_to_card)?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

/// Cards of a set matching a study mode, in creation order
pub fn list_study_cards(conn: &Connection, set_id: i64, mode: StudyMode) -> Result<Vec<Card>> {
  let cards = list_set_cards(conn, set_id)?;
  Ok(
    cards
      .into_iter()
      .filter(|card| mode.includes(card.mastery_level))
      .collect(),
  )
}

pub fn list_set_card_ids(conn: &Connection, set_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare("SELECT id FROM fc_cards WHERE set_id = ?1 ORDER BY id ASC")?;
  let ids = stmt
    .query_map(params![set_id], |row| row.get(0))?
    .collect::<Result<Vec<_>>>()?;
  Ok(ids)
}

pub fn list_set_mastery_levels(conn: &Connection, set_id: i64) -> Result<Vec<MasteryLevel>> {
  let mut stmt =
    conn.prepare("SELECT mastery_level FROM fc_cards WHERE set_id = ?1 ORDER BY id ASC")?;
  let levels = stmt
    .query_map(params![set_id], |row| row.get(0))?
    .collect::<Result<Vec<_>>>()?;
  Ok(levels)
}

pub fn update_card_content(
  conn: &Connection,
  card_id: i64,
  side_jp: &str,
  side_viet: &str,
  image_url: Option<&str>,
) -> Result<()> {
  conn.execute(
    "UPDATE fc_cards SET side_jp = ?1, side_viet = ?2, image_url = ?3 WHERE id = ?4",
    params![side_jp, side_viet, image_url, card_id],
  )?;
  Ok(())
}

pub fn set_card_mastery(conn: &Connection, card_id: i64, level: MasteryLevel) -> Result<()> {
  conn.execute(
    "UPDATE fc_cards SET mastery_level = ?1 WHERE id = ?2",
    params![level, card_id],
  )?;
  Ok(())
}

/// Put every card of a set back to the initial level
pub fn reset_set_mastery(conn: &Connection, set_id: i64) -> Result<usize> {
  conn.execute(
    "UPDATE fc_cards SET mastery_level = ?1 WHERE set_id = ?2",
    params![MasteryLevel::INITIAL, set_id],
  )
}

pub fn delete_card(conn: &Connection, set_id: i64, card_id: i64) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM fc_cards WHERE id = ?1 AND set_id = ?2",
    params![card_id, set_id],
  )?;
  Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::insert_set;
  use crate::testing::TestEnv;

  #[test]
  fn test_insert_starts_at_initial_level() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let set = insert_set(&env.conn, user, "N5", None).unwrap();

    let card = insert_card(&env.conn, set.id, "水", "nước", None).unwrap();
    let stored = get_set_card(&env.conn, set.id, card.id).unwrap().unwrap();
    assert_eq!(stored.mastery_level, MasteryLevel::INITIAL);
    assert_eq!(stored.side_jp, "水");
    assert_eq!(stored.image_url, None);
  }

  #[test]
  fn test_card_lookup_is_set_scoped() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let first = insert_set(&env.conn, user, "A", None).unwrap();
    let second = insert_set(&env.conn, user, "B", None).unwrap();
    let card = insert_card(&env.conn, first.id, "火", "lửa", None).unwrap();

    assert!(get_set_card(&env.conn, second.id, card.id).unwrap().is_none());
    assert!(!delete_card(&env.conn, second.id, card.id).unwrap());
    assert!(delete_card(&env.conn, first.id, card.id).unwrap());
  }

  #[test]
  fn test_study_mode_filters() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let set = insert_set(&env.conn, user, "N5", None).unwrap();
    let ids = env.add_cards(set.id, 3);
    set_card_mastery(&env.conn, ids[1], MasteryLevel::MASTERED).unwrap();

    let all = list_study_cards(&env.conn, set.id, StudyMode::All).unwrap();
    let todo = list_study_cards(&env.conn, set.id, StudyMode::NotMastered).unwrap();
    let done = list_study_cards(&env.conn, set.id, StudyMode::Mastered).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(todo.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[0], ids[2]]);
    assert_eq!(done.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[1]]);
  }

  #[test]
  fn test_reset_mastery() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let set = insert_set(&env.conn, user, "N5", None).unwrap();
    let ids = env.add_cards(set.id, 2);
    set_card_mastery(&env.conn, ids[0], MasteryLevel::clamped(4)).unwrap();
    set_card_mastery(&env.conn, ids[1], MasteryLevel::MASTERED).unwrap();

    assert_eq!(reset_set_mastery(&env.conn, set.id).unwrap(), 2);
    let levels = list_set_mastery_levels(&env.conn, set.id).unwrap();
    assert!(levels.iter().all(|l| *l == MasteryLevel::INITIAL));
  }

  #[test]
  fn test_update_content_clears_image() {
    let env = TestEnv::new().unwrap();
    let user = env.create_user("alice@example.com");
    let set = insert_set(&env.conn, user, "N5", None).unwrap();
    let card = insert_card(&env.conn, set.id, "山", "núi", Some("https://img.example/yama.png")).unwrap();

    update_card_content(&env.conn, card.id, "山", "ngọn núi", None).unwrap();
    let stored = get_set_card(&env.conn, set.id, card.id).unwrap().unwrap();
    assert_eq!(stored.side_viet, "ngọn núi");
    assert_eq!(stored.image_url, None);
  }
}
