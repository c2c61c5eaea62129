//! Study rounds: completion, recall and reset.
//!
//! A round is only accepted when every card of the set has been answered;
//! a set without cards is trivially covered.
//! Completion and reset each run as a single store transaction, so a
//! failure part way leaves no round, mastery change or snapshot behind.

use chrono::{SubsecRound, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashMap;

use super::access::require_set;
use crate::db;
use crate::domain::{tally_answers, RoundAnswer, RoundSnapshot, RoundView};
use crate::error::{AppError, AppResult};
use crate::srs::{apply_answer, MasteryLevel};

pub const INCOMPLETE_ROUND: &str = "Phải gửi kết quả cho toàn bộ thẻ trong set";
pub const NEGATIVE_DURATION: &str = "durationSeconds không được âm";
pub const DURATION_TOO_LONG: &str = "durationSeconds vượt quá giới hạn";
pub const RESET_DONE: &str = "Đã đặt lại tiến độ học của set";

/// Longest timed session a single round may report
pub const MAX_ROUND_SECONDS: i64 = 24 * 60 * 60;

/// Body of a round completion request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoundSubmission {
  pub answers: Vec<RoundAnswer>,
  #[serde(default)]
  pub duration_seconds: Option<i64>,
}

/// Record a finished round over a set.
///
/// Updates the mastery of every answered card, stores the round, the
/// optional timed study session and the display snapshot.
pub fn complete_round(
  conn: &Connection,
  user_id: i64,
  set_id: i64,
  submission: &RoundSubmission,
) -> AppResult<RoundView> {
  let set = require_set(conn, user_id, set_id)?;

  match submission.duration_seconds {
    Some(d) if d < 0 => return Err(AppError::validation(NEGATIVE_DURATION)),
    Some(d) if d > MAX_ROUND_SECONDS => return Err(AppError::validation(DURATION_TOO_LONG)),
    _ => {}
  }

  let tx = conn.unchecked_transaction()?;

  let cards = db::list_set_cards(&tx, set.id)?;
  let card_ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
  let levels: HashMap<i64, MasteryLevel> =
    cards.iter().map(|c| (c.id, c.mastery_level)).collect();

  let tally = tally_answers(&card_ids, &submission.answers).map_err(|incomplete| {
    tracing::debug!(
      "Round on set {} missing {} card(s): {:?}",
      set.id,
      incomplete.missing.len(),
      incomplete.missing
    );
    AppError::validation(INCOMPLETE_ROUND)
  })?;

  for answer in &tally.answers {
    let current = levels.get(&answer.card_id).copied().unwrap_or_default();
    let next = apply_answer(current, answer.correct);
    if next != current {
      db::set_card_mastery(&tx, answer.card_id, next)?;
    }
  }

  // Stored timestamps keep microseconds
  let now = Utc::now().trunc_subsecs(6);
  let round = db::insert_round(
    &tx,
    user_id,
    set.id,
    tally.remembered_count,
    tally.not_remembered_count,
    now,
  )?;

  if let Some(duration) = submission.duration_seconds {
    db::insert_study_session(&tx, user_id, db::SOURCE_FLASHCARD, Some(set.id), now, duration)?;
  }

  let snapshot = RoundSnapshot::from_tally(&round, &tally);
  db::save_snapshot(&tx, user_id, set.id, &snapshot)?;

  tx.commit()?;

  tracing::info!(
    "User {} completed round {} on set {}: {} remembered, {} not remembered",
    user_id,
    round.id,
    set.id,
    round.remembered_count,
    round.not_remembered_count
  );

  Ok(RoundView::from_round(&round, &snapshot, card_ids))
}

/// Latest round of a set for redrawing the result screen, or the neutral
/// view when there is nothing to show.
pub fn last_round(conn: &Connection, user_id: i64, set_id: i64) -> AppResult<RoundView> {
  let set = require_set(conn, user_id, set_id)?;

  let Some(round) = db::get_latest_round(conn, user_id, set.id)? else {
    return Ok(RoundView::neutral());
  };
  let Some(stored) = db::get_snapshot(conn, user_id, set.id)? else {
    return Ok(RoundView::neutral());
  };

  let fallback_all = if stored.snapshot.tabs.is_none() {
    db::list_set_card_ids(conn, set.id)?
  } else {
    Vec::new()
  };
  Ok(RoundView::from_round(&round, &stored.snapshot, fallback_all))
}

/// Forget every round of a set and send all its cards back to the
/// initial level. Other sets keep their snapshots.
pub fn reset_round(conn: &Connection, user_id: i64, set_id: i64) -> AppResult<RoundView> {
  let set = require_set(conn, user_id, set_id)?;

  let tx = conn.unchecked_transaction()?;
  let rounds = db::delete_rounds(&tx, user_id, set.id)?;
  let cards = db::reset_set_mastery(&tx, set.id)?;
  db::delete_snapshot(&tx, user_id, set.id)?;
  tx.commit()?;

  tracing::info!(
    "User {} reset set {}: {} round(s) removed, {} card(s) back to level {}",
    user_id,
    set.id,
    rounds,
    cards,
    MasteryLevel::INITIAL.value()
  );

  Ok(RoundView::neutral().with_message(RESET_DONE))
}
