//! Timed study sessions, shared across features for weekly study time

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};
use rusqlite::{params, Connection, Result};
use std::collections::BTreeMap;

use super::{format_timestamp, timestamp_at};

/// Source tag for sessions recorded by flashcard rounds
pub const SOURCE_FLASHCARD: &str = "flashcard";

/// Record a session that ended at `end` and lasted `duration_seconds`.
/// A duration that puts the start outside the calendar is rejected.
pub fn insert_study_session(
  conn: &Connection,
  user_id: i64,
  source: &str,
  source_id: Option<i64>,
  end: DateTime<Utc>,
  duration_seconds: i64,
) -> Result<i64> {
  let start = TimeDelta::try_seconds(duration_seconds)
    .and_then(|elapsed| end.checked_sub_signed(elapsed))
    .ok_or_else(|| {
      rusqlite::Error::ToSqlConversionFailure(
        format!("study session of {duration_seconds}s starts out of range").into(),
      )
    })?;
  conn.execute(
    r#"
    INSERT INTO study_sessions (user_id, source, source_id, start_time, end_time, duration_seconds)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
    params![
      user_id,
      source,
      source_id,
      format_timestamp(start),
      format_timestamp(end),
      duration_seconds
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Seconds studied per UTC day for the 7 days ending on `today`,
/// oldest first, days without sessions included as zero
pub fn get_daily_study_seconds(
  conn: &Connection,
  user_id: i64,
  today: NaiveDate,
) -> Result<Vec<(NaiveDate, i64)>> {
  let first_day = today - Duration::days(6);
  let mut daily: BTreeMap<NaiveDate, i64> = first_day
    .iter_days()
    .take(7)
    .map(|day| (day, 0))
    .collect();

  let range_start = first_day.and_time(NaiveTime::MIN).and_utc();

  let mut stmt = conn.prepare(
    r#"
    SELECT start_time, duration_seconds
    FROM study_sessions
    WHERE user_id = ?1 AND start_time >= ?2
    ORDER BY start_time ASC
    "#,
  )?;
  let rows = stmt
    .query_map(params![user_id, format_timestamp(range_start)], |row| {
      Ok((timestamp_at(row, 0)?, row.get::<_, i64>(1)?))
    })?
    .collect::<Result<Vec<_>>>()?;

  for (start, seconds) in rows {
    if let Some(total) = daily.get_mut(&start.date_naive()) {
      *total += seconds;
    }
  }

  Ok(daily.into_iter().collect())
}
