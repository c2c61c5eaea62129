use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::{self, try_lock};
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DailySeconds {
  pub date: NaiveDate,
  pub seconds: i64,
}

/// Study time over the last 7 UTC days, today included
#[derive(Debug, Serialize)]
pub struct WeeklyStudy {
  pub range: DateRange,
  pub total_seconds: i64,
  pub daily: Vec<DailySeconds>,
}

impl WeeklyStudy {
  fn from_daily(today: NaiveDate, daily: Vec<(NaiveDate, i64)>) -> Self {
    let start = daily.first().map_or(today, |(date, _)| *date);
    Self {
      range: DateRange { start, end: today },
      total_seconds: daily.iter().map(|(_, seconds)| seconds).sum(),
      daily: daily
        .into_iter()
        .map(|(date, seconds)| DailySeconds { date, seconds })
        .collect(),
    }
  }
}

/// GET /api/study-sessions/weekly
pub async fn weekly_study(
  State(state): State<AppState>,
  auth: AuthUser,
) -> AppResult<Json<WeeklyStudy>> {
  let today = Utc::now().date_naive();
  let conn = try_lock(&state.db)?;
  let daily = db::get_daily_study_seconds(&conn, auth.user_id, today)?;
  Ok(Json(WeeklyStudy::from_daily(today, daily)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_weekly_shape() {
    let today = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
    let daily: Vec<(NaiveDate, i64)> = (0..7)
      .map(|i| (NaiveDate::from_ymd_opt(2026, 4, 4 + i).unwrap(), i as i64 * 10))
      .collect();

    let weekly = WeeklyStudy::from_daily(today, daily);
    assert_eq!(weekly.range.start, NaiveDate::from_ymd_opt(2026, 4, 4).unwrap());
    assert_eq!(weekly.range.end, today);
    assert_eq!(weekly.total_seconds, 210);

    let json = serde_json::to_value(&weekly).unwrap();
    assert_eq!(json["range"]["start"], "2026-04-04");
    assert_eq!(json["daily"][6]["date"], "2026-04-10");
    assert_eq!(json["daily"][6]["seconds"], 60);
  }
}
