use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::db::try_lock;
use crate::domain::RoundView;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::services::{self, RoundSubmission};
use crate::state::AppState;

/// POST /api/flashcards/sets/{setId}/round/complete
pub async fn complete_round(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
  ApiJson(submission): ApiJson<RoundSubmission>,
) -> AppResult<Json<RoundView>> {
  let conn = try_lock(&state.db)?;
  let view = services::complete_round(&conn, auth.user_id, set_id, &submission)?;
  Ok(Json(view))
}

/// GET /api/flashcards/sets/{setId}/round/last
pub async fn last_round(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<RoundView>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(services::last_round(&conn, auth.user_id, set_id)?))
}

/// POST /api/flashcards/sets/{setId}/round/reset
pub async fn reset_round(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<RoundView>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(services::reset_round(&conn, auth.user_id, set_id)?))
}
