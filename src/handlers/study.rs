//! Card-by-card study: start a session, flip a card, grade one answer, and
//! per-set mastery statistics.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::{self, try_lock};
use crate::domain::{CardAnswer, SetStats, StudyCard, StudyMode};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::{require_card, require_set};
use crate::srs::{apply_answer, MasteryLevel};
use crate::state::AppState;
use crate::validation::validate_positive_id;

#[derive(Debug, Deserialize)]
pub struct StudyQuery {
  #[serde(default)]
  pub mode: StudyMode,
}

#[derive(Debug, Serialize)]
pub struct StudyStart {
  pub set_id: i64,
  pub set_name: String,
  pub total_cards: usize,
  pub cards: Vec<StudyCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnswerRequest {
  pub card_id: i64,
  pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerResult {
  pub card_id: i64,
  pub mastery_level: MasteryLevel,
  /// Set completion after this answer
  pub completed: bool,
  pub message: &'static str,
}

/// GET /api/flashcards/sets/{setId}/study?mode=
pub async fn start_study(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
  ApiQuery(query): ApiQuery<StudyQuery>,
) -> AppResult<Json<StudyStart>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;

  let cards = db::list_study_cards(&conn, set.id, query.mode)?;
  if cards.is_empty() {
    return Err(AppError::not_found("Không có card nào để học"));
  }

  db::increment_times_practiced(&conn, set.id)?;
  tracing::debug!(
    "User {} studying set {} ({} cards, mode {})",
    auth.user_id,
    set.id,
    cards.len(),
    query.mode.as_str()
  );

  Ok(Json(StudyStart {
    set_id: set.id,
    set_name: set.name,
    total_cards: cards.len(),
    cards: cards.iter().map(StudyCard::from).collect(),
  }))
}

/// GET /api/flashcards/sets/{setId}/study/cards/{cardId}/answer
pub async fn card_answer(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath((set_id, card_id)): ApiPath<(i64, i64)>,
) -> AppResult<Json<CardAnswer>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let card = require_card(&conn, &set, card_id)?;
  Ok(Json(CardAnswer::from(card)))
}

/// POST /api/flashcards/sets/{setId}/study/answer
pub async fn submit_answer(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
  ApiJson(req): ApiJson<AnswerRequest>,
) -> AppResult<Json<AnswerResult>> {
  let card_id = validate_positive_id(req.card_id, "cardId")?;

  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let card = require_card(&conn, &set, card_id)?;

  let level = apply_answer(card.mastery_level, req.correct);
  db::set_card_mastery(&conn, card.id, level)?;
  let completed = db::is_owned_set_completed(&conn, auth.user_id, set.id)?;

  Ok(Json(AnswerResult {
    card_id: card.id,
    mastery_level: level,
    completed,
    message: if req.correct {
      "Chúc mừng! Bạn đã trả lời đúng"
    } else {
      "Chưa đúng, cố gắng lần sau nhé!"
    },
  }))
}

/// GET /api/flashcards/sets/{setId}/stats
pub async fn set_stats(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<SetStats>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let levels = db::list_set_mastery_levels(&conn, set.id)?;
  Ok(Json(SetStats::compute(&set, &levels)))
}
