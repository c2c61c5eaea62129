use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::{self, try_lock};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::services::access::CARD_NOT_FOUND;
use crate::services::{require_card, require_set};
use crate::state::AppState;
use crate::validation::{double_option, normalize_image_url, validate_card_side};

const EMPTY_SIDE_JP: &str = "Mặt tiếng Nhật không được để trống";
const EMPTY_SIDE_VIET: &str = "Mặt tiếng Việt không được để trống";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCardRequest {
  pub side_jp: String,
  pub side_viet: String,
  #[serde(default)]
  pub image_url: Option<String>,
}

/// Partial update; `imageUrl: null` or `""` removes the image
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCardRequest {
  #[serde(default)]
  pub side_jp: Option<String>,
  #[serde(default)]
  pub side_viet: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub image_url: Option<Option<String>>,
}

/// GET /api/flashcards/sets/{setId}/cards
pub async fn list_cards(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let cards = db::list_set_cards(&conn, set.id)?;
  Ok(Json(json!({ "cards": cards })))
}

/// POST /api/flashcards/sets/{setId}/cards - new cards start at level 1
pub async fn create_card(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
  ApiJson(req): ApiJson<CreateCardRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
  let side_jp = validate_card_side(&req.side_jp, EMPTY_SIDE_JP)?;
  let side_viet = validate_card_side(&req.side_viet, EMPTY_SIDE_VIET)?;
  let image_url = normalize_image_url(req.image_url.as_deref())?;

  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let card = db::insert_card(&conn, set.id, &side_jp, &side_viet, image_url.as_deref())?;
  Ok((StatusCode::CREATED, Json(json!({ "card": card }))))
}

/// PUT /api/flashcards/sets/{setId}/cards/{cardId}
pub async fn update_card(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath((set_id, card_id)): ApiPath<(i64, i64)>,
  ApiJson(req): ApiJson<UpdateCardRequest>,
) -> AppResult<Json<Value>> {
  let side_jp = req
    .side_jp
    .as_deref()
    .map(|raw| validate_card_side(raw, EMPTY_SIDE_JP))
    .transpose()?;
  let side_viet = req
    .side_viet
    .as_deref()
    .map(|raw| validate_card_side(raw, EMPTY_SIDE_VIET))
    .transpose()?;
  let image_url = req
    .image_url
    .map(|url| normalize_image_url(url.as_deref()))
    .transpose()?;

  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let card = require_card(&conn, &set, card_id)?;

  let side_jp = side_jp.unwrap_or(card.side_jp);
  let side_viet = side_viet.unwrap_or(card.side_viet);
  let image_url = image_url.unwrap_or(card.image_url);

  db::update_card_content(&conn, card.id, &side_jp, &side_viet, image_url.as_deref())?;
  let updated = require_card(&conn, &set, card.id)?;
  Ok(Json(json!({ "card": updated })))
}

/// DELETE /api/flashcards/sets/{setId}/cards/{cardId}
pub async fn delete_card(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath((set_id, card_id)): ApiPath<(i64, i64)>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  if !db::delete_card(&conn, set.id, card_id)? {
    return Err(AppError::not_found(CARD_NOT_FOUND));
  }
  Ok(Json(json!({ "message": "Xóa card thành công" })))
}
