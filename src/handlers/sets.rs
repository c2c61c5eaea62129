use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::{self, try_lock};
use crate::domain::SetDetail;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::access::SET_NOT_FOUND;
use crate::services::{require_folder, require_set};
use crate::state::AppState;
use crate::validation::{double_option, validate_name};

const EMPTY_SET_NAME: &str = "Tên set không được để trống";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSetsQuery {
  pub folder_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSetRequest {
  pub set_name: String,
  #[serde(default)]
  pub folder_id: Option<i64>,
}

/// Partial update. `folderId: null` moves the set out of its folder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSetRequest {
  #[serde(default)]
  pub set_name: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub folder_id: Option<Option<i64>>,
}

/// GET /api/flashcards/sets?folderId=
pub async fn list_sets(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiQuery(query): ApiQuery<ListSetsQuery>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let sets = db::list_sets(&conn, auth.user_id, query.folder_id)?;
  Ok(Json(json!({ "sets": sets })))
}

/// GET /api/flashcards/sets/{setId}
pub async fn get_set(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;
  let cards = db::list_set_cards(&conn, set.id)?;
  let folder = db::get_set_folder(&conn, &set)?;
  let is_completed = db::is_owned_set_completed(&conn, auth.user_id, set.id)?;

  let detail = SetDetail {
    set,
    is_completed,
    folder,
    cards,
  };
  Ok(Json(json!({ "set": detail })))
}

/// POST /api/flashcards/sets
pub async fn create_set(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiJson(req): ApiJson<CreateSetRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
  let name = validate_name(&req.set_name, EMPTY_SET_NAME)?;

  let conn = try_lock(&state.db)?;
  if let Some(folder_id) = req.folder_id {
    require_folder(&conn, auth.user_id, folder_id)?;
  }
  let set = db::insert_set(&conn, auth.user_id, &name, req.folder_id)?;
  Ok((StatusCode::CREATED, Json(json!({ "set": set }))))
}

/// PUT /api/flashcards/sets/{setId}
pub async fn update_set(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
  ApiJson(req): ApiJson<UpdateSetRequest>,
) -> AppResult<Json<Value>> {
  let name = req
    .set_name
    .as_deref()
    .map(|raw| validate_name(raw, EMPTY_SET_NAME))
    .transpose()?;

  let conn = try_lock(&state.db)?;
  let set = require_set(&conn, auth.user_id, set_id)?;

  let folder_id = match req.folder_id {
    Some(Some(folder_id)) => Some(require_folder(&conn, auth.user_id, folder_id)?.id),
    Some(None) => None,
    None => set.folder_id,
  };
  let name = name.unwrap_or(set.name);

  db::update_set(&conn, set.id, &name, folder_id)?;
  let updated = require_set(&conn, auth.user_id, set.id)?;
  Ok(Json(json!({ "set": updated })))
}

/// DELETE /api/flashcards/sets/{setId} - cards, rounds and snapshot go with it
pub async fn delete_set(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(set_id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  if !db::delete_set(&conn, auth.user_id, set_id)? {
    return Err(AppError::not_found(SET_NOT_FOUND));
  }
  tracing::info!("User {} deleted set {}", auth.user_id, set_id);
  Ok(Json(json!({ "message": "Xóa set thành công" })))
}
