use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::{self, try_lock};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::services::access::FOLDER_NOT_FOUND;
use crate::state::AppState;
use crate::validation::validate_name;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFolderRequest {
  pub folder_name: String,
}

/// GET /api/flashcards/folders
pub async fn list_folders(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let folders = db::list_folders_with_sets(&conn, auth.user_id)?;
  Ok(Json(json!({ "folders": folders })))
}

/// POST /api/flashcards/folders
pub async fn create_folder(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiJson(req): ApiJson<CreateFolderRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
  let name = validate_name(&req.folder_name, "Tên folder không được để trống")?;

  let conn = try_lock(&state.db)?;
  let folder = db::insert_folder(&conn, auth.user_id, &name)?;
  Ok((StatusCode::CREATED, Json(json!({ "folder": folder }))))
}

/// DELETE /api/flashcards/folders/{folderId} - sets inside are kept, unfiled
pub async fn delete_folder(
  State(state): State<AppState>,
  auth: AuthUser,
  ApiPath(folder_id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  if !db::delete_folder(&conn, auth.user_id, folder_id)? {
    return Err(AppError::not_found(FOLDER_NOT_FOUND));
  }
  Ok(Json(json!({ "message": "Xóa folder thành công" })))
}
