//! Authentication handlers for register, login, logout and the current user.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::db as auth_db;
use super::db::User;
use super::middleware::{AuthUser, INVALID_TOKEN};
use super::password;
use crate::db::{try_lock, LogOnError};
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::session::{generate_session_token, hash_token};
use crate::state::AppState;
use crate::validation::{validate_email, validate_name, validate_password};

const BAD_CREDENTIALS: &str = "Email hoặc mật khẩu không đúng";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on register and login. The token is shown only here.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// Create a session for `user_id` and return its raw token
fn issue_token(state: &AppState, conn: &rusqlite::Connection, user_id: i64) -> AppResult<String> {
    let token = generate_session_token();
    auth_db::create_session(conn, user_id, &hash_token(&token), state.session_expiry_hours)?;
    Ok(token)
}

fn load_user(conn: &rusqlite::Connection, user_id: i64) -> AppResult<User> {
    auth_db::get_user_by_id(conn, user_id)?
        .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;
    let display_name = validate_name(&req.display_name, "Vui lòng nhập tên hiển thị")?;

    // Hash outside the store lock
    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

    let conn = try_lock(&state.db)?;
    if auth_db::email_exists(&conn, &email)? {
        return Err(AppError::Conflict("Email đã được sử dụng".to_string()));
    }

    let user_id = auth_db::create_user(&conn, &email, &password_hash, &display_name)?;
    let token = issue_token(&state, &conn, user_id)?;
    let user = load_user(&conn, user_id)?;

    tracing::info!("Registered user {}", user_id);
    Ok((StatusCode::CREATED, Json(SessionResponse { user, token })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Vui lòng nhập email và mật khẩu"));
    }

    let credentials = {
        let conn = try_lock(&state.db)?;
        auth_db::get_credentials_by_email(&conn, &email)?
    };
    let Some((user_id, stored_hash)) = credentials else {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };
    if !password::verify_password(&req.password, &stored_hash) {
        tracing::info!("Failed login for user {}", user_id);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let conn = try_lock(&state.db)?;
    auth_db::update_last_login(&conn, user_id).log_warn("Failed to update last login");
    auth_db::cleanup_expired_sessions(&conn).log_warn("Failed to clean up expired sessions");
    let token = issue_token(&state, &conn, user_id)?;
    let user = load_user(&conn, user_id)?;

    Ok(Json(SessionResponse { user, token }))
}

/// POST /api/auth/logout - ends only the session that made the request
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let conn = try_lock(&state.db)?;
    auth_db::delete_session(&conn, &auth.token_hash)?;
    Ok(Json(json!({ "message": "Đăng xuất thành công" })))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let conn = try_lock(&state.db)?;
    let user = load_user(&conn, auth.user_id)?;
    Ok(Json(json!({ "user": user })))
}
