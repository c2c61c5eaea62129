//! Bearer-token authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use super::db as auth_db;
use crate::db::try_lock;
use crate::error::AppError;
use crate::session::hash_token;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "Thiếu token";
pub const INVALID_TOKEN: &str = "Token không hợp lệ";

/// Authenticated request context.
/// Add this as a handler parameter to require a valid
/// `Authorization: Bearer <token>` header; otherwise the request is
/// answered with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    /// Digest of the presented token, used to end this session on logout
    pub token_hash: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::Unauthorized(MISSING_TOKEN.to_string())
                    } else {
                        AppError::Unauthorized(INVALID_TOKEN.to_string())
                    }
                })?;

        let token_hash = hash_token(bearer.token());
        let conn = try_lock(&state.db)?;
        let user_id = auth_db::get_session_user_id(&conn, &token_hash)?
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

        Ok(AuthUser {
            user_id,
            token_hash,
        })
    }
}
