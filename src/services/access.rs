//! Ownership-checked lookups.
//!
//! A resource that exists but belongs to another user is reported exactly
//! like one that does not exist.

use rusqlite::Connection;

use crate::db;
use crate::domain::{Card, FlashcardSet, Folder};
use crate::error::{AppError, AppResult};

pub const SET_NOT_FOUND: &str = "Không tìm thấy set";
pub const FOLDER_NOT_FOUND: &str = "Không tìm thấy folder";
pub const CARD_NOT_FOUND: &str = "Không tìm thấy card";

pub fn require_set(conn: &Connection, user_id: i64, set_id: i64) -> AppResult<FlashcardSet> {
  db::get_owned_set(conn, user_id, set_id)?.ok_or_else(|| AppError::not_found(SET_NOT_FOUND))
}

pub fn require_folder(conn: &Connection, user_id: i64, folder_id: i64) -> AppResult<Folder> {
  db::get_owned_folder(conn, user_id, folder_id)?
    .ok_or_else(|| AppError::not_found(FOLDER_NOT_FOUND))
}

/// Card of an already verified set
pub fn require_card(conn: &Connection, set: &FlashcardSet, card_id: i64) -> AppResult<Card> {
  db::get_set_card(conn, set.id, card_id)?.ok_or_else(|| AppError::not_found(CARD_NOT_FOUND))
}
