//! Field checks for request bodies.
//!
//! Request types deserialize with `deny_unknown_fields`; the helpers here
//! enforce the value rules serde cannot express and return the message the
//! client sees on a 400.

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

/// Longest folder or set name accepted
pub const MAX_NAME_CHARS: usize = 255;

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Trimmed, non-empty, at most `MAX_NAME_CHARS` characters
pub fn validate_name(raw: &str, empty_message: &str) -> AppResult<String> {
  let name = raw.trim();
  if name.is_empty() {
    return Err(AppError::validation(empty_message));
  }
  if name.chars().count() > MAX_NAME_CHARS {
    return Err(AppError::validation(format!(
      "Tên không được dài quá {} ký tự",
      MAX_NAME_CHARS
    )));
  }
  Ok(name.to_string())
}

/// Card faces keep their inner whitespace but may not be blank
pub fn validate_card_side(raw: &str, empty_message: &str) -> AppResult<String> {
  if raw.trim().is_empty() {
    return Err(AppError::validation(empty_message));
  }
  Ok(raw.to_string())
}

/// Empty string means "no image"; anything else must be an http(s) URL
pub fn normalize_image_url(raw: Option<&str>) -> AppResult<Option<String>> {
  let Some(url) = raw.map(str::trim) else {
    return Ok(None);
  };
  if url.is_empty() {
    return Ok(None);
  }
  if !is_http_url(url) {
    return Err(AppError::validation("imageUrl không phải URL hợp lệ"));
  }
  Ok(Some(url.to_string()))
}

fn is_http_url(url: &str) -> bool {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"));
  match rest {
    Some(rest) => {
      let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
      !host.is_empty() && !url.chars().any(char::is_whitespace)
    }
    None => false,
  }
}

pub fn validate_positive_id(id: i64, field: &str) -> AppResult<i64> {
  if id <= 0 {
    return Err(AppError::validation(format!("{} phải là số nguyên dương", field)));
  }
  Ok(id)
}

/// Lower-cased `local@domain.tld` shape check
pub fn validate_email(raw: &str) -> AppResult<String> {
  let email = raw.trim().to_lowercase();
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  };
  if !valid {
    return Err(AppError::validation("Email không hợp lệ"));
  }
  Ok(email)
}

pub fn validate_password(raw: &str) -> AppResult<()> {
  if raw.chars().count() < MIN_PASSWORD_CHARS {
    return Err(AppError::validation(format!(
      "Mật khẩu tối thiểu {} ký tự",
      MIN_PASSWORD_CHARS
    )));
  }
  Ok(())
}

/// Tell an absent field (`None`) apart from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}
