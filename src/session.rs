//! Bearer session tokens.
//!
//! Clients receive the raw token once, at login. The store only ever sees
//! its SHA-256 digest, so a leaked database cannot be replayed.

use rand::Rng;
use sha2::{Digest, Sha256};

pub const TOKEN_LENGTH: usize = 32;

/// Generate a new random session token (lowercase alphanumerics)
pub fn generate_session_token() -> String {
  let mut rng = rand::rng();
  (0..TOKEN_LENGTH)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// Hex SHA-256 of a token, the form sessions are stored under
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}
