//! Application state shared by all handlers.

use crate::config::{Config, DEFAULT_SESSION_EXPIRY_HOURS};
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
  /// Shared store connection (users, sessions, flashcards)
  pub db: DbPool,

  /// Lifetime of newly issued session tokens
  pub session_expiry_hours: i64,
}

impl AppState {
  pub fn new(db: DbPool, config: &Config) -> Self {
    Self {
      db,
      session_expiry_hours: config.session_expiry_hours,
    }
  }

  /// State with default settings, mainly for tests
  pub fn with_db(db: DbPool) -> Self {
    Self {
      db,
      session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
    }
  }
}
