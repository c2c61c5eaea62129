//! Application configuration.
//!
//! Each value is resolved with priority: config.toml > environment
//! (including `.env`) > built-in default.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Defaults ====================

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_DATABASE_PATH: &str = "data/flashcards.db";

/// One week
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24 * 7;

pub const CONFIG_FILE: &str = "config.toml";

// ==================== File Layout ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  server: Option<ServerSection>,
  database: Option<DatabaseSection>,
  session: Option<SessionSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
  host: Option<String>,
  port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
  expiry_hours: Option<i64>,
}

// ==================== Resolved Config ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub host: String,
  pub port: u16,
  pub database_path: PathBuf,
  pub session_expiry_hours: i64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      host: DEFAULT_HOST.to_string(),
      port: DEFAULT_PORT,
      database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
      session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
    }
  }
}

impl Config {
  /// Load from `config.toml` in the working directory and the process
  /// environment, after loading `.env` if present.
  pub fn load() -> Self {
    let _ = dotenvy::dotenv();

    let file = match std::fs::read_to_string(CONFIG_FILE) {
      Ok(contents) => Some(contents),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(e) => {
        tracing::warn!("Could not read {}: {}", CONFIG_FILE, e);
        None
      }
    };

    let config = Self::from_sources(file.as_deref(), |key| std::env::var(key).ok());
    tracing::info!(
      "Config: bind {}, database {}, sessions last {}h",
      config.bind_addr(),
      config.database_path.display(),
      config.session_expiry_hours
    );
    config
  }

  /// Resolve from raw config.toml contents and an environment lookup
  pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
    let file: FileConfig = file
      .and_then(|contents| match toml::from_str(contents) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
          tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
          None
        }
      })
      .unwrap_or_default();

    let defaults = Self::default();

    let host = file
      .server
      .as_ref()
      .and_then(|s| s.host.clone())
      .or_else(|| env("HOST"))
      .unwrap_or(defaults.host);

    let port = file
      .server
      .as_ref()
      .and_then(|s| s.port)
      .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
      .unwrap_or(defaults.port);

    let database_path = file
      .database
      .and_then(|d| d.path)
      .or_else(|| env("DATABASE_PATH"))
      .map(PathBuf::from)
      .unwrap_or(defaults.database_path);

    let session_expiry_hours = file
      .session
      .and_then(|s| s.expiry_hours)
      .or_else(|| env("SESSION_EXPIRY_HOURS").and_then(|h| h.parse().ok()))
      .filter(|hours| *hours > 0)
      .unwrap_or(defaults.session_expiry_hours);

    Self {
      host,
      port,
      database_path,
      session_expiry_hours,
    }
  }

  /// Get the full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}
