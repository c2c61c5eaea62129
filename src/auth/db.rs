//! Account and session storage (users, sessions tables).
//!
//! Sessions are keyed by the SHA-256 digest of the bearer token; see
//! `crate::session::hash_token`.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

use crate::db::{format_timestamp, timestamp_at};

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

fn row_to_user(row: &rusqlite::Row) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
    })
}

/// Create a new user, returns the user ID
pub fn create_user(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<i64> {
    let now = format_timestamp(Utc::now());
    conn.execute(
        "INSERT INTO users (email, password_hash, display_name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![email, password_hash, display_name, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Check if an email is already registered (case-insensitive)
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get user by email, returns (user_id, password_hash)
pub fn get_credentials_by_email(conn: &Connection, email: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE email = ?1",
        params![email],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn get_user_by_id(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, email, display_name, created_at FROM users WHERE id = ?1",
        params![user_id],
        row_to_user,
    )
    .optional()
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![format_timestamp(Utc::now()), user_id],
    )?;
    Ok(())
}

/// Create a session for an already hashed token
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token_hash: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        r#"
        INSERT INTO sessions (token_hash, user_id, created_at, expires_at, last_access_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            token_hash,
            user_id,
            format_timestamp(now),
            format_timestamp(expires),
            format_timestamp(now)
        ],
    )?;
    Ok(())
}

/// Resolve a live session to its user id, touching its last access time
pub fn get_session_user_id(conn: &Connection, token_hash: &str) -> Result<Option<i64>> {
    let now = format_timestamp(Utc::now());
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE token_hash = ?1 AND expires_at > ?2",
            params![token_hash, now],
            |row| row.get(0),
        )
        .optional()?;

    if user_id.is_some() {
        conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE token_hash = ?2",
            params![now, token_hash],
        )?;
    }
    Ok(user_id)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
    Ok(deleted > 0)
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = format_timestamp(Utc::now());
    conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_create_and_find_user() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "hana@example.com", "hash", "Hana").unwrap();

        assert!(email_exists(&env.conn, "HANA@example.com").unwrap());
        let (found, hash) = get_credentials_by_email(&env.conn, "hana@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(found, id);
        assert_eq!(hash, "hash");

        let user = get_user_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.display_name, "Hana");
        assert!(get_user_by_id(&env.conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "hana@example.com", "hash", "Hana").unwrap();
        assert!(create_user(&env.conn, "Hana@Example.com", "hash", "Hana").is_err());
    }

    #[test]
    fn test_session_lifecycle() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("hana@example.com");

        create_session(&env.conn, user, "digest", 1).unwrap();
        assert_eq!(get_session_user_id(&env.conn, "digest").unwrap(), Some(user));
        assert_eq!(get_session_user_id(&env.conn, "other").unwrap(), None);

        assert!(delete_session(&env.conn, "digest").unwrap());
        assert_eq!(get_session_user_id(&env.conn, "digest").unwrap(), None);
    }

    #[test]
    fn test_expired_session_is_ignored_and_cleaned() {
        let env = TestEnv::new().unwrap();
        let user = env.create_user("hana@example.com");

        create_session(&env.conn, user, "stale", -1).unwrap();
        create_session(&env.conn, user, "fresh", 1).unwrap();
        assert_eq!(get_session_user_id(&env.conn, "stale").unwrap(), None);
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
        assert_eq!(get_session_user_id(&env.conn, "fresh").unwrap(), Some(user));
    }
}
