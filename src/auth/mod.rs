//! Accounts, password login and bearer sessions.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use handlers::*;
pub use middleware::AuthUser;
