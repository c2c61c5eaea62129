//! Application services.
//!
//! Logic that spans several store calls and is shared between handlers
//! lives here, keeping the handlers to request parsing and response shape.

pub mod access;
pub mod study_round;

pub use access::{require_card, require_folder, require_set};
pub use study_round::{complete_round, last_round, reset_round, RoundSubmission};
