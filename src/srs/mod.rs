pub mod mastery;

pub use mastery::{apply_answer, MasteryLevel};
