pub mod cards;
pub mod folders;
pub mod rounds;
pub mod sets;
pub mod study;
pub mod weekly;

pub use cards::{create_card, delete_card, list_cards, update_card};
pub use folders::{create_folder, delete_folder, list_folders};
pub use rounds::{complete_round, last_round, reset_round};
pub use sets::{create_set, delete_set, get_set, list_sets, update_set};
pub use study::{card_answer, set_stats, start_study, submit_answer};
pub use weekly::weekly_study;
