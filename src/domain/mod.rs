pub mod card;
pub mod round;
pub mod set;

pub use card::{Card, CardAnswer, StudyCard, StudyMode};
pub use round::{
  tally_answers, IncompleteRound, Round, RoundAnswer, RoundSnapshot, RoundTabs, RoundTally,
  RoundView,
};
pub use set::{
  is_set_completed, FlashcardSet, Folder, FolderRef, FolderSetEntry, FolderWithSets, SetDetail,
  SetStats, SetSummary,
};
