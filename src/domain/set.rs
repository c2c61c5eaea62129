use chrono::{DateTime, Utc};
use serde::Serialize;

use super::card::Card;
use crate::srs::MasteryLevel;

#[derive(Debug, Clone, Serialize)]
pub struct Folder {
  #[serde(rename = "folder_id")]
  pub id: i64,
  pub user_id: i64,
  #[serde(rename = "folder_name")]
  pub name: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlashcardSet {
  #[serde(rename = "set_id")]
  pub id: i64,
  pub user_id: i64,
  pub folder_id: Option<i64>,
  #[serde(rename = "set_name")]
  pub name: String,
  pub times_practiced: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderRef {
  pub folder_id: i64,
  pub folder_name: String,
}

/// Set row for listings (cards themselves are left out)
#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
  #[serde(flatten)]
  pub set: FlashcardSet,
  pub card_count: i64,
  pub is_completed: bool,
  pub folder: Option<FolderRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetDetail {
  #[serde(flatten)]
  pub set: FlashcardSet,
  pub is_completed: bool,
  pub folder: Option<FolderRef>,
  pub cards: Vec<Card>,
}

/// Compact set entry nested inside a folder listing
#[derive(Debug, Clone, Serialize)]
pub struct FolderSetEntry {
  pub set_id: i64,
  pub set_name: String,
  pub times_practiced: i64,
  pub created_at: DateTime<Utc>,
  pub card_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderWithSets {
  #[serde(flatten)]
  pub folder: Folder,
  pub sets: Vec<FolderSetEntry>,
}

/// A set counts as completed once every card is mastered, or once any
/// round over it has been completed. An empty set is never "all mastered".
pub fn is_set_completed(card_count: i64, mastered_count: i64, has_completed_round: bool) -> bool {
  has_completed_round || (card_count > 0 && mastered_count >= card_count)
}

/// Mastery breakdown for one set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetStats {
  pub set_id: i64,
  pub set_name: String,
  pub times_practiced: i64,
  pub total_cards: usize,
  pub mastered_cards: usize,
  pub learning_cards: usize,
  pub new_cards: usize,
  pub average_mastery: f64,
  pub mastery_percentage: u32,
}

impl SetStats {
  pub fn compute(set: &FlashcardSet, levels: &[MasteryLevel]) -> Self {
    let total_cards = levels.len();
    let mastered_cards = levels.iter().filter(|l| l.is_mastered()).count();
    let learning_cards = levels.iter().filter(|l| l.is_learning()).count();
    let new_cards = levels.iter().filter(|l| **l == MasteryLevel::INITIAL).count();

    let (average_mastery, mastery_percentage) = if total_cards > 0 {
      let sum: u32 = levels.iter().map(|l| l.value() as u32).sum();
      let avg = sum as f64 / total_cards as f64;
      let pct = (mastered_cards as f64 / total_cards as f64 * 100.0).round() as u32;
      ((avg * 10.0).round() / 10.0, pct)
    } else {
      (0.0, 0)
    };

    Self {
      set_id: set.id,
      set_name: set.name.clone(),
      times_practiced: set.times_practiced,
      total_cards,
      mastered_cards,
      learning_cards,
      new_cards,
      average_mastery,
      mastery_percentage,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn levels(raw: &[i64]) -> Vec<MasteryLevel> {
    raw.iter().map(|r| MasteryLevel::clamped(*r)).collect()
  }

  fn sample_set() -> FlashcardSet {
    FlashcardSet {
      id: 3,
      user_id: 1,
      folder_id: None,
      name: "N5 動詞".to_string(),
      times_practiced: 2,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn test_completed_when_all_mastered() {
    assert!(is_set_completed(3, 3, false));
    assert!(!is_set_completed(3, 2, false));
  }

  #[test]
  fn test_completed_round_wins_over_levels() {
    assert!(is_set_completed(3, 0, true));
  }

  #[test]
  fn test_empty_set_is_not_completed() {
    assert!(!is_set_completed(0, 0, false));
    assert!(is_set_completed(0, 0, true));
  }

  #[test]
  fn test_stats_breakdown() {
    let stats = SetStats::compute(&sample_set(), &levels(&[1, 2, 4, 5]));
    assert_eq!(stats.total_cards, 4);
    assert_eq!(stats.mastered_cards, 1);
    assert_eq!(stats.learning_cards, 2);
    assert_eq!(stats.new_cards, 1);
    assert_eq!(stats.average_mastery, 3.0);
    assert_eq!(stats.mastery_percentage, 25);
  }

  #[test]
  fn test_stats_rounding() {
    // avg = 7 / 3 = 2.333.. -> 2.3, mastered 1/3 -> 33%
    let stats = SetStats::compute(&sample_set(), &levels(&[1, 1, 5]));
    assert_eq!(stats.average_mastery, 2.3);
    assert_eq!(stats.mastery_percentage, 33);
  }

  #[test]
  fn test_stats_empty_set() {
    let stats = SetStats::compute(&sample_set(), &[]);
    assert_eq!(stats.total_cards, 0);
    assert_eq!(stats.average_mastery, 0.0);
    assert_eq!(stats.mastery_percentage, 0);
  }

  #[test]
  fn test_summary_flattens_set_fields() {
    let summary = SetSummary {
      set: sample_set(),
      card_count: 4,
      is_completed: false,
      folder: Some(FolderRef {
        folder_id: 9,
        folder_name: "JLPT".to_string(),
      }),
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["set_id"], 3);
    assert_eq!(json["set_name"], "N5 動詞");
    assert_eq!(json["card_count"], 4);
    assert_eq!(json["folder"]["folder_name"], "JLPT");
  }
}
