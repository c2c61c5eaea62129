use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::MasteryLevel;

/// Which cards a study session should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
  #[default]
  All,
  /// Levels 1-4
  NotMastered,
  /// Level 5
  Mastered,
}

impl StudyMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::All => "all",
      Self::NotMastered => "not-mastered",
      Self::Mastered => "mastered",
    }
  }

  pub fn includes(&self, level: MasteryLevel) -> bool {
    match self {
      Self::All => true,
      Self::NotMastered => !level.is_mastered(),
      Self::Mastered => level.is_mastered(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
  #[serde(rename = "card_id")]
  pub id: i64,
  pub set_id: i64,
  /// Japanese face, shown first during study
  pub side_jp: String,
  /// Vietnamese face
  pub side_viet: String,
  pub image_url: Option<String>,
  pub mastery_level: MasteryLevel,
  pub created_at: DateTime<Utc>,
}

/// Front-only projection handed out when a study session starts
#[derive(Debug, Clone, Serialize)]
pub struct StudyCard {
  pub card_id: i64,
  pub front: String,
  pub image_url: Option<String>,
  pub mastery_level: MasteryLevel,
}

impl From<&Card> for StudyCard {
  fn from(card: &Card) -> Self {
    Self {
      card_id: card.id,
      front: card.side_jp.clone(),
      image_url: card.image_url.clone(),
      mastery_level: card.mastery_level,
    }
  }
}

/// Both faces, returned when the learner flips a card
#[derive(Debug, Clone, Serialize)]
pub struct CardAnswer {
  pub card_id: i64,
  pub front: String,
  pub back: String,
  pub image_url: Option<String>,
}

impl From<Card> for CardAnswer {
  fn from(card: Card) -> Self {
    Self {
      card_id: card.id,
      front: card.side_jp,
      back: card.side_viet,
      image_url: card.image_url,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_study_mode_serde() {
    let mode: StudyMode = serde_json::from_str("\"not-mastered\"").unwrap();
    assert_eq!(mode, StudyMode::NotMastered);
    let mode: StudyMode = serde_json::from_str("\"mastered\"").unwrap();
    assert_eq!(mode, StudyMode::Mastered);
    assert!(serde_json::from_str::<StudyMode>("\"sometimes\"").is_err());
  }

  #[test]
  fn test_study_mode_default_is_all() {
    assert_eq!(StudyMode::default(), StudyMode::All);
    assert_eq!(StudyMode::default().as_str(), "all");
  }

  #[test]
  fn test_study_mode_includes() {
    let fresh = MasteryLevel::INITIAL;
    let done = MasteryLevel::MASTERED;

    assert!(StudyMode::All.includes(fresh));
    assert!(StudyMode::All.includes(done));
    assert!(StudyMode::NotMastered.includes(fresh));
    assert!(!StudyMode::NotMastered.includes(done));
    assert!(!StudyMode::Mastered.includes(MasteryLevel::clamped(4)));
    assert!(StudyMode::Mastered.includes(done));
  }

  #[test]
  fn test_card_serializes_with_card_id() {
    let card = Card {
      id: 7,
      set_id: 2,
      side_jp: "猫".to_string(),
      side_viet: "con mèo".to_string(),
      image_url: None,
      mastery_level: MasteryLevel::clamped(3),
      created_at: Utc::now(),
    };
    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json["card_id"], 7);
    assert_eq!(json["mastery_level"], 3);
    assert!(json.get("id").is_none());

    let answer = CardAnswer::from(card);
    assert_eq!(answer.front, "猫");
    assert_eq!(answer.back, "con mèo");
  }
}
