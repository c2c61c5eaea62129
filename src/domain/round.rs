//! Study rounds: one complete pass over every card of a set.
//!
//! A finished round is stored twice: as an immutable `Round` row carrying
//! the authoritative counts, and as a `RoundSnapshot` holding the card-id
//! groupings the client needs to redraw its result screen.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// One answer inside a round submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoundAnswer {
  pub card_id: i64,
  pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
  pub id: i64,
  pub user_id: i64,
  pub set_id: i64,
  pub remembered_count: u32,
  pub not_remembered_count: u32,
  pub completed_at: DateTime<Utc>,
}

/// Card ids grouped the way the result screen shows them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundTabs {
  pub all: Vec<i64>,
  pub remembered: Vec<i64>,
  pub not_remembered: Vec<i64>,
}

impl RoundTabs {
  /// Every card listed, none grouped yet
  pub fn ungrouped(all: Vec<i64>) -> Self {
    Self {
      all,
      remembered: Vec::new(),
      not_remembered: Vec::new(),
    }
  }
}

/// Cached display state of the latest round of a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundSnapshot {
  pub round_id: i64,
  pub completed_at: DateTime<Utc>,
  pub total_cards: u32,
  pub remembered_count: u32,
  pub not_remembered_count: u32,
  #[serde(default)]
  pub tabs: Option<RoundTabs>,
}

/// Returned when a submission skips cards that belong to the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteRound {
  pub missing: Vec<i64>,
}

/// Result of folding a submission against the set's card list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTally {
  /// First answer per set card, in submission order
  pub answers: Vec<RoundAnswer>,
  pub tabs: RoundTabs,
  pub total_cards: u32,
  pub remembered_count: u32,
  pub not_remembered_count: u32,
}

/// Check coverage and group the answers of a round.
///
/// Answers for cards outside the set are ignored and only the first answer
/// per card counts. The not-remembered count never drops below
/// `total - remembered`, padding the not-remembered tab with unanswered
/// cards when needed.
pub fn tally_answers(
  set_card_ids: &[i64],
  submitted: &[RoundAnswer],
) -> Result<RoundTally, IncompleteRound> {
  let in_set: HashSet<i64> = set_card_ids.iter().copied().collect();
  let mut seen = HashSet::new();
  let mut answers = Vec::new();
  let mut remembered = Vec::new();
  let mut not_remembered = Vec::new();

  for answer in submitted {
    if !in_set.contains(&answer.card_id) || !seen.insert(answer.card_id) {
      continue;
    }
    answers.push(*answer);
    if answer.correct {
      remembered.push(answer.card_id);
    } else {
      not_remembered.push(answer.card_id);
    }
  }

  let missing: Vec<i64> = set_card_ids
    .iter()
    .copied()
    .filter(|id| !seen.contains(id))
    .collect();
  if !missing.is_empty() {
    return Err(IncompleteRound { missing });
  }

  let total_cards = set_card_ids.len() as u32;
  let remembered_count = remembered.len() as u32;
  let not_remembered_count = (not_remembered.len() as u32).max(total_cards - remembered_count);

  if (not_remembered.len() as u32) < not_remembered_count {
    let grouped: HashSet<i64> = remembered.iter().chain(&not_remembered).copied().collect();
    let padding: Vec<i64> = set_card_ids
      .iter()
      .copied()
      .filter(|id| !grouped.contains(id))
      .collect();
    not_remembered.extend(padding);
  }

  Ok(RoundTally {
    answers,
    tabs: RoundTabs {
      all: set_card_ids.to_vec(),
      remembered,
      not_remembered,
    },
    total_cards,
    remembered_count,
    not_remembered_count,
  })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
  pub round_id: i64,
  pub set_id: i64,
  pub completed_at: DateTime<Utc>,
  pub total_cards: u32,
  pub remembered_count: u32,
  pub not_remembered_count: u32,
}

/// Pie-chart slices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundChart {
  pub remembered: u32,
  pub not_remembered: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundActions {
  pub continue_learning: bool,
  pub reset_progress: bool,
}

/// Response body shared by round completion, recall and reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
  #[serde(serialize_with = "summary_or_empty")]
  pub round: Option<RoundSummary>,
  pub chart: RoundChart,
  pub tabs: RoundTabs,
  pub actions: RoundActions,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

fn summary_or_empty<S: Serializer>(
  round: &Option<RoundSummary>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  match round {
    Some(summary) => summary.serialize(serializer),
    None => serializer.serialize_map(Some(0))?.end(),
  }
}

impl RoundView {
  /// Nothing to show: no counts, no tabs, no follow-up actions
  pub fn neutral() -> Self {
    Self {
      round: None,
      chart: RoundChart::default(),
      tabs: RoundTabs::default(),
      actions: RoundActions::default(),
      message: None,
    }
  }

  /// Latest round counts joined with the grouping cached in its snapshot.
  /// `fallback_all` is used when the snapshot carries no tabs.
  pub fn from_round(round: &Round, snapshot: &RoundSnapshot, fallback_all: Vec<i64>) -> Self {
    let tabs = snapshot
      .tabs
      .clone()
      .unwrap_or_else(|| RoundTabs::ungrouped(fallback_all));
    Self {
      round: Some(RoundSummary {
        round_id: round.id,
        set_id: round.set_id,
        completed_at: round.completed_at,
        total_cards: snapshot.total_cards,
        remembered_count: round.remembered_count,
        not_remembered_count: round.not_remembered_count,
      }),
      chart: RoundChart {
        remembered: round.remembered_count,
        not_remembered: round.not_remembered_count,
      },
      tabs,
      actions: RoundActions {
        continue_learning: true,
        reset_progress: true,
      },
      message: None,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

impl RoundSnapshot {
  pub fn from_tally(round: &Round, tally: &RoundTally) -> Self {
    Self {
      round_id: round.id,
      completed_at: round.completed_at,
      total_cards: tally.total_cards,
      remembered_count: tally.remembered_count,
      not_remembered_count: tally.not_remembered_count,
      tabs: Some(tally.tabs.clone()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn answer(card_id: i64, correct: bool) -> RoundAnswer {
    RoundAnswer { card_id, correct }
  }

  fn sample_round(remembered: u32, not_remembered: u32) -> Round {
    Round {
      id: 11,
      user_id: 1,
      set_id: 4,
      remembered_count: remembered,
      not_remembered_count: not_remembered,
      completed_at: Utc::now(),
    }
  }

  #[test]
  fn test_tally_partitions_answers() {
    let tally = tally_answers(&[1, 2, 3], &[answer(1, true), answer(2, true), answer(3, false)]).unwrap();
    assert_eq!(tally.remembered_count, 2);
    assert_eq!(tally.not_remembered_count, 1);
    assert_eq!(tally.tabs.all, vec![1, 2, 3]);
    assert_eq!(tally.tabs.remembered, vec![1, 2]);
    assert_eq!(tally.tabs.not_remembered, vec![3]);
  }

  #[test]
  fn test_tally_rejects_missing_cards() {
    let err = tally_answers(&[1, 2, 3], &[answer(1, true), answer(2, false)]).unwrap_err();
    assert_eq!(err.missing, vec![3]);
  }

  #[test]
  fn test_tally_ignores_foreign_cards() {
    let tally = tally_answers(&[1, 2], &[answer(1, true), answer(99, true), answer(2, false)]).unwrap();
    assert_eq!(tally.answers.len(), 2);
    assert_eq!(tally.remembered_count, 1);
    assert!(!tally.tabs.remembered.contains(&99));
  }

  #[test]
  fn test_tally_keeps_first_duplicate() {
    let tally = tally_answers(&[1, 2], &[answer(1, false), answer(2, true), answer(1, true)]).unwrap();
    assert_eq!(tally.answers, vec![answer(1, false), answer(2, true)]);
    assert_eq!(tally.tabs.remembered, vec![2]);
    assert_eq!(tally.tabs.not_remembered, vec![1]);
    assert_eq!(tally.remembered_count + tally.not_remembered_count, 2);
  }

  #[test]
  fn test_tally_counts_cover_total() {
    let ids: Vec<i64> = (1..=6).collect();
    let submitted: Vec<RoundAnswer> = ids.iter().map(|id| answer(*id, id % 3 == 0)).collect();
    let tally = tally_answers(&ids, &submitted).unwrap();
    assert!(tally.remembered_count + tally.not_remembered_count >= tally.total_cards);
  }

  #[test]
  fn test_answer_rejects_unknown_fields() {
    let ok: RoundAnswer = serde_json::from_str(r#"{"cardId": 3, "correct": true}"#).unwrap();
    assert_eq!(ok, answer(3, true));
    assert!(serde_json::from_str::<RoundAnswer>(r#"{"cardId": 3, "correct": true, "x": 1}"#).is_err());
    assert!(serde_json::from_str::<RoundAnswer>(r#"{"cardId": "3", "correct": true}"#).is_err());
  }

  #[test]
  fn test_neutral_view_shape() {
    let json = serde_json::to_value(RoundView::neutral()).unwrap();
    assert_eq!(json["round"], serde_json::json!({}));
    assert_eq!(json["chart"]["remembered"], 0);
    assert_eq!(json["chart"]["not_remembered"], 0);
    assert_eq!(json["tabs"]["all"], serde_json::json!([]));
    assert_eq!(json["actions"]["continue_learning"], false);
    assert_eq!(json["actions"]["reset_progress"], false);
    assert!(json.get("message").is_none());
  }

  #[test]
  fn test_view_uses_round_counts_over_snapshot() {
    let round = sample_round(2, 1);
    let snapshot = RoundSnapshot {
      round_id: 10,
      completed_at: Utc::now(),
      total_cards: 3,
      remembered_count: 0,
      not_remembered_count: 3,
      tabs: Some(RoundTabs {
        all: vec![1, 2, 3],
        remembered: vec![1, 2],
        not_remembered: vec![3],
      }),
    };
    let view = RoundView::from_round(&round, &snapshot, vec![]);
    let summary = view.round.unwrap();
    assert_eq!(summary.round_id, 11);
    assert_eq!(summary.remembered_count, 2);
    assert_eq!(view.chart.not_remembered, 1);
    assert_eq!(view.tabs.remembered, vec![1, 2]);
    assert!(view.actions.continue_learning);
  }

  #[test]
  fn test_view_falls_back_without_tabs() {
    let round = sample_round(1, 1);
    let snapshot: RoundSnapshot = serde_json::from_value(serde_json::json!({
      "round_id": 11,
      "completed_at": "2026-01-05T10:00:00Z",
      "total_cards": 2,
      "remembered_count": 1,
      "not_remembered_count": 1
    }))
    .unwrap();
    let view = RoundView::from_round(&round, &snapshot, vec![5, 6]);
    assert_eq!(view.tabs, RoundTabs::ungrouped(vec![5, 6]));
  }
}
