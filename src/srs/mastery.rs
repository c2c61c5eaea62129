use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

const MIN_LEVEL: u8 = 1;
const MAX_LEVEL: u8 = 5;

/// Per-card mastery, always within 1..=5. Level 5 means mastered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MasteryLevel(u8);

impl MasteryLevel {
  pub const INITIAL: Self = Self(MIN_LEVEL);
  pub const MASTERED: Self = Self(MAX_LEVEL);

  /// Build a level from a raw stored value, clamping anything out of range.
  pub fn clamped(raw: i64) -> Self {
    Self(raw.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8)
  }

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_mastered(self) -> bool {
    self.0 >= MAX_LEVEL
  }

  /// Levels 2..=4: seen at least once, not mastered yet.
  pub fn is_learning(self) -> bool {
    self.0 > MIN_LEVEL && self.0 < MAX_LEVEL
  }
}

impl Default for MasteryLevel {
  fn default() -> Self {
    Self::INITIAL
  }
}

impl ToSql for MasteryLevel {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.0 as i64))
  }
}

impl FromSql for MasteryLevel {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    i64::column_result(value).map(Self::clamped)
  }
}

/// Move a card one level up on a correct answer, one level down otherwise.
pub fn apply_answer(current: MasteryLevel, correct: bool) -> MasteryLevel {
  if correct {
    MasteryLevel((current.0 + 1).min(MAX_LEVEL))
  } else {
    MasteryLevel(current.0.saturating_sub(1).max(MIN_LEVEL))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_correct_answer_moves_up() {
    for raw in 1..=4 {
      let level = MasteryLevel::clamped(raw);
      assert_eq!(apply_answer(level, true).value() as i64, raw + 1);
    }
  }

  #[test]
  fn test_wrong_answer_moves_down() {
    for raw in 2..=5 {
      let level = MasteryLevel::clamped(raw);
      assert_eq!(apply_answer(level, false).value() as i64, raw - 1);
    }
  }

  #[test]
  fn test_bounds_are_sticky() {
    assert_eq!(apply_answer(MasteryLevel::MASTERED, true), MasteryLevel::MASTERED);
    assert_eq!(apply_answer(MasteryLevel::INITIAL, false), MasteryLevel::INITIAL);
  }

  #[test]
  fn test_mastered_card_regresses_then_caps() {
    let level = apply_answer(MasteryLevel::MASTERED, false);
    assert_eq!(level.value(), 4);

    let level = apply_answer(level, true);
    assert_eq!(level.value(), 5);

    // Another correct answer stays at 5, never 6
    let level = apply_answer(level, true);
    assert_eq!(level.value(), 5);
  }

  #[test]
  fn test_clamped_handles_out_of_range() {
    assert_eq!(MasteryLevel::clamped(0), MasteryLevel::INITIAL);
    assert_eq!(MasteryLevel::clamped(-3), MasteryLevel::INITIAL);
    assert_eq!(MasteryLevel::clamped(9), MasteryLevel::MASTERED);
  }

  #[test]
  fn test_learning_band() {
    assert!(!MasteryLevel::clamped(1).is_learning());
    assert!(MasteryLevel::clamped(2).is_learning());
    assert!(MasteryLevel::clamped(4).is_learning());
    assert!(!MasteryLevel::clamped(5).is_learning());
    assert!(MasteryLevel::clamped(5).is_mastered());
  }

  #[test]
  fn test_serializes_as_number() {
    assert_eq!(serde_json::to_string(&MasteryLevel::clamped(3)).unwrap(), "3");
  }
}
