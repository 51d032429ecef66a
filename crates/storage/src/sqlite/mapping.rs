use quiz_core::model::{Category, Difficulty, HighScoreEntry, SessionSummary};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn count_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_category(s: &str) -> Result<Category, StorageError> {
    Category::ALL
        .into_iter()
        .find(|c| c.key() == s)
        .ok_or_else(|| StorageError::Serialization(format!("invalid category: {s}")))
}

/// Difficulty is stored as its lowercase label: `easy`, `medium`, `hard`.
pub(crate) fn difficulty_to_str(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    match s {
        "easy" => Ok(Difficulty::Easy),
        "medium" => Ok(Difficulty::Medium),
        "hard" => Ok(Difficulty::Hard),
        _ => Err(StorageError::Serialization(format!("invalid difficulty: {s}"))),
    }
}

pub(crate) fn map_session_log_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummary, StorageError> {
    let category = parse_category(&row.try_get::<String, _>("category").map_err(ser)?)?;
    let difficulty = parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    let score = i32::try_from(score)
        .map_err(|_| StorageError::Serialization(format!("invalid score: {score}")))?;

    SessionSummary::from_persisted(
        row.try_get::<String, _>("player").map_err(ser)?,
        category,
        difficulty,
        count_from_i64("quota", row.try_get("quota").map_err(ser)?)?,
        count_from_i64("correct", row.try_get("correct").map_err(ser)?)?,
        count_from_i64("wrong", row.try_get("wrong").map_err(ser)?)?,
        count_from_i64("skipped", row.try_get("skipped").map_err(ser)?)?,
        score,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_high_score_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<HighScoreEntry, StorageError> {
    let score: i64 = row.try_get("score").map_err(ser)?;
    Ok(HighScoreEntry {
        player: row.try_get("player").map_err(ser)?,
        score: i32::try_from(score)
            .map_err(|_| StorageError::Serialization(format!("invalid score: {score}")))?,
        category: parse_category(&row.try_get::<String, _>("category").map_err(ser)?)?,
        difficulty: parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?,
        recorded_at: row.try_get("recorded_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_round_trips_through_text() {
        for d in Difficulty::ALL {
            assert_eq!(parse_difficulty(difficulty_to_str(d)).unwrap(), d);
        }
        assert!(parse_difficulty("Hard").is_err());
    }

    #[test]
    fn category_parses_by_key() {
        assert_eq!(parse_category("iq").unwrap(), Category::Iq);
        assert!(parse_category("maths").is_err());
    }
}
