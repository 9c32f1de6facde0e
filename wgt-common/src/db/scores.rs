//! Score database operations
//!
//! Scores are never overwritten by the importer: a `(user_id, wordle_number)`
//! pair that already has a row is left untouched.

use crate::types::{PuzzleNumber, Score, UserId};
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

/// Stored score row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredScore {
    pub user_id: UserId,
    pub puzzle_number: PuzzleNumber,
    pub score: Score,
    pub date: NaiveDate,
}

/// Insert a score unless one already exists for `(user_id, puzzle_number)`
///
/// Returns `true` when a new row was created, `false` when the key was
/// already present (no-op).
pub async fn insert_score_if_absent(
    pool: &SqlitePool,
    user_id: UserId,
    puzzle_number: PuzzleNumber,
    score: Score,
    date: NaiveDate,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO scores (user_id, wordle_number, score, date)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id, wordle_number) DO NOTHING
        "#,
    )
    .bind(user_id.0)
    .bind(i64::from(puzzle_number))
    .bind(i64::from(score.value()))
    .bind(date.format("%Y-%m-%d").to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Total number of stored scores
pub async fn count_scores(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scores")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// All scores for one user in puzzle order
pub async fn load_scores_for_user(pool: &SqlitePool, user_id: UserId) -> Result<Vec<StoredScore>> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, wordle_number, score, date
        FROM scores
        WHERE user_id = ?
        ORDER BY wordle_number
        "#,
    )
    .bind(user_id.0)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<StoredScore> {
            let number: i64 = row.get("wordle_number");
            let score: i64 = row.get("score");
            let date: String = row.get("date");

            Ok(StoredScore {
                user_id: UserId(row.get("user_id")),
                puzzle_number: PuzzleNumber::try_from(number)
                    .map_err(|_| Error::Internal(format!("Invalid puzzle number in database: {}", number)))?,
                score: u8::try_from(score)
                    .ok()
                    .and_then(|s| Score::try_from(s).ok())
                    .ok_or_else(|| Error::Internal(format!("Invalid score in database: {}", score)))?,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .map_err(|e| Error::Internal(format!("Invalid date in database: {}", e)))?,
            })
        })
        .collect()
}
