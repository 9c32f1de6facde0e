//! SQLite-backed score store

use super::{ScoreStore, UpsertOutcome};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;
use wgt_common::db::{scores, users};
use wgt_common::{PlayerId, PuzzleNumber, Score, UserId};

/// Score store over the shared `wgt.db` schema
pub struct SqliteScoreStore {
    db: SqlitePool,
}

impl SqliteScoreStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Insert any missing players (insert-or-ignore by username)
    ///
    /// Returns the number of players created.
    pub async fn seed_players(&self, players: &[(PlayerId, String)]) -> wgt_common::Result<usize> {
        let mut created = 0;
        for (player, display_name) in players {
            if users::ensure_user(&self.db, player, display_name).await? {
                info!(player = %player, "Created player");
                created += 1;
            }
        }
        Ok(created)
    }
}

impl ScoreStore for SqliteScoreStore {
    async fn resolve_user(&self, player: &PlayerId) -> wgt_common::Result<Option<UserId>> {
        users::find_user_id(&self.db, player).await
    }

    async fn insert_score_if_absent(
        &self,
        user: UserId,
        puzzle_number: PuzzleNumber,
        score: Score,
        date: NaiveDate,
    ) -> wgt_common::Result<UpsertOutcome> {
        let inserted = scores::insert_score_if_absent(&self.db, user, puzzle_number, score, date).await?;
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::AlreadyPresent
        })
    }
}
