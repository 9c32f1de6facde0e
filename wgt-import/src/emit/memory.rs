//! In-memory score store
//!
//! Same insert-or-ignore semantics as the SQLite store; used to check what a
//! batch does without touching a database.

use super::{ScoreStore, UpsertOutcome};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;
use wgt_common::{PlayerId, PuzzleNumber, Score, UserId};

/// Rows keyed by `(user, puzzle_number)`
pub type ScoreRows = BTreeMap<(UserId, PuzzleNumber), (Score, NaiveDate)>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: BTreeMap<PlayerId, UserId>,
    scores: Mutex<ScoreRows>,
}

impl MemoryStore {
    /// Store that knows the given players, numbered from 1 in order
    pub fn with_players<I, P>(players: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlayerId>,
    {
        let users = players
            .into_iter()
            .zip(1..)
            .map(|(player, id)| (player.into(), UserId(id)))
            .collect();

        Self {
            users,
            scores: Mutex::new(BTreeMap::new()),
        }
    }

    /// Copy of all stored rows
    pub fn snapshot(&self) -> ScoreRows {
        self.rows().clone()
    }

    pub fn score(&self, user: UserId, puzzle_number: PuzzleNumber) -> Option<(Score, NaiveDate)> {
        self.rows().get(&(user, puzzle_number)).copied()
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, ScoreRows> {
        self.scores.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScoreStore for MemoryStore {
    async fn resolve_user(&self, player: &PlayerId) -> wgt_common::Result<Option<UserId>> {
        Ok(self.users.get(player).copied())
    }

    async fn insert_score_if_absent(
        &self,
        user: UserId,
        puzzle_number: PuzzleNumber,
        score: Score,
        date: NaiveDate,
    ) -> wgt_common::Result<UpsertOutcome> {
        let mut rows = self.rows();
        if rows.contains_key(&(user, puzzle_number)) {
            return Ok(UpsertOutcome::AlreadyPresent);
        }
        rows.insert((user, puzzle_number), (score, date));
        Ok(UpsertOutcome::Inserted)
    }
}
