//! Emission of idempotent store writes
//!
//! Every reconciled record becomes one [`UpsertOperation`]: insert the score
//! for `(player, puzzle_number)` if absent, otherwise do nothing. Applying
//! the same batch any number of times leaves the store in the same state as
//! applying it once, so a failed run can simply be repeated.

pub mod memory;
pub mod sql_script;
pub mod sqlite;

use crate::reconcile::Reconciliation;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};
use wgt_common::{PlayerId, PuzzleNumber, Score, UserId};

pub use memory::MemoryStore;
pub use sqlite::SqliteScoreStore;

/// Insert-if-absent write keyed by `(player, puzzle_number)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOperation {
    pub player: PlayerId,
    pub puzzle_number: PuzzleNumber,
    pub score: Score,
    pub date: NaiveDate,
}

/// Result of a single insert-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Store the emission stage writes to
///
/// Implementations must give `insert_score_if_absent` insert-or-ignore
/// semantics on `(user, puzzle_number)`; an existing row is never changed.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    /// Store id for a player, or `None` if the store does not know them
    async fn resolve_user(&self, player: &PlayerId) -> wgt_common::Result<Option<UserId>>;

    async fn insert_score_if_absent(
        &self,
        user: UserId,
        puzzle_number: PuzzleNumber,
        score: Score,
        date: NaiveDate,
    ) -> wgt_common::Result<UpsertOutcome>;
}

/// Counts from applying a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub inserted: usize,
    pub already_present: usize,
    /// Operations skipped because the store has no such player
    pub skipped: usize,
    pub unknown_players: BTreeSet<PlayerId>,
}

/// Convert reconciled records into operations, preserving order
pub fn emit(reconciliation: &Reconciliation) -> Vec<UpsertOperation> {
    reconciliation
        .records
        .iter()
        .map(|record| UpsertOperation {
            player: record.player.clone(),
            puzzle_number: record.puzzle_number,
            score: record.score,
            date: record.date,
        })
        .collect()
}

/// Apply operations in order
///
/// Players unknown to the store are skipped and reported. A store error
/// stops the run; everything applied before it stays applied and is safe to
/// re-apply.
pub async fn apply<S: ScoreStore>(
    store: &S,
    operations: &[UpsertOperation],
) -> wgt_common::Result<ApplyReport> {
    let mut report = ApplyReport::default();
    let mut user_ids: HashMap<&PlayerId, Option<UserId>> = HashMap::new();

    for op in operations {
        let user = match user_ids.get(&op.player) {
            Some(user) => *user,
            None => {
                let user = store.resolve_user(&op.player).await?;
                if user.is_none() {
                    warn!(player = %op.player, "Player not found in store, skipping their scores");
                    report.unknown_players.insert(op.player.clone());
                }
                user_ids.insert(&op.player, user);
                user
            }
        };

        let Some(user) = user else {
            report.skipped += 1;
            continue;
        };

        match store
            .insert_score_if_absent(user, op.puzzle_number, op.score, op.date)
            .await?
        {
            UpsertOutcome::Inserted => report.inserted += 1,
            UpsertOutcome::AlreadyPresent => {
                debug!(player = %op.player, puzzle = op.puzzle_number, "Score already stored");
                report.already_present += 1;
            }
        }
    }

    info!(
        "Applied {} operations: {} inserted, {} already present, {} skipped",
        operations.len(),
        report.inserted,
        report.already_present,
        report.skipped
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ResolvedResult;
    use crate::reconcile::reconcile;
    use wgt_common::puzzle::default_anchor_date;

    fn posted(player: &str, puzzle_number: PuzzleNumber) -> ResolvedResult {
        ResolvedResult {
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            player: PlayerId::new(player),
            puzzle_number,
            score: Score::solved(4).unwrap(),
        }
    }

    fn operations() -> Vec<UpsertOperation> {
        let results = vec![posted("a", 5), posted("b", 7), posted("a", 8)];
        emit(&reconcile(&results, default_anchor_date()))
    }

    #[test]
    fn test_emit_preserves_reconciled_order() {
        let ops = operations();
        let keys: Vec<_> = ops.iter().map(|op| (op.puzzle_number, op.player.as_str())).collect();
        assert_eq!(
            keys,
            vec![(5, "a"), (6, "a"), (7, "a"), (7, "b"), (8, "a"), (8, "b")]
        );
    }

    #[tokio::test]
    async fn test_apply_twice_is_idempotent() {
        let store = MemoryStore::with_players(["a", "b"]);
        let ops = operations();

        let first = apply(&store, &ops).await.unwrap();
        let snapshot = store.snapshot();
        let second = apply(&store, &ops).await.unwrap();

        assert_eq!(first.inserted, 6);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 6);
        assert_eq!(store.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn test_apply_never_overwrites_existing_score() {
        let store = MemoryStore::with_players(["a", "b"]);
        let user = store.resolve_user(&PlayerId::new("a")).await.unwrap().unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 6, 24).unwrap();
        store
            .insert_score_if_absent(user, 6, Score::solved(1).unwrap(), date)
            .await
            .unwrap();

        let report = apply(&store, &operations()).await.unwrap();

        assert_eq!(report.already_present, 1);
        assert_eq!(store.score(user, 6), Some((Score::solved(1).unwrap(), date)));
    }

    #[tokio::test]
    async fn test_unknown_player_is_skipped_and_reported() {
        let store = MemoryStore::with_players(["a"]);
        let report = apply(&store, &operations()).await.unwrap();

        assert_eq!(report.inserted, 4);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            report.unknown_players.into_iter().collect::<Vec<_>>(),
            vec![PlayerId::new("b")]
        );
    }
}
