//! Participation windows and gap filling
//!
//! **Algorithm:**
//! 1. Window pass: each player's first puzzle is the lowest puzzle number
//!    they posted; the global range spans the lowest to highest number
//!    posted by anyone.
//! 2. Fill pass: for every puzzle number in the global range (ascending) and
//!    every player (ascending id) whose window has started, keep the posted
//!    result or synthesize a failure (score 10) dated from the anchor.
//!
//! A player is never charged for puzzles before their first post, and every
//! puzzle after it has exactly one record.
//!
//! When a player posted the same puzzle more than once, the last post in
//! input order is kept and the others are counted as duplicates.

use crate::identity::ResolvedResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;
use wgt_common::puzzle::date_for_puzzle;
use wgt_common::{PlayerId, PuzzleNumber, Score};

/// How a reconciled record came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Posted in the chat
    Observed,
    /// Missing from the chat, filled in as a failure
    Synthesized,
}

/// Final record for one `(player, puzzle_number)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledResult {
    pub player: PlayerId,
    pub puzzle_number: PuzzleNumber,
    pub score: Score,
    pub date: NaiveDate,
    pub origin: Origin,
}

/// Inclusive puzzle number range covered by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PuzzleRange {
    pub first: PuzzleNumber,
    pub last: PuzzleNumber,
}

/// Output of [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Ordered by puzzle number, then player id
    pub records: Vec<ReconciledResult>,
    /// First puzzle number per player
    pub windows: BTreeMap<PlayerId, PuzzleNumber>,
    /// `None` when there were no results at all
    pub range: Option<PuzzleRange>,
    /// Distinct puzzle numbers that appeared in the chat
    pub distinct_puzzles: usize,
    pub observed: usize,
    pub synthesized: usize,
    /// Posts superseded by a later post for the same player and puzzle
    pub duplicates: usize,
}

/// Reconcile resolved results into a gap-free record set
///
/// Pure and total: any input, including an empty one, yields a valid
/// reconciliation.
pub fn reconcile(results: &[ResolvedResult], anchor: NaiveDate) -> Reconciliation {
    // Window pass
    let mut windows: BTreeMap<PlayerId, PuzzleNumber> = BTreeMap::new();
    let mut puzzles: BTreeSet<PuzzleNumber> = BTreeSet::new();
    let mut by_key: HashMap<(&PlayerId, PuzzleNumber), &ResolvedResult> = HashMap::new();
    let mut duplicates = 0;

    for result in results {
        windows
            .entry(result.player.clone())
            .and_modify(|first| *first = (*first).min(result.puzzle_number))
            .or_insert(result.puzzle_number);
        puzzles.insert(result.puzzle_number);

        if by_key.insert((&result.player, result.puzzle_number), result).is_some() {
            debug!(
                player = %result.player,
                puzzle = result.puzzle_number,
                "Duplicate result, keeping the later post"
            );
            duplicates += 1;
        }
    }

    let (Some(&first), Some(&last)) = (puzzles.first(), puzzles.last()) else {
        return Reconciliation::default();
    };

    // Fill pass
    let mut records = Vec::new();
    let mut observed = 0;
    let mut synthesized = 0;

    for number in first..=last {
        for (player, &window_start) in &windows {
            if number < window_start {
                continue;
            }

            let record = match by_key.get(&(player, number)) {
                Some(result) => {
                    observed += 1;
                    ReconciledResult {
                        player: player.clone(),
                        puzzle_number: number,
                        score: result.score,
                        date: result.date,
                        origin: Origin::Observed,
                    }
                }
                None => {
                    synthesized += 1;
                    ReconciledResult {
                        player: player.clone(),
                        puzzle_number: number,
                        score: Score::FAILED,
                        date: date_for_puzzle(anchor, number),
                        origin: Origin::Synthesized,
                    }
                }
            };
            records.push(record);
        }
    }

    Reconciliation {
        records,
        windows,
        range: Some(PuzzleRange { first, last }),
        distinct_puzzles: puzzles.len(),
        observed,
        synthesized,
        duplicates,
    }
}
