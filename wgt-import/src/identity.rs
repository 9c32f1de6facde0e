//! Identity resolution
//!
//! Maps free-text chat sender names to canonical players using a fixed,
//! ordered alias table.
//!
//! # Matching
//! A sender matches an alias when, after trimming the sender name, either
//! string contains the other. Names like "Rob" therefore match "Rob Beasley",
//! and "Big Al Goulding 🏌" matches "Big Al Goulding". The first matching
//! alias in table order wins, so overlapping names (one full name contained
//! in another) resolve deterministically; [`AliasTable::overlapping_names`]
//! lists such pairs for review.
//!
//! Unmatched senders are never assigned to anyone: their results are
//! dropped and the names are returned in [`Resolution::unresolved`].

use crate::chat::RawResult;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use wgt_common::config::AliasEntry;
use wgt_common::{PlayerId, PuzzleNumber, Score};

/// Ordered alias table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct players in table order with their display names
    ///
    /// The display name is the first one given for the player, falling back
    /// to the player id.
    pub fn players(&self) -> Vec<(PlayerId, String)> {
        let mut players: Vec<(PlayerId, Option<String>)> = Vec::new();
        for entry in &self.entries {
            match players.iter_mut().find(|(id, _)| *id == entry.player) {
                Some((_, name)) => {
                    if name.is_none() {
                        name.clone_from(&entry.display_name);
                    }
                }
                None => players.push((entry.player.clone(), entry.display_name.clone())),
            }
        }

        players
            .into_iter()
            .map(|(id, name)| {
                let name = name.unwrap_or_else(|| id.to_string());
                (id, name)
            })
            .collect()
    }

    /// Pairs of full names where the first contains the second
    pub fn overlapping_names(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for (j, b) in self.entries.iter().enumerate() {
                if i != j && a.full_name.contains(b.full_name.as_str()) {
                    pairs.push((a.full_name.clone(), b.full_name.clone()));
                }
            }
        }
        pairs
    }
}

/// Does `sender` refer to the alias `full_name`?
///
/// Blank names on either side never match.
pub fn matches(sender: &str, full_name: &str) -> bool {
    let sender = sender.trim();
    if sender.is_empty() || full_name.trim().is_empty() {
        return false;
    }
    full_name.contains(sender) || sender.contains(full_name)
}

/// A result attributed to a canonical player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResult {
    pub date: NaiveDate,
    pub player: PlayerId,
    pub puzzle_number: PuzzleNumber,
    pub score: Score,
}

/// Output of [`IdentityResolver::resolve_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Results whose sender matched an alias, in input order
    pub resolved: Vec<ResolvedResult>,
    /// Trimmed sender names with no alias, with the number of results dropped
    pub unresolved: BTreeMap<String, usize>,
}

/// Resolves sender names against one alias table
pub struct IdentityResolver {
    table: AliasTable,
}

impl IdentityResolver {
    pub fn new(table: AliasTable) -> Self {
        if table.is_empty() {
            warn!("Alias table is empty; every sender will be unresolved");
        }
        Self { table }
    }

    pub fn table(&self) -> &AliasTable {
        &self.table
    }

    /// Player for `sender`, first match in table order
    pub fn resolve(&self, sender: &str) -> Option<&PlayerId> {
        self.table
            .entries
            .iter()
            .find(|entry| matches(sender, &entry.full_name))
            .map(|entry| &entry.player)
    }

    /// Resolve every raw result, collecting unknown senders on the side
    pub fn resolve_all<I>(&self, results: I) -> Resolution
    where
        I: IntoIterator<Item = RawResult>,
    {
        let mut resolution = Resolution::default();

        for raw in results {
            match self.resolve(&raw.sender_name) {
                Some(player) => {
                    debug!(sender = %raw.sender_name, player = %player, "Resolved sender");
                    resolution.resolved.push(ResolvedResult {
                        date: raw.date,
                        player: player.clone(),
                        puzzle_number: raw.puzzle_number,
                        score: raw.score,
                    });
                }
                None => {
                    let name = raw.sender_name.trim().to_string();
                    let count = resolution.unresolved.entry(name).or_insert(0);
                    if *count == 0 {
                        warn!(sender = %raw.sender_name, "Unknown player");
                    }
                    *count += 1;
                }
            }
        }

        resolution
    }
}
